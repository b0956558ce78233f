//! Repository trait for user account data access.

use crate::domain::entities::User;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing user accounts.
///
/// Password parameters are always the stored hash form; hashing happens in
/// the caller (handlers and the admin CLI), not here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username is taken.
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError>;

    /// Finds a user by username.
    async fn retrieve(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Lists all users, oldest first.
    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Replaces a user's password hash.
    async fn update_password(&self, username: &str, password_hash: &str) -> Result<(), AppError>;

    /// Flips a user's admin flag.
    async fn toggle_admin(&self, username: &str) -> Result<(), AppError>;

    /// Deletes a user. Returns `Ok(true)` if a row was removed.
    async fn delete(&self, username: &str) -> Result<bool, AppError>;
}
