//! Repository trait for short link data access.

use crate::domain::entities::Link;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL
/// - Test stubs in `tests/common`, mocks with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new link owned by `created_by`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, url: &str, created_by: &str) -> Result<Link, AppError>;

    /// Finds a link by its internal id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    async fn retrieve(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Adds `delta` to the link's visit counter.
    ///
    /// The update is additive (`visits = visits + delta`), never a
    /// replacement; the resolution cache relies on this when flushing
    /// coalesced counts.
    async fn add_visits(&self, id: i64, delta: u64) -> Result<(), AppError>;

    /// Fetches a link and increments its visit counter by one in a single
    /// statement. Used on the redirect path when the cache is disabled.
    async fn retrieve_and_bump(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Deletes a link. Returns `Ok(true)` if a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Lists a user's links, newest first.
    async fn list_for_user(
        &self,
        username: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError>;

    /// Counts a user's links.
    async fn count_for_user(&self, username: &str) -> Result<i64, AppError>;

    /// Cheap connectivity check used by the health endpoint.
    async fn ping(&self) -> Result<(), AppError>;
}
