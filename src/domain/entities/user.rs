//! User account entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// An account that can create and manage links.
///
/// `password` holds the salted hash produced by
/// [`crate::utils::password::hash_password`], never plaintext.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub username: String,
    pub password: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::password::{hash_password, verify_password};

    #[test]
    fn test_stored_password_is_hashed() {
        let user = User {
            username: "alice".to_string(),
            password: hash_password("correct-horse-1"),
            is_admin: false,
            created_at: Utc::now(),
        };

        assert_ne!(user.password, "correct-horse-1");
        assert!(verify_password(&user.password, "correct-horse-1"));
    }
}
