//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A shortened link: one row in the `links` table.
///
/// `visits` is the durable visit counter. Under the resolution cache it lags
/// reality by at most one sync interval; increments applied by the cache are
/// always additive, never replacements.
#[derive(Debug, Clone, FromRow)]
pub struct Link {
    pub id: i64,
    pub url: String,
    pub visits: i64,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl Link {
    pub fn new(
        id: i64,
        url: String,
        visits: i64,
        created_at: DateTime<Utc>,
        created_by: String,
    ) -> Self {
        Self {
            id,
            url,
            visits,
            created_at,
            created_by,
        }
    }

    /// Whether `username` may view or delete this link.
    pub fn accessible_by(&self, username: &str, is_admin: bool) -> bool {
        is_admin || self.created_by == username
    }
}
