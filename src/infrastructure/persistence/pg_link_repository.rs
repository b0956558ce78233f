//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, url, visits, created_at, created_by";

/// PostgreSQL repository for link storage and retrieval.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, url: &str, created_by: &str) -> Result<Link, AppError> {
        let link = sqlx::query_as::<_, Link>(&format!(
            "INSERT INTO links (url, created_by) VALUES ($1, $2) RETURNING {LINK_COLUMNS}"
        ))
        .bind(url)
        .bind(created_by)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn retrieve(&self, id: i64) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn add_visits(&self, id: i64, delta: u64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE links SET visits = visits + $1 WHERE id = $2")
            .bind(delta as i64)
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        // A deleted link can race a cache flush; the delta has nowhere to
        // go, which is fine, but worth a trace.
        if result.rows_affected() != 1 {
            tracing::warn!(id, delta, "visit increment matched no link");
        }

        Ok(())
    }

    async fn retrieve_and_bump(&self, id: i64) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>(&format!(
            "UPDATE links SET visits = visits + 1 WHERE id = $1 RETURNING {LINK_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(
        &self,
        username: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let links = sqlx::query_as::<_, Link>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE created_by = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(username)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(links)
    }

    async fn count_for_user(&self, username: &str) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE created_by = $1")
                .bind(username)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
