//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a short link.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// The redirect target (must be an absolute http/https URL).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,
}

/// A link as returned by the API. `id` is the public short id.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: String,
    pub short_url: String,
    pub url: String,
    pub visits: i64,
    pub created_at: DateTime<Utc>,
}

/// Response for link creation.
#[derive(Debug, Serialize)]
pub struct CreatedLinkResponse {
    pub short_url: String,
}

/// Pagination for link listing.
#[derive(Debug, Deserialize)]
pub struct ListLinksQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated link listing.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub results: Vec<LinkResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub prefix: String,
}
