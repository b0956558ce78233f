//! DTOs for user management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::User;

/// Request to create a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
}

/// Request to update a user's password.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
}

/// A user as returned by the API. The password hash is never exposed.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub password: &'static str,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            password: "<secret>",
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// User listing.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub results: Vec<UserResponse>,
}
