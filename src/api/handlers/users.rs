//! Handlers for user management endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;

use crate::api::dto::users::{
    CreateUserRequest, UpdateUserRequest, UserListResponse, UserResponse,
};
use crate::api::middleware::auth::CurrentUser;
use crate::domain::entities::User;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::password::hash_password;
use crate::utils::validation::{validate_password_strength, validate_username};

/// Lists all users. Admin only.
///
/// # Endpoint
///
/// `GET /api/users`
pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
) -> Result<Json<UserListResponse>, AppError> {
    require_admin(&current)?;

    let users = state.users.list().await?;
    Ok(Json(UserListResponse {
        results: users.iter().map(UserResponse::from).collect(),
    }))
}

/// Creates a user. Admin only.
///
/// # Endpoint
///
/// `POST /api/users`
pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    require_admin(&current)?;
    validate_username(&body.username)?;
    validate_password_strength(&body.password)?;

    let created = state
        .users
        .create(&body.username, &hash_password(&body.password))
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&created))))
}

/// Returns a user's details. Self or admin.
///
/// # Endpoint
///
/// `GET /api/users/{username}`
pub async fn user_details_handler(
    Path(username): Path<String>,
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
) -> Result<Json<UserResponse>, AppError> {
    require_self_or_admin(&current, &username)?;

    let user = fetch_user(&state, &username).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Updates a user's password. Self or admin.
///
/// # Endpoint
///
/// `PATCH /api/users/{username}`
pub async fn update_user_handler(
    Path(username): Path<String>,
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    require_self_or_admin(&current, &username)?;

    let user = fetch_user(&state, &username).await?;

    if let Some(password) = body.password {
        validate_password_strength(&password)?;
        state
            .users
            .update_password(&username, &hash_password(&password))
            .await?;
    }

    Ok(Json(UserResponse::from(&user)))
}

/// Deletes a user. Admin only; admin accounts cannot be deleted.
///
/// # Endpoint
///
/// `DELETE /api/users/{username}`
pub async fn delete_user_handler(
    Path(username): Path<String>,
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
) -> Result<StatusCode, AppError> {
    require_admin(&current)?;

    let user = fetch_user(&state, &username).await?;
    if user.is_admin {
        return Err(AppError::forbidden(
            "Target user is admin",
            json!({ "username": username }),
        ));
    }

    state.users.delete(&username).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_user(state: &AppState, username: &str) -> Result<User, AppError> {
    state
        .users
        .retrieve(username)
        .await?
        .ok_or_else(|| AppError::not_found("User not found", json!({ "username": username })))
}

fn require_admin(current: &User) -> Result<(), AppError> {
    if !current.is_admin {
        return Err(AppError::forbidden("Admin privileges required", json!({})));
    }
    Ok(())
}

fn require_self_or_admin(current: &User, username: &str) -> Result<(), AppError> {
    if current.username != username && !current.is_admin {
        return Err(AppError::forbidden("Permission denied", json!({})));
    }
    Ok(())
}
