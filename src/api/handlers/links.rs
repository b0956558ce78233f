//! Handlers for link management endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::links::{
    CreateLinkRequest, CreatedLinkResponse, LinkListResponse, LinkResponse, ListLinksQuery,
};
use crate::api::middleware::auth::CurrentUser;
use crate::domain::entities::Link;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::validation::validate_target_url;

/// Lists the authenticated user's links, newest first.
///
/// # Endpoint
///
/// `GET /api/links?limit=10&offset=0`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ListLinksQuery>,
) -> Result<Json<LinkListResponse>, AppError> {
    let limit = query.limit.unwrap_or(10);
    if !(1..=100).contains(&limit) {
        return Err(AppError::bad_request(
            "limit must be between 1 and 100",
            json!({ "limit": limit }),
        ));
    }

    let offset = query.offset.unwrap_or(0);
    if offset < 0 {
        return Err(AppError::bad_request(
            "offset must not be negative",
            json!({ "offset": offset }),
        ));
    }

    let total = state.links.count_for_user(&user.username).await?;
    let links = state
        .links
        .list_for_user(&user.username, limit, offset)
        .await?;

    let results = links.iter().map(|l| link_response(&state, l)).collect();

    Ok(Json(LinkListResponse {
        results,
        total,
        limit,
        offset,
        prefix: state.base_url.clone(),
    }))
}

/// Creates a short link owned by the authenticated user.
///
/// # Endpoint
///
/// `POST /api/links`
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<CreatedLinkResponse>), AppError> {
    body.validate().map_err(|e| {
        AppError::bad_request("Invalid request", json!({ "errors": e.to_string() }))
    })?;
    validate_target_url(&body.url)?;

    let link = state.links.create(&body.url, &user.username).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedLinkResponse {
            short_url: state.short_url(link.id),
        }),
    ))
}

/// Returns a single link with its durable visit count.
///
/// The count reflects flushed visits only; visits still pending in the
/// resolution cache appear after the next sync.
///
/// # Endpoint
///
/// `GET /api/links/{id}`
pub async fn link_details_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = fetch_accessible_link(&state, &id, &user.username, user.is_admin).await?;
    Ok(Json(link_response(&state, &link)))
}

/// Deletes a link.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
pub async fn delete_link_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<StatusCode, AppError> {
    let link = fetch_accessible_link(&state, &id, &user.username, user.is_admin).await?;
    state.links.delete(link.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_accessible_link(
    state: &AppState,
    id: &str,
    username: &str,
    is_admin: bool,
) -> Result<Link, AppError> {
    let link_id = state
        .codec
        .decode(id)
        .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))?;

    let link = state
        .links
        .retrieve(link_id)
        .await?
        .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))?;

    if !link.accessible_by(username, is_admin) {
        return Err(AppError::forbidden("Permission denied", json!({})));
    }

    Ok(link)
}

fn link_response(state: &AppState, link: &Link) -> LinkResponse {
    LinkResponse {
        id: state.codec.encode(link.id),
        short_url: state.short_url(link.id),
        url: link.url.clone(),
        visits: link.visits,
        created_at: link.created_at,
    }
}
