//! Handlers for the public redirect paths.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short id to its target URL.
///
/// # Endpoint
///
/// `GET /{id}`
///
/// # Request Flow
///
/// 1. Cheap charset check rejects ids that cannot decode
/// 2. With the cache enabled: one cache lookup, which also counts the
///    visit (a hit never touches the database)
/// 3. With the cache disabled: decode, then fetch-and-bump in one query
/// 4. Return `308 Permanent Redirect`
///
/// # Errors
///
/// Every resolution failure - undecodable id, unknown link, store outage,
/// cache shut down - is a plain `404 Not Found`; visitors learn nothing
/// about which case they hit.
pub async fn redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    if !state.codec.is_plausible(&id) {
        return Err(link_not_found());
    }

    let url = match &state.cache {
        Some(cache) => cache.lookup(&id).await.map_err(|err| {
            debug!(key = %id, error = %err, "redirect lookup failed");
            link_not_found()
        })?,
        None => {
            let link_id = state.codec.decode(&id).ok_or_else(link_not_found)?;
            state
                .links
                .retrieve_and_bump(link_id)
                .await?
                .ok_or_else(link_not_found)?
                .url
        }
    };

    Ok(Redirect::permanent(&url))
}

/// Serves the root path.
///
/// Redirects to the configured home target, or answers 404 when none is
/// set - a link service has no landing page of its own.
pub async fn home_handler(State(state): State<AppState>) -> Response {
    match &state.home_redirect {
        Some(target) => Redirect::temporary(target).into_response(),
        None => (StatusCode::NOT_FOUND, "Page not found").into_response(),
    }
}

fn link_not_found() -> AppError {
    AppError::not_found("Link not found", json!({}))
}
