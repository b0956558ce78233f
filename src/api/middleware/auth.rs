//! HTTP Basic authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBasic;
use serde_json::json;

use crate::domain::entities::User;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::password::verify_password;

/// The authenticated user, inserted into request extensions for handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Authenticates requests with HTTP Basic credentials.
///
/// # Header Format
///
/// ```text
/// Authorization: Basic base64(username:password)
/// ```
///
/// On success the verified [`CurrentUser`] is attached to the request;
/// handlers decide per-operation whether admin rights are required.
///
/// # Errors
///
/// Returns `401 Unauthorized` (with a `WWW-Authenticate: Basic` challenge)
/// if the header is missing or malformed, the user is unknown, or the
/// password does not verify. Unknown user and wrong password are
/// deliberately indistinguishable to callers.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBasic((username, password)) = AuthBasic::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| unauthorized())?;

    let password = password.ok_or_else(unauthorized)?;

    let user = st
        .users
        .retrieve(&username)
        .await?
        .ok_or_else(unauthorized)?;

    if !verify_password(&user.password, &password) {
        return Err(unauthorized());
    }

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

fn unauthorized() -> AppError {
    AppError::unauthorized(
        "Unauthorized",
        json!({ "reason": "Missing or invalid credentials" }),
    )
}
