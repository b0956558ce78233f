//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET    /`                     - Home redirect (public)
//! - `GET    /{id}`                 - Short link redirect (public)
//! - `GET    /health`               - Health check (public)
//! - `GET    /api/links`            - List own links
//! - `POST   /api/links`            - Create a link
//! - `GET    /api/links/{id}`       - Link details
//! - `DELETE /api/links/{id}`       - Delete a link
//! - `GET    /api/users`            - List users (admin)
//! - `POST   /api/users`            - Create a user (admin)
//! - `GET    /api/users/{username}` - User details (self or admin)
//! - `PATCH  /api/users/{username}` - Change password (self or admin)
//! - `DELETE /api/users/{username}` - Delete a user (admin)
//!
//! # Middleware
//!
//! - **Tracing** - structured request/response logging on everything
//! - **Basic auth** - required on `/api/*`
//! - **Rate limiting** - per-IP token bucket on `/api/*`; the redirect
//!   path stays unlimited so the cache, not the limiter, absorbs load
//! - **Path normalization** - trailing slash handling

use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api::handlers::{
    create_link_handler, create_user_handler, delete_link_handler, delete_user_handler,
    health_handler, home_handler, link_details_handler, list_links_handler, list_users_handler,
    redirect_handler, update_user_handler, user_details_handler,
};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let api_router = api_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(rate_limit::layer());

    let router = Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        .route("/{id}", get(redirect_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// API routes, all behind basic authentication.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route(
            "/links/{id}",
            get(link_details_handler).delete(delete_link_handler),
        )
        .route("/users", get(list_users_handler).post(create_user_handler))
        .route(
            "/users/{username}",
            get(user_details_handler)
                .patch(update_user_handler)
                .delete(delete_user_handler),
        )
}
