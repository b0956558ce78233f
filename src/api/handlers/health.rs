//! Handler for the health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health with per-component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: all components healthy
/// - **503 Service Unavailable**: one or more components degraded
///
/// The cache check reports occupancy and pending visit counts; a disabled
/// cache is healthy by definition.
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_check = check_database(&state).await;
    let cache_check = check_cache(&state).await;

    let all_healthy = db_check.status == "ok" && cache_check.status == "ok";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            cache: cache_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match state.links.ping().await {
        Ok(()) => CheckStatus {
            status: "ok".to_string(),
            message: Some("Connected".to_string()),
        },
        Err(e) => CheckStatus {
            status: "error".to_string(),
            message: Some(format!("Database error: {e:?}")),
        },
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    let Some(cache) = &state.cache else {
        return CheckStatus {
            status: "ok".to_string(),
            message: Some("Disabled".to_string()),
        };
    };

    match cache.stats().await {
        Ok(stats) => CheckStatus {
            status: "ok".to_string(),
            message: Some(format!(
                "{}/{} entries, {} pending visits",
                stats.entries, stats.capacity, stats.pending_visits
            )),
        },
        Err(_) => CheckStatus {
            status: "error".to_string(),
            message: Some("Resolver cache is closed".to_string()),
        },
    }
}
