/// Health check endpoint

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "degraded"
    pub status: String,

    /// Whether the database is reachable
    pub database: bool,

    /// Crate version
    pub version: String,
}

/// GET /health
///
/// Reports service liveness and database reachability. Returns 200 when
/// healthy, 503 when the database check fails.
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = kadro_shared::db::pool::health_check(&state.db).await.is_ok();

    let (status_code, status) = if database {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            database,
            version: kadro_shared::VERSION.to_string(),
        }),
    )
}
