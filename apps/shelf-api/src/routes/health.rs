//! Health check for monitoring.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
    pub server_time: String,
}

/// GET /health
///
/// 503 when the database does not answer.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let db_ok = state.db().health_check().await;

    let (code, status, database) = if db_ok {
        (StatusCode::OK, "serving", "ok")
    } else {
        tracing::warn!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "not_serving", "unreachable")
    };

    (
        code,
        Json(HealthStatus {
            status,
            database,
            server_time: Utc::now().to_rfc3339(),
        }),
    )
}
