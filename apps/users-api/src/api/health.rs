//! Health check endpoints

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadinessResponse {
    status: &'static str,
    mongodb: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    response_time_ms: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(liveness_check))
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// Liveness: the process is up and serving
async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Readiness: MongoDB answers a ping and shutdown has not begun
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let health = database::mongodb::check_health_detailed(&state.mongo_client).await;
    let ready = health.healthy && !state.shutdown.is_cancelled();

    if !health.healthy {
        tracing::warn!(error = ?health.message, "MongoDB readiness check failed");
    }

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            status: if ready { "ready" } else { "unavailable" },
            mongodb: health.healthy,
            error: health.message,
            response_time_ms: health.response_time_ms,
        }),
    )
}
