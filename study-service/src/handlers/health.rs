use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. Never touches collaborators.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "study-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: the text provider must report healthy.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let timeout = state.config.limits.upstream_timeout();
    match tokio::time::timeout(timeout, state.text_provider.health_check()).await {
        Ok(Ok(())) => StatusCode::OK,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Text provider not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(_) => {
            tracing::warn!("Text provider health check timed out");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
