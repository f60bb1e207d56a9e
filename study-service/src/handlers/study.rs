//! The single handler behind all five study-aid endpoints.

use crate::dtos::{StudyRequest, StudyResponse};
use crate::models::Capability;
use crate::services::metrics;
use crate::services::ProviderError;
use crate::startup::AppState;
use crate::utils::{normalize, ValidatedJson};
use axum::{extract::State, Extension, Json};
use service_core::error::AppError;
use std::time::Instant;

/// `POST /<capability route>`. The capability is attached to each route as an
/// `Extension` when the route table is built.
pub async fn generate(
    State(state): State<AppState>,
    Extension(capability): Extension<Capability>,
    ValidatedJson(request): ValidatedJson<StudyRequest>,
) -> Result<Json<StudyResponse>, AppError> {
    run_capability(&state, capability, request).await.map(Json)
}

/// Normalize the request text, call the provider under the configured
/// timeout, and wrap the result under the capability's response key.
pub async fn run_capability(
    state: &AppState,
    capability: Capability,
    request: StudyRequest,
) -> Result<StudyResponse, AppError> {
    let text = normalize(&request.text);
    let timeout = state.config.limits.upstream_timeout();
    let started = Instant::now();

    tracing::info!(
        capability = %capability,
        input_len = request.text.len(),
        normalized_len = text.len(),
        "Generating study aid"
    );

    let result = tokio::time::timeout(timeout, state.text_provider.generate(capability, &text)).await;

    match result {
        Ok(Ok(content)) => {
            metrics::record_generation(capability.as_str(), "ok", started.elapsed());
            tracing::info!(
                capability = %capability,
                output_len = content.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Study aid generated"
            );
            Ok(StudyResponse::new(capability, content))
        }
        Ok(Err(e)) => {
            metrics::record_generation(capability.as_str(), e.kind(), started.elapsed());
            tracing::error!(capability = %capability, error = %e, "Text provider failed");
            Err(provider_error(e))
        }
        Err(_) => {
            metrics::record_generation(capability.as_str(), "timeout", started.elapsed());
            tracing::error!(
                capability = %capability,
                timeout_secs = timeout.as_secs(),
                "Text provider timed out"
            );
            Err(AppError::UpstreamTimeout(timeout.as_secs()))
        }
    }
}

/// Map a provider failure onto the HTTP error taxonomy.
pub(crate) fn provider_error(err: ProviderError) -> AppError {
    match err {
        ProviderError::NotConfigured(_) => AppError::ServiceUnavailable,
        other => AppError::Upstream(other.to_string()),
    }
}
