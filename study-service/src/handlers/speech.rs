use crate::dtos::{SpeechResponse, StudyRequest};
use crate::handlers::study::provider_error;
use crate::services::metrics;
use crate::startup::AppState;
use crate::utils::{normalize, ValidatedJson};
use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use service_core::error::AppError;
use std::time::Instant;

/// `POST /speak`: read the (normalized) text aloud.
pub async fn speak(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<StudyRequest>,
) -> Result<Json<SpeechResponse>, AppError> {
    let text = normalize(&request.text);
    let timeout = state.config.limits.upstream_timeout();
    let started = Instant::now();

    tracing::info!(text_len = text.len(), "Synthesizing speech");

    match tokio::time::timeout(timeout, state.audio_provider.speak(&text)).await {
        Ok(Ok(audio)) => {
            metrics::record_generation("speak", "ok", started.elapsed());
            tracing::info!(
                audio_bytes = audio.data.len(),
                mime_type = %audio.mime_type,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Speech synthesized"
            );
            Ok(Json(SpeechResponse {
                audio: BASE64.encode(&audio.data),
                mime_type: audio.mime_type,
            }))
        }
        Ok(Err(e)) => {
            metrics::record_generation("speak", e.kind(), started.elapsed());
            tracing::error!(error = %e, "Audio provider failed");
            Err(provider_error(e))
        }
        Err(_) => {
            metrics::record_generation("speak", "timeout", started.elapsed());
            tracing::error!(timeout_secs = timeout.as_secs(), "Audio provider timed out");
            Err(AppError::UpstreamTimeout(timeout.as_secs()))
        }
    }
}
