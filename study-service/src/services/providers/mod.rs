//! Text-generation provider abstractions and implementations.
//!
//! The gateway only knows the `TextProvider` and `AudioProvider` traits; the
//! concrete backend (Gemini, mock) is chosen from configuration at startup.

pub mod gemini;
pub mod mock;

use crate::models::Capability;
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Provider returned no content")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::EmptyResponse => "empty_response",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

/// Trait for study-aid text generation.
///
/// `text` has already been normalized by the gateway. Structured capabilities
/// return their JSON document as a string.
#[async_trait]
pub trait TextProvider: Send + Sync {
    async fn generate(&self, capability: Capability, text: &str) -> Result<String, ProviderError>;

    /// Transcribe a photo of notes into plain text.
    async fn scan_notes(&self, image: &[u8], mime_type: &str) -> Result<String, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Synthesized speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Trait for read-aloud (text-to-speech) providers.
#[async_trait]
pub trait AudioProvider: Send + Sync {
    async fn speak(&self, text: &str) -> Result<SpeechAudio, ProviderError>;
}
