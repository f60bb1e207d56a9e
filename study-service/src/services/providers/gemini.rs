//! Gemini AI provider implementation.
//!
//! Implements study-aid generation, note scanning and read-aloud using
//! Google's Gemini `generateContent` API. Each capability sends its own system
//! instruction; structured capabilities also pin the response to a JSON
//! schema. Images go up and audio comes back as base64 `inlineData` parts.

use super::{AudioProvider, ProviderError, SpeechAudio, TextProvider};
use crate::models::{Capability, ModelTier};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Instruction sent alongside a scanned image.
pub const SCAN_NOTES_PROMPT: &str = "You are an OCR expert. Extract all text accurately from this image of notes. If it's a diagram, describe it briefly in brackets. Just return the text content.";

const SPEECH_PREFIX: &str = "Say clearly and kindly: ";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub fast_model: String,
    pub pro_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

/// Gemini provider. Serves both the text and the audio seam.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn model_for(&self, capability: Capability) -> &str {
        match capability.model_tier() {
            ModelTier::Fast => &self.config.fast_model,
            ModelTier::Pro => &self.config.pro_model,
        }
    }

    /// Build the API URL for the given model and method.
    fn api_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.config.base_url, model, method)
    }

    fn build_request(capability: Capability, text: &str) -> GenerateContentRequest {
        let schema = capability.output_schema();

        GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(text)])],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::text(capability.system_prompt())],
            }),
            generation_config: schema.map(|schema| GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
                ..Default::default()
            }),
        }
    }

    fn build_scan_request(image: &[u8], mime_type: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.to_string(),
                        data: BASE64.encode(image),
                    },
                },
                Part::text(SCAN_NOTES_PROMPT),
            ])],
            system_instruction: None,
            generation_config: None,
        }
    }

    fn build_speech_request(&self, text: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(&format!(
                "{}{}",
                SPEECH_PREFIX, text
            ))])],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: self.config.tts_voice.clone(),
                        },
                    },
                }),
                ..Default::default()
            }),
        }
    }

    /// POST a `generateContent` request and decode the response envelope.
    async fn send(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let url = self.api_url(model, "generateContent");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        if let Some(usage) = &api_response.usage_metadata {
            tracing::debug!(
                model = %model,
                input_tokens = usage.prompt_token_count.unwrap_or(0),
                output_tokens = usage.candidates_token_count.unwrap_or(0),
                "Gemini usage"
            );
        }

        Ok(api_response)
    }

    /// First candidate's parts, or the error its finish reason implies.
    fn first_candidate_parts(
        response: GenerateContentResponse,
    ) -> Result<Vec<CandidatePart>, ProviderError> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(ProviderError::ContentFiltered);
        }

        Ok(candidate.content.map(|c| c.parts).unwrap_or_default())
    }

    fn extract_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
        let text: String = Self::first_candidate_parts(response)?
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(text)
    }

    fn extract_audio(response: GenerateContentResponse) -> Result<SpeechAudio, ProviderError> {
        let inline = Self::first_candidate_parts(response)?
            .into_iter()
            .find_map(|p| p.inline_data)
            .ok_or(ProviderError::EmptyResponse)?;

        let data = BASE64
            .decode(inline.data.as_bytes())
            .map_err(|e| ProviderError::ApiError(format!("Invalid audio payload: {}", e)))?;

        if data.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(SpeechAudio {
            data,
            mime_type: inline.mime_type,
        })
    }
}

#[async_trait]
impl TextProvider for GeminiProvider {
    async fn generate(&self, capability: Capability, text: &str) -> Result<String, ProviderError> {
        let model = self.model_for(capability);
        let request = Self::build_request(capability, text);

        tracing::debug!(
            model = %model,
            capability = %capability,
            text_len = text.len(),
            "Sending request to Gemini API"
        );

        let response = self.send(model, &request).await?;
        Self::extract_text(response)
    }

    async fn scan_notes(&self, image: &[u8], mime_type: &str) -> Result<String, ProviderError> {
        let model = &self.config.fast_model;
        let request = Self::build_scan_request(image, mime_type);

        tracing::debug!(
            model = %model,
            mime_type = %mime_type,
            image_bytes = image.len(),
            "Sending scanned notes to Gemini API"
        );

        let response = self.send(model, &request).await?;
        Self::extract_text(response)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        // Listing models verifies the key without spending tokens
        let url = format!("{}/models", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }
}

#[async_trait]
impl AudioProvider for GeminiProvider {
    async fn speak(&self, text: &str) -> Result<SpeechAudio, ProviderError> {
        let model = &self.config.tts_model;
        let request = self.build_speech_request(text);

        tracing::debug!(
            model = %model,
            voice = %self.config.tts_voice,
            text_len = text.len(),
            "Sending speech request to Gemini API"
        );

        let response = self.send(model, &request).await?;
        Self::extract_audio(response)
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    fn text(text: &str) -> Self {
        Part::Text {
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}
