//! Mock provider for local runs and tests.

use super::{AudioProvider, ProviderError, SpeechAudio, TextProvider};
use crate::models::Capability;
use async_trait::async_trait;

/// How much of the input the mock summary echoes back.
const SUMMARY_PREVIEW_CHARS: usize = 100;

pub const SCANNED_NOTES_TEXT: &str = "Scanned notes placeholder";

/// 16-bit mono PCM at 24kHz, the format Gemini TTS answers with.
pub const MOCK_AUDIO_MIME_TYPE: &str = "audio/L16;codec=pcm;rate=24000";

/// Deterministic text provider that never leaves the process.
pub struct MockTextProvider {
    enabled: bool,
}

impl MockTextProvider {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(&self, capability: Capability, text: &str) -> Result<String, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ));
        }

        let output = match capability {
            Capability::Summary => {
                let preview: String = text.chars().take(SUMMARY_PREVIEW_CHARS).collect();
                format!("Generated summary for: {}", preview)
            }
            Capability::Quiz => "10 questions generated".to_string(),
            Capability::Explanation => "ELI5 explanation generated".to_string(),
            Capability::StudyPlan => "Daily schedule generated".to_string(),
            Capability::Flashcards => "10 flashcards generated".to_string(),
        };

        Ok(output)
    }

    async fn scan_notes(&self, _image: &[u8], _mime_type: &str) -> Result<String, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ));
        }

        Ok(SCANNED_NOTES_TEXT.to_string())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ))
        }
    }
}

/// Mock read-aloud provider returning a fixed buffer of silence.
pub struct MockAudioProvider {
    enabled: bool,
}

impl MockAudioProvider {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl AudioProvider for MockAudioProvider {
    async fn speak(&self, _text: &str) -> Result<SpeechAudio, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock audio provider not enabled".to_string(),
            ));
        }

        Ok(SpeechAudio {
            data: vec![0u8; 1024],
            mime_type: MOCK_AUDIO_MIME_TYPE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn summary_preview_is_char_bounded() {
        let provider = MockTextProvider::new(true);
        let long = "é".repeat(250);
        let out = provider.generate(Capability::Summary, &long).await.unwrap();
        assert_eq!(
            out.chars().count(),
            "Generated summary for: ".len() + SUMMARY_PREVIEW_CHARS
        );
    }

    #[tokio::test]
    async fn disabled_provider_fails() {
        let provider = MockTextProvider::new(false);
        assert!(matches!(
            provider.generate(Capability::Quiz, "x").await,
            Err(ProviderError::NotConfigured(_))
        ));
        assert!(provider.health_check().await.is_err());
        assert!(provider.scan_notes(b"img", "image/png").await.is_err());
    }

    #[tokio::test]
    async fn mock_audio_is_silence() {
        let audio = MockAudioProvider::new(true).speak("hello").await.unwrap();
        assert_eq!(audio.mime_type, MOCK_AUDIO_MIME_TYPE);
        assert!(audio.data.iter().all(|b| *b == 0));

        assert!(MockAudioProvider::new(false).speak("hello").await.is_err());
    }
}
