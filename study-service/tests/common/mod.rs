#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use service_core::config::Config as CoreConfig;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use study_service::config::{
    CorsConfig, ExtractorConfig, ExtractorKind, LimitsConfig, ProviderConfig, ProviderKind,
    StudyConfig,
};
use study_service::models::Capability;
use study_service::services::extractors::{ExtractionError, PdfExtractor};
use study_service::services::providers::{AudioProvider, ProviderError, SpeechAudio, TextProvider};
use study_service::startup::{build_router, AppState};
use tower::ServiceExt;

pub const BOUNDARY: &str = "study-test-boundary";

pub fn test_config() -> StudyConfig {
    StudyConfig {
        common: CoreConfig {
            port: 0,
            log_level: "debug".to_string(),
        },
        provider: ProviderConfig {
            kind: ProviderKind::Mock,
            api_key: String::new(),
            fast_model: "test-flash".to_string(),
            pro_model: "test-pro".to_string(),
            tts_model: "test-tts".to_string(),
            tts_voice: "Kore".to_string(),
        },
        extractor: ExtractorConfig {
            kind: ExtractorKind::Mock,
            pdftotext_path: "pdftotext".to_string(),
        },
        limits: LimitsConfig {
            upstream_timeout_secs: 1,
            max_upload_bytes: 1024,
        },
        cors: CorsConfig::default(),
        otlp_endpoint: None,
    }
}

/// What the text provider does when called.
#[derive(Clone, Copy)]
pub enum Behavior {
    Echo,
    Fail,
    Hang,
}

async fn behave<T>(behavior: Behavior, ok: T) -> Result<T, ProviderError> {
    match behavior {
        Behavior::Echo => Ok(ok),
        Behavior::Fail => Err(ProviderError::ApiError(
            "Gemini API error 500: internal quota key=secret-123".to_string(),
        )),
        Behavior::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ok)
        }
    }
}

/// Text provider that records every call it receives.
pub struct RecordingTextProvider {
    behavior: Behavior,
    calls: Mutex<Vec<(Capability, String)>>,
    scans: Mutex<Vec<(Vec<u8>, String)>>,
}

impl RecordingTextProvider {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: Mutex::new(Vec::new()),
            scans: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(Capability, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Image bytes and MIME type of every scan request.
    pub fn scans(&self) -> Vec<(Vec<u8>, String)> {
        self.scans.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextProvider for RecordingTextProvider {
    async fn generate(&self, capability: Capability, text: &str) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((capability, text.to_string()));

        behave(self.behavior, format!("{}:{}", capability.as_str(), text)).await
    }

    async fn scan_notes(&self, image: &[u8], mime_type: &str) -> Result<String, ProviderError> {
        self.scans
            .lock()
            .unwrap()
            .push((image.to_vec(), mime_type.to_string()));

        behave(self.behavior, format!("scanned {} bytes", image.len())).await
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match self.behavior {
            Behavior::Fail => Err(ProviderError::NotConfigured("down".to_string())),
            _ => Ok(()),
        }
    }
}

/// Audio provider that records the text it was asked to speak.
pub struct RecordingAudioProvider {
    behavior: Behavior,
    calls: Mutex<Vec<String>>,
}

impl RecordingAudioProvider {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioProvider for RecordingAudioProvider {
    async fn speak(&self, text: &str) -> Result<SpeechAudio, ProviderError> {
        self.calls.lock().unwrap().push(text.to_string());

        let audio = SpeechAudio {
            data: text.as_bytes().to_vec(),
            mime_type: "audio/L16;codec=pcm;rate=24000".to_string(),
        };
        behave(self.behavior, audio).await
    }
}

/// PDF extractor that counts invocations and returns a fixed outcome.
pub struct RecordingPdfExtractor {
    result: Result<String, ExtractionFailure>,
    calls: Mutex<Vec<Vec<u8>>>,
}

#[derive(Clone)]
enum ExtractionFailure {
    Parse(String),
    Timeout(u64),
}

impl RecordingPdfExtractor {
    pub fn returning(text: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(ExtractionFailure::Parse(message.to_string())),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Extractor that reports its own timeout.
    pub fn timing_out(secs: u64) -> Arc<Self> {
        Arc::new(Self {
            result: Err(ExtractionFailure::Timeout(secs)),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Vec<u8>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PdfExtractor for RecordingPdfExtractor {
    async fn extract(&self, content: &[u8]) -> Result<String, ExtractionError> {
        self.calls.lock().unwrap().push(content.to_vec());
        self.result.clone().map_err(|failure| match failure {
            ExtractionFailure::Parse(message) => ExtractionError::ParseError(message),
            ExtractionFailure::Timeout(secs) => ExtractionError::Timeout(secs),
        })
    }
}

pub fn router_with(
    provider: Arc<RecordingTextProvider>,
    extractor: Arc<RecordingPdfExtractor>,
) -> Router {
    router_with_audio(provider, RecordingAudioProvider::new(Behavior::Echo), extractor)
}

pub fn router_with_audio(
    provider: Arc<RecordingTextProvider>,
    audio: Arc<RecordingAudioProvider>,
    extractor: Arc<RecordingPdfExtractor>,
) -> Router {
    let state = AppState::new(test_config(), provider, audio, extractor);
    build_router(state).expect("Failed to build router")
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

pub fn json_request(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a multipart request to `/upload-pdf` with a single file part.
pub fn multipart_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    multipart_upload("/upload-pdf", field, filename, "application/octet-stream", content)
}

/// Build a multipart request with a single file part of the given type.
pub fn multipart_upload(
    path: &str,
    field: &str,
    filename: &str,
    content_type: &str,
    content: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(path)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
