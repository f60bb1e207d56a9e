//! Application startup and lifecycle management.
//!
//! Collaborators are constructed once from configuration, the route table is
//! built explicitly in [`build_router`], and the resulting `Router` is handed
//! to `axum::serve`.

use crate::config::{CorsConfig, ExtractorKind, ProviderKind, StudyConfig};
use crate::handlers;
use crate::models::Capability;
use crate::services::extractors::{mock::MockPdfExtractor, pdftotext::PdftotextExtractor};
use crate::services::providers::gemini::{GeminiConfig, GeminiProvider, GEMINI_API_BASE};
use crate::services::providers::mock::{MockAudioProvider, MockTextProvider};
use crate::services::{AudioProvider, CommandExecutor, PdfExtractor, TextProvider};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
    Extension, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Headroom above the file limit for multipart boundaries and headers.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<StudyConfig>,
    pub text_provider: Arc<dyn TextProvider>,
    pub audio_provider: Arc<dyn AudioProvider>,
    pub pdf_extractor: Arc<dyn PdfExtractor>,
}

impl AppState {
    pub fn new(
        config: StudyConfig,
        text_provider: Arc<dyn TextProvider>,
        audio_provider: Arc<dyn AudioProvider>,
        pdf_extractor: Arc<dyn PdfExtractor>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            text_provider,
            audio_provider,
            pdf_extractor,
        }
    }

    /// Build the configured collaborators.
    pub fn from_config(config: StudyConfig) -> Result<Self, AppError> {
        let (text_provider, audio_provider) = match config.provider.kind {
            ProviderKind::Gemini => {
                let provider = GeminiProvider::new(GeminiConfig {
                    api_key: config.provider.api_key.clone(),
                    fast_model: config.provider.fast_model.clone(),
                    pro_model: config.provider.pro_model.clone(),
                    tts_model: config.provider.tts_model.clone(),
                    tts_voice: config.provider.tts_voice.clone(),
                    base_url: GEMINI_API_BASE.to_string(),
                    request_timeout: config.limits.upstream_timeout(),
                })
                .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

                tracing::info!(
                    fast_model = %config.provider.fast_model,
                    pro_model = %config.provider.pro_model,
                    tts_model = %config.provider.tts_model,
                    "Initialized Gemini provider"
                );
                let provider = Arc::new(provider);
                (
                    provider.clone() as Arc<dyn TextProvider>,
                    provider as Arc<dyn AudioProvider>,
                )
            }
            ProviderKind::Mock => {
                tracing::warn!("Using mock text and audio providers");
                (
                    Arc::new(MockTextProvider::new(true)) as Arc<dyn TextProvider>,
                    Arc::new(MockAudioProvider::new(true)) as Arc<dyn AudioProvider>,
                )
            }
        };

        let pdf_extractor: Arc<dyn PdfExtractor> = match config.extractor.kind {
            ExtractorKind::Pdftotext => {
                tracing::info!(
                    program = %config.extractor.pdftotext_path,
                    "Initialized pdftotext extractor"
                );
                Arc::new(PdftotextExtractor::new(
                    config.extractor.pdftotext_path.clone(),
                    CommandExecutor::new(config.limits.upstream_timeout()),
                ))
            }
            ExtractorKind::Mock => {
                tracing::warn!("Using mock PDF extractor");
                Arc::new(MockPdfExtractor::new())
            }
        };

        Ok(Self::new(config, text_provider, audio_provider, pdf_extractor))
    }
}

/// Build the full route table with middleware.
pub fn build_router(state: AppState) -> Result<Router, AppError> {
    let cors = cors_layer(&state.config.cors)?;
    let body_limit = state
        .config
        .limits
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/upload-pdf", post(handlers::upload_pdf))
        .route("/scan-notes", post(handlers::scan_notes))
        .route("/speak", post(handlers::speak));

    for capability in Capability::ALL {
        router = router.route(
            capability.route(),
            post(handlers::generate).layer(Extension(capability)),
        );
    }

    Ok(router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state))
}

fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, AppError> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the collaborators named in the configuration.
    pub async fn build(config: StudyConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(config)?;
        Self::build_with_state(state).await
    }

    /// Build the application around pre-built collaborators.
    pub async fn build_with_state(state: AppState) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let router = build_router(state)?;

        // Port 0 = random port for testing
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Study service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT/SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request},
    };
    use tower::ServiceExt;

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn configured_origins_restrict_cors() {
        let layer = cors_layer(&CorsConfig {
            allowed_origins: vec!["https://study.example.com".to_string()],
        })
        .unwrap();
        let app = Router::new().route("/", post(|| async {})).layer(layer);

        let allowed = app
            .clone()
            .oneshot(preflight("https://study.example.com"))
            .await
            .unwrap();
        assert_eq!(
            allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://study.example.com"
        );

        let denied = app.oneshot(preflight("https://evil.example.net")).await.unwrap();
        assert!(denied
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[test]
    fn invalid_origin_is_config_error() {
        let result = cors_layer(&CorsConfig {
            allowed_origins: vec!["https://bad\norigin".to_string()],
        });
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
