use service_core::observability::init_tracing;
use study_service::config::StudyConfig;
use study_service::services::metrics::init_metrics;
use study_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Tracing depends on the configured log level, so config errors go to stderr
    let config = StudyConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "study-service",
        &config.common.log_level,
        config.otlp_endpoint.as_deref(),
    );
    init_metrics();

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
