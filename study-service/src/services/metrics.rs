//! Metrics collection and Prometheus export.
//!
//! Installs the global `metrics` recorder and renders it for `/metrics`.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global handle to the Prometheus recorder. `None` if installation failed.
static METRICS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once; only the
/// first call installs anything.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed");
            None
        }
    });
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .and_then(Option::as_ref)
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record one provider call. `operation` is a capability name, `scan_notes`
/// or `speak`.
pub fn record_generation(operation: &'static str, outcome: &'static str, elapsed: Duration) {
    let labels = [
        ("operation", operation.to_string()),
        ("outcome", outcome.to_string()),
    ];
    counter!("study_generation_requests_total", &labels).increment(1);
    histogram!("study_generation_duration_seconds", &labels).record(elapsed.as_secs_f64());
}

pub fn record_extraction(outcome: &'static str, bytes: usize) {
    counter!("study_pdf_extractions_total", "outcome" => outcome).increment(1);
    histogram!("study_pdf_upload_bytes").record(bytes as f64);
}
