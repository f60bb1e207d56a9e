//! HTTP handlers for the study service.

pub mod health;
pub mod metrics;
pub mod speech;
pub mod study;
pub mod upload;

pub use health::{health_check, readiness_check};
pub use speech::speak;
pub use study::generate;
pub use upload::{scan_notes, upload_pdf};
