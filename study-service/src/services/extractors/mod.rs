//! PDF text-extraction collaborators.
//!
//! The gateway hands raw upload bytes to a `PdfExtractor` and returns its
//! output unmodified.

pub mod mock;
pub mod pdftotext;

use crate::services::executor::CommandError;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document could not be parsed as a PDF.
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Extraction timed out after {0} seconds")]
    Timeout(u64),

    /// The extraction backend itself could not be run.
    #[error("Extractor unavailable: {0}")]
    Unavailable(String),
}

impl ExtractionError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::ParseError(_) => "parse_error",
            ExtractionError::Timeout(_) => "timeout",
            ExtractionError::Unavailable(_) => "unavailable",
        }
    }
}

impl From<CommandError> for ExtractionError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Timeout(secs) => ExtractionError::Timeout(secs),
            CommandError::Failed { stderr, .. } => ExtractionError::ParseError(stderr),
            CommandError::Spawn { .. } | CommandError::Io(_) => {
                ExtractionError::Unavailable(err.to_string())
            }
        }
    }
}

#[async_trait]
pub trait PdfExtractor: Send + Sync {
    async fn extract(&self, content: &[u8]) -> Result<String, ExtractionError>;
}
