use super::{ExtractionError, PdfExtractor};
use async_trait::async_trait;

pub const PLACEHOLDER_TEXT: &str = "Extracted PDF content placeholder";

/// Extractor that ignores its input and returns a fixed text.
#[derive(Default)]
pub struct MockPdfExtractor;

impl MockPdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PdfExtractor for MockPdfExtractor {
    async fn extract(&self, _content: &[u8]) -> Result<String, ExtractionError> {
        Ok(PLACEHOLDER_TEXT.to_string())
    }
}
