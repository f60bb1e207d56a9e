use super::{ExtractionError, PdfExtractor};
use crate::services::executor::CommandExecutor;
use async_trait::async_trait;

/// Extracts text with poppler's `pdftotext`, reading the PDF from stdin and
/// writing UTF-8 text to stdout.
pub struct PdftotextExtractor {
    program: String,
    executor: CommandExecutor,
}

impl PdftotextExtractor {
    pub fn new(program: impl Into<String>, executor: CommandExecutor) -> Self {
        Self {
            program: program.into(),
            executor,
        }
    }

    fn args() -> [&'static str; 4] {
        ["-enc", "UTF-8", "-", "-"]
    }
}

#[async_trait]
impl PdfExtractor for PdftotextExtractor {
    async fn extract(&self, content: &[u8]) -> Result<String, ExtractionError> {
        tracing::info!(bytes = content.len(), "Extracting PDF text");

        let output = self
            .executor
            .execute(&self.program, &Self::args(), content)
            .await?;

        let text = String::from_utf8_lossy(&output.stdout).into_owned();

        tracing::info!(text_length = text.len(), "PDF text extraction completed");

        Ok(text)
    }
}
