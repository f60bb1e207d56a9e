pub mod executor;
pub mod extractors;
pub mod metrics;
pub mod providers;

pub use executor::CommandExecutor;
pub use extractors::{ExtractionError, PdfExtractor};
pub use providers::{AudioProvider, ProviderError, SpeechAudio, TextProvider};
