pub mod study;

pub use study::{ExtractedTextResponse, SpeechResponse, StudyRequest, StudyResponse};
