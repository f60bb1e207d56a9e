use crate::models::Capability;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use validator::Validate;

/// Body accepted by every text endpoint. No length bound is enforced here;
/// truncation and chunking belong to the provider.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StudyRequest {
    pub text: String,
}

/// One-key response object, e.g. `{"summary": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyResponse {
    capability: Capability,
    content: String,
}

impl StudyResponse {
    pub fn new(capability: Capability, content: String) -> Self {
        Self {
            capability,
            content,
        }
    }
}

impl Serialize for StudyResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.capability.response_key(), &self.content)?;
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractedTextResponse {
    pub text: String,
}

/// Read-aloud result. `audio` is base64; `mime_type` names the raw encoding.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechResponse {
    pub audio: String,
    pub mime_type: String,
}
