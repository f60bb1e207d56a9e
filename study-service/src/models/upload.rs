use axum::body::Bytes;

/// Suffix a filename must carry to be accepted by the PDF endpoint.
/// Matched exactly, so `NOTES.PDF` is rejected.
pub const PDF_SUFFIX: &str = ".pdf";

/// Image types the note scanner forwards, with the extensions that imply them.
const IMAGE_TYPES: &[(&str, &[&str])] = &[
    ("image/jpeg", &["jpg", "jpeg"]),
    ("image/png", &["png"]),
    ("image/webp", &["webp"]),
    ("image/heic", &["heic"]),
    ("image/heif", &["heif"]),
];

/// A file received through a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    content: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            content,
        }
    }

    /// Attach the `Content-Type` the client declared for this part.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Text after the last `.` in the filename, if any.
    pub fn declared_extension(&self) -> Option<&str> {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    pub fn is_pdf(&self) -> bool {
        self.filename.ends_with(PDF_SUFFIX)
    }

    /// Image MIME type of the upload, if it is a supported image.
    ///
    /// The declared part type wins when it names a supported image; otherwise
    /// the filename extension decides.
    pub fn image_mime_type(&self) -> Option<&'static str> {
        let declared = self.content_type.as_deref().and_then(|ct| {
            let essence = ct.split(';').next().unwrap_or_default().trim();
            IMAGE_TYPES
                .iter()
                .find(|(mime, _)| mime.eq_ignore_ascii_case(essence))
                .map(|(mime, _)| *mime)
        });

        declared.or_else(|| {
            let ext = self.declared_extension()?.to_ascii_lowercase();
            IMAGE_TYPES
                .iter()
                .find(|(_, exts)| exts.contains(&ext.as_str()))
                .map(|(mime, _)| *mime)
        })
    }
}
