//! Multipart upload endpoints: PDF text extraction and note scanning.

use crate::dtos::ExtractedTextResponse;
use crate::handlers::study::provider_error;
use crate::models::UploadedFile;
use crate::services::{metrics, ExtractionError};
use crate::startup::AppState;
use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use std::time::Instant;

/// Multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

/// `POST /upload-pdf`: extract plain text from an uploaded `.pdf` file.
pub async fn upload_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractedTextResponse>, AppError> {
    let file = read_upload(&state, multipart).await?;

    if !file.is_pdf() {
        tracing::info!(
            filename = %file.filename(),
            extension = ?file.declared_extension(),
            "Rejected upload with non-PDF filename"
        );
        metrics::record_extraction("invalid_format", file.size());
        return Err(AppError::InvalidFormat("Invalid file format".to_string()));
    }

    tracing::info!(filename = %file.filename(), size = file.size(), "PDF upload received");

    let timeout = state.config.limits.upstream_timeout();
    let result =
        tokio::time::timeout(timeout, state.pdf_extractor.extract(file.content())).await;

    match result {
        Ok(Ok(text)) => {
            metrics::record_extraction("ok", file.size());
            Ok(Json(ExtractedTextResponse { text }))
        }
        Ok(Err(e)) => {
            metrics::record_extraction(e.kind(), file.size());
            tracing::error!(filename = %file.filename(), error = %e, "PDF extraction failed");
            Err(extraction_error(e))
        }
        Err(_) => {
            metrics::record_extraction("timeout", file.size());
            tracing::error!(
                filename = %file.filename(),
                timeout_secs = timeout.as_secs(),
                "PDF extraction timed out"
            );
            Err(AppError::UpstreamTimeout(timeout.as_secs()))
        }
    }
}

/// `POST /scan-notes`: transcribe a photo of notes into plain text.
pub async fn scan_notes(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractedTextResponse>, AppError> {
    let file = read_upload(&state, multipart).await?;

    let Some(mime_type) = file.image_mime_type() else {
        tracing::info!(
            filename = %file.filename(),
            extension = ?file.declared_extension(),
            "Rejected scan that is not a supported image"
        );
        return Err(AppError::InvalidFormat("Invalid file format".to_string()));
    };

    tracing::info!(
        filename = %file.filename(),
        mime_type = %mime_type,
        size = file.size(),
        "Note scan received"
    );

    let timeout = state.config.limits.upstream_timeout();
    let started = Instant::now();
    let result = tokio::time::timeout(
        timeout,
        state.text_provider.scan_notes(file.content(), mime_type),
    )
    .await;

    match result {
        Ok(Ok(text)) => {
            metrics::record_generation("scan_notes", "ok", started.elapsed());
            Ok(Json(ExtractedTextResponse { text }))
        }
        Ok(Err(e)) => {
            metrics::record_generation("scan_notes", e.kind(), started.elapsed());
            tracing::error!(filename = %file.filename(), error = %e, "Note scan failed");
            Err(provider_error(e))
        }
        Err(_) => {
            metrics::record_generation("scan_notes", "timeout", started.elapsed());
            tracing::error!(
                filename = %file.filename(),
                timeout_secs = timeout.as_secs(),
                "Note scan timed out"
            );
            Err(AppError::UpstreamTimeout(timeout.as_secs()))
        }
    }
}

async fn read_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedFile, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        AppError::BadRequest(anyhow::anyhow!(
            "Expected a multipart upload: {}",
            rejection.body_text()
        ))
    })?;

    read_file(&mut multipart, state.config.limits.max_upload_bytes).await
}

/// Read the first field named `file`, or failing that the first field that
/// carries a filename.
async fn read_file(multipart: &mut Multipart, max_bytes: usize) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let is_file_field = field.name() == Some(FILE_FIELD) || field.file_name().is_some();
        if !is_file_field {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let content = read_bounded(field, max_bytes).await?;

        let file = UploadedFile::new(filename, content);
        return Ok(match content_type {
            Some(ct) => file.with_content_type(ct),
            None => file,
        });
    }

    Err(AppError::BadRequest(anyhow::anyhow!("No file uploaded")))
}

async fn read_bounded(field: Field<'_>, max_bytes: usize) -> Result<axum::body::Bytes, AppError> {
    let content = field.bytes().await.map_err(multipart_error)?;

    if content.len() > max_bytes {
        return Err(too_large(max_bytes));
    }

    Ok(content)
}

fn extraction_error(err: ExtractionError) -> AppError {
    match err {
        ExtractionError::Timeout(secs) => AppError::UpstreamTimeout(secs),
        other => AppError::Upstream(other.to_string()),
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart body: {}", err.body_text()))
    }
}

fn too_large(max_bytes: usize) -> AppError {
    AppError::PayloadTooLarge(format!("File too large (max {} bytes)", max_bytes))
}
