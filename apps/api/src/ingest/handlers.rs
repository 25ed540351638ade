//! Axum route handlers for the Ingest API.

use axum::{extract::Multipart, Json};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::ingest::extract_text;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub filename: String,
    pub text: String,
    pub char_count: usize,
}

/// POST /api/v1/ingest
///
/// Multipart form with one `file` field (.txt, .md, .docx, .xlsx or .pdf).
/// Returns the extracted text, which the client passes on as generation `extra`
/// or as a quotation `cost_reference`.
pub async fn handle_ingest(mut multipart: Multipart) -> Result<Json<IngestResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Uploaded file has no filename".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;

        // CPU-bound parsing runs on the blocking pool.
        let name = filename.clone();
        let text = tokio::task::spawn_blocking(move || extract_text(&name, &bytes))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}")))??;

        let char_count = text.chars().count();
        info!("Extracted {char_count} chars from '{filename}'");
        return Ok(Json(IngestResponse {
            filename,
            text,
            char_count,
        }));
    }

    Err(AppError::Validation(format!(
        "Multipart field '{FILE_FIELD}' is required"
    )))
}
