use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::edit::EditError;
use crate::export::{ExportError, PRINT_BLOCKED_GUIDANCE};
use crate::history::HistoryError;
use crate::ingest::ExtractError;
use crate::layout::page_heights::DragError;
use crate::llm_client::LlmError;

/// Generic text shown for any generation collaborator failure. Details go to the log.
pub const GENERATION_FAILED_MESSAGE: &str = "生成失敗，請檢查 API Key 是否正確設定，或稍後再試。";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Busy: {0}")]
    Busy(String),

    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    #[error("Drag error: {0}")]
    Drag(#[from] DragError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Print surface unavailable")]
    PrintSurfaceUnavailable,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e.to_string())
    }
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        AppError::Extraction(e.to_string())
    }
}

impl From<HistoryError> for AppError {
    fn from(e: HistoryError) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::SurfaceBlocked => AppError::PrintSurfaceUnavailable,
            ExportError::Surface(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Busy(msg) => (StatusCode::CONFLICT, "BUSY", msg.clone()),
            AppError::Edit(e) => match e {
                EditError::UnknownTarget(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
                }
                _ => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
            },
            AppError::Drag(e) => match e {
                DragError::OutOfRange { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
                _ => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            },
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    GENERATION_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::Extraction(msg) => {
                tracing::warn!("Extraction failed: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_FAILED",
                    format!("檔案解析失敗: {msg}"),
                )
            }
            AppError::PrintSurfaceUnavailable => (
                StatusCode::CONFLICT,
                "PRINT_SURFACE_BLOCKED",
                PRINT_BLOCKED_GUIDANCE.to_string(),
            ),
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_llm_error_hides_detail() {
        let (status, body) = body_of(AppError::from(LlmError::EmptyContent)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "GENERATION_FAILED");
        assert_eq!(body["error"]["message"], GENERATION_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_blocked_surface_carries_download_guidance() {
        let (status, body) = body_of(AppError::from(ExportError::SurfaceBlocked)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "PRINT_SURFACE_BLOCKED");
        assert!(body["error"]["message"].as_str().unwrap().contains("下載 HTML"));
    }

    #[tokio::test]
    async fn test_edit_errors_map_by_kind() {
        let (status, _) =
            body_of(EditError::DayOutOfRange { index: 9, len: 3 }.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = body_of(EditError::UnknownTarget("x".to_string()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_extraction_message_is_descriptive() {
        let err = ExtractError::UnsupportedFormat("key".to_string());
        let (status, body) = body_of(err.into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"]["message"].as_str().unwrap().contains("不支援的檔案格式"));
    }
}
