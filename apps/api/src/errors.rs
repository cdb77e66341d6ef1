use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The document was read but no text could be recovered from it.
    #[error("Resume unreadable: {0}")]
    ResumeUnreadable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::NoContent => AppError::ResumeUnreadable(
                "No text could be extracted from the uploaded document".to_string(),
            ),
            ExtractionError::InvalidDocument(msg) => AppError::Validation(msg),
            ExtractionError::Pdf(e) => AppError::Validation(format!("Not a readable PDF: {e}")),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ResumeUnreadable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "RESUME_UNREADABLE",
                msg.clone(),
            ),
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

    #[test]
    fn test_no_content_maps_to_unprocessable() {
        let response = AppError::from(ExtractionError::NoContent).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_invalid_document_maps_to_bad_request() {
        let err = AppError::from(ExtractionError::InvalidDocument("no pages".to_string()));
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_ocr_failure_is_internal() {
        let err = AppError::from(ExtractionError::Ocr("tesseract crashed".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
