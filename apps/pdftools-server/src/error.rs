//! Error types for the pdftools server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdftools_core::PdfToolsError;
use serde::Serialize;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("Invalid page range: {0}")]
    InvalidRange(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload limit exceeded: {0}")]
    UploadLimit(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::InvalidPdf(msg) => (StatusCode::BAD_REQUEST, "INVALID_PDF", msg.clone()),
            ServerError::InvalidRange(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_RANGE", msg.clone())
            }
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ServerError::UploadLimit(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "UPLOAD_LIMIT_EXCEEDED",
                msg.clone(),
            ),
            ServerError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<PdfToolsError> for ServerError {
    fn from(err: PdfToolsError) -> Self {
        match err {
            PdfToolsError::Parse(msg) => ServerError::InvalidPdf(msg),
            PdfToolsError::InvalidRange(msg) => ServerError::InvalidRange(msg),
            PdfToolsError::Operation(msg) => ServerError::InvalidRequest(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}
