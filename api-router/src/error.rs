use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{error::AppError, storage::document_store::FileError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Internal server error")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(msg) => Self::NotFound(msg),
            AppError::Validation(msg) => Self::ValidationError(msg),
            AppError::File(file_err) => match file_err {
                FileError::EmptyFileName | FileError::DisallowedExtension => {
                    Self::ValidationError(file_err.to_string())
                }
                FileError::FileNotFound(_) => Self::NotFound("PDF not found".to_string()),
                other => {
                    tracing::error!("Internal error: {:?}", other);
                    Self::InternalError("Internal server error".to_string())
                }
            },
            other => {
                tracing::error!("Internal error: {:?}", other);
                Self::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Self::InternalError(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse { error: message },
            ),
            Self::ValidationError(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse { error: message })
            }
            Self::NotFound(message) => (StatusCode::NOT_FOUND, ErrorResponse { error: message }),
        };

        (status, Json(error_response)).into_response()
    }
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    error: String,
}
