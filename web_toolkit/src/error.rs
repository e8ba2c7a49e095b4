//! Library error types and their HTTP status mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::json::JsonResponse;

pub type Result<T> = std::result::Result<T, ToolkitError>;

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("body exceeds the configured limit of {limit} bytes")]
    BodyTooLarge { limit: u64 },

    #[error("malformed multipart upload: {0}")]
    MalformedUpload(String),

    #[error("file type {content_type} is not permitted")]
    DisallowedFileType { content_type: String },

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("body contains unknown field {0}")]
    UnknownField(String),

    #[error("body must contain only one JSON value")]
    TrailingData,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl IntoResponse for ToolkitError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ToolkitError::BodyTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            ToolkitError::DisallowedFileType { .. } => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, self.to_string())
            }
            ToolkitError::MalformedUpload(_)
            | ToolkitError::InvalidJson(_)
            | ToolkitError::UnknownField(_)
            | ToolkitError::TrailingData
            | ToolkitError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ToolkitError::Io(err) => {
                tracing::error!("IO error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ToolkitError::Serialize(err) => {
                tracing::error!("JSON serialization error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(JsonResponse::error(message))).into_response()
    }
}
