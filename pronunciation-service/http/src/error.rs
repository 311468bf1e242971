use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

const ANALYSIS_FAILED: &str = "Failed to analyze pronunciation";
const NO_AUDIO_FILE: &str = "No audio file provided";

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("payload too large: {message}")]
    PayloadTooLarge { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl HttpError {
    pub fn bad_request(message: &str) -> Self {
        Self::BadRequest {
            message: message.to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Body that is not `multipart/form-data` carries no files.
impl From<MultipartRejection> for HttpError {
    fn from(rejection: MultipartRejection) -> Self {
        tracing::debug!(rejection = %rejection.body_text(), "request is not multipart");
        Self::bad_request(NO_AUDIO_FILE)
    }
}

/// Oversized bodies keep their 413; any other broken multipart stream is a
/// failed analysis.
impl From<MultipartError> for HttpError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge {
                message: err.body_text(),
            }
        } else {
            Self::internal(err.body_text())
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            HttpError::PayloadTooLarge { message } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": message })),
            )
                .into_response(),
            HttpError::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": ANALYSIS_FAILED,
                    "message": message,
                })),
            )
                .into_response(),
        }
    }
}
