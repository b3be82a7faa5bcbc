use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<rewind_core::ProgressError> for AppError {
    fn from(err: rewind_core::ProgressError) -> Self {
        use rewind_core::ProgressError;
        match &err {
            ProgressError::InvalidInterval { .. } | ProgressError::InvalidDuration(_) => {
                Self::bad_request(err.to_string())
            }
            ProgressError::VideoNotFound(_) | ProgressError::RecordNotFound { .. } => {
                Self::not_found(err.to_string())
            }
            ProgressError::WriteConflict { .. } => Self::conflict(err.to_string()),
            ProgressError::Store(_) | ProgressError::Internal(_) => {
                Self::internal(err.to_string())
            }
        }
    }
}
