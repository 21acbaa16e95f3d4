use crate::model::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use portal_core::StorageError;
use portal_redirector::RedirectorError;
use portal_shortener::ShortenerError;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    Shortener(ShortenerError),
    Redirector(RedirectorError),
    BadRequest(String),
    NotFound(String),
    /// The code existed but its expiration has passed.
    Gone(String),
}

impl From<ShortenerError> for AppError {
    fn from(value: ShortenerError) -> Self {
        Self::Shortener(value)
    }
}

impl From<RedirectorError> for AppError {
    fn from(value: RedirectorError) -> Self {
        Self::Redirector(value)
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Shortener(err) => {
                let status = match err {
                    ShortenerError::InvalidUrl(_)
                    | ShortenerError::InvalidExpiration(_)
                    | ShortenerError::InvalidShortCode(_) => StatusCode::BAD_REQUEST,
                    ShortenerError::AliasConflict(_) => StatusCode::CONFLICT,
                    ShortenerError::AllocationExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    ShortenerError::Storage(err) => storage_status(err),
                };
                (status, err.to_string())
            }
            AppError::Redirector(err) => {
                let RedirectorError::Storage(storage) = err;
                (storage_status(storage), err.to_string())
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Gone(message) => (StatusCode::GONE, message.clone()),
        }
    }
}

fn storage_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        StorageError::AlreadyExists(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(status = %status, error = %message, "request failed");
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
