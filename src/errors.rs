use crate::{services::bin_service::BinServiceError, validation::ValidationError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// HTTP-facing error: a status code plus the message sent as `{"error": ...}`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
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
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        tracing::debug!("rejected request: {}", err);
        AppError::bad_request(err.to_string())
    }
}

impl From<BinServiceError> for AppError {
    fn from(err: BinServiceError) -> Self {
        match err {
            BinServiceError::NotFound(id) => {
                tracing::debug!("bin {} not found", id);
                AppError::not_found(err.to_string())
            }
            BinServiceError::Repository(inner) => {
                tracing::error!("store error: {}", inner);
                AppError::internal(inner.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = AppError::from(ValidationError::InvalidId);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid ID format");
    }

    #[test]
    fn missing_bin_is_not_found() {
        let err = AppError::from(BinServiceError::NotFound(ObjectId::new()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Bin not found");
    }

    #[test]
    fn store_errors_surface_their_message() {
        let inner = crate::repository::RepositoryError::MissingId;
        let expected = inner.to_string();
        let err = AppError::from(BinServiceError::Repository(inner));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, expected);
    }
}
