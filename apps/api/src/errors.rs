use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Input problems caught before any external call is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please provide some notes, a recording, or a PDF with readable text")]
    EmptyInput,

    #[error("Study material is {chars} characters long; the limit is {limit}. Shorten it and try again")]
    InputTooLong { chars: usize, limit: usize },

    #[error("A study schedule needs the number of hours available")]
    MissingHours,

    #[error("Study hours must be greater than 0 and at most 24 (got {0})")]
    HoursOutOfRange(f64),

    #[error("Item count must be between 1 and 20 (got {0})")]
    InvalidCount(u32),

    #[error("Missing upload field '{0}'")]
    MissingUpload(String),

    #[error("Upload is {bytes} bytes; the limit is {limit}")]
    UploadTooLarge { bytes: usize, limit: usize },

    /// The body limit tripped before the upload could be measured.
    #[error("Upload exceeds the limit of {limit} bytes; choose a smaller file")]
    UploadOverLimit { limit: usize },
}

/// Failures reported by an external collaborator (LLM, speech, PDF extraction).
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "code", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceError {
    #[error("The service rejected the configured credential")]
    Auth,

    #[error("The service is rate limiting requests")]
    RateLimited,

    #[error("The service is unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("The service did not answer in time")]
    Timeout,

    #[error("No speech was detected in the recording")]
    NoSpeechDetected,

    #[error("The document could not be read as a PDF")]
    UnreadableDocument,

    #[error("The document is encrypted")]
    EncryptedDocument,

    #[error("The service returned an empty response")]
    EmptyResponse,
}

impl ServiceError {
    /// Stable machine-readable code, mirrored in the serialized form.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Auth => "AUTH",
            ServiceError::RateLimited => "RATE_LIMITED",
            ServiceError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ServiceError::Timeout => "TIMEOUT",
            ServiceError::NoSpeechDetected => "NO_SPEECH_DETECTED",
            ServiceError::UnreadableDocument => "UNREADABLE_DOCUMENT",
            ServiceError::EncryptedDocument => "ENCRYPTED_DOCUMENT",
            ServiceError::EmptyResponse => "EMPTY_RESPONSE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ServiceError::Auth => StatusCode::UNAUTHORIZED,
            ServiceError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ServiceError::NoSpeechDetected
            | ServiceError::UnreadableDocument
            | ServiceError::EncryptedDocument => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::ServiceUnavailable(_) | ServiceError::EmptyResponse => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Service(e) => {
                tracing::warn!("Service error: {e}");
                (e.status(), e.code(), e.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
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
    fn test_validation_maps_to_bad_request() {
        let response = AppError::from(ValidationError::EmptyInput).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_service_errors_map_to_distinct_statuses() {
        assert_eq!(
            AppError::from(ServiceError::RateLimited).into_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::from(ServiceError::Timeout).into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            AppError::from(ServiceError::EncryptedDocument)
                .into_response()
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_service_error_serializes_with_code() {
        let value = serde_json::to_value(ServiceError::ServiceUnavailable("503".into())).unwrap();
        assert_eq!(value["code"], "SERVICE_UNAVAILABLE");
        assert_eq!(value["detail"], "503");

        let value = serde_json::to_value(ServiceError::Timeout).unwrap();
        assert_eq!(value["code"], ServiceError::Timeout.code());
    }
}
