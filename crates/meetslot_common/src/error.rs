// --- File: crates/meetslot_common/src/error.rs ---
//! Application-wide error type shared by all crates.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeetslotError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("External service error ({service}): {message}")]
    ExternalServiceError { service: String, message: String },

    #[error("Service unavailable: {0}")]
    UnavailableError(String),
}

/// Maps an error onto the HTTP status it should be reported with.
pub trait HttpStatusCode {
    fn status_code(&self) -> u16;

    fn http_status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl HttpStatusCode for MeetslotError {
    fn status_code(&self) -> u16 {
        match self {
            MeetslotError::ConfigError(_) => 500,
            MeetslotError::ValidationError(_) => 400,
            MeetslotError::ConflictError(_) => 409,
            MeetslotError::ExternalServiceError { .. } => 502,
            MeetslotError::UnavailableError(_) => 503,
        }
    }
}

impl MeetslotError {
    /// The `(StatusCode, String)` pair axum handlers return as their error.
    pub fn into_response_parts(self) -> (StatusCode, String) {
        (self.http_status(), self.to_string())
    }
}

pub fn config_error(message: impl Into<String>) -> MeetslotError {
    MeetslotError::ConfigError(message.into())
}

pub fn validation_error(message: impl Into<String>) -> MeetslotError {
    MeetslotError::ValidationError(message.into())
}

pub fn conflict(message: impl Into<String>) -> MeetslotError {
    MeetslotError::ConflictError(message.into())
}

pub fn external_service_error(
    service: impl Into<String>,
    message: impl Into<String>,
) -> MeetslotError {
    MeetslotError::ExternalServiceError {
        service: service.into(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(validation_error("bad").status_code(), 400);
        assert_eq!(conflict("taken").status_code(), 409);
        assert_eq!(external_service_error("Google Calendar", "down").status_code(), 502);
        assert_eq!(config_error("missing").http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response_parts() {
        let (status, body) = external_service_error("Gmail", "timeout").into_response_parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, "External service error (Gmail): timeout");
    }
}
