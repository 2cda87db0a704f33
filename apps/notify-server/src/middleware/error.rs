//! Error handling - every failure renders the same JSON envelope.

use actix_web::{HttpResponse, http::StatusCode, http::header};
use notif_shared::ApiResponse;

use crate::messages::Messages;

/// Content type of every envelope.
pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Request-level failures.
///
/// Client input errors are raised before any side effect. Configuration
/// errors are deployment faults and are reported distinctly.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Email field is missing or empty")]
    MissingEmail,

    #[error("Email field is not a valid address")]
    InvalidEmail,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("SMTP configuration error: {0}")]
    Configuration(String),

    #[error("Rate limit exceeded, retry in {wait}")]
    RateLimited { wait: String, retry_after_secs: u64 },

    #[error("Mail dispatch failed: {0}")]
    Dispatch(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

impl NotifyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            NotifyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            NotifyError::MissingEmail => StatusCode::BAD_REQUEST,
            NotifyError::InvalidEmail => StatusCode::UNPROCESSABLE_ENTITY,
            NotifyError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            NotifyError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            NotifyError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            NotifyError::Dispatch(_) => StatusCode::BAD_GATEWAY,
            NotifyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            NotifyError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Localized text for the `message` field.
    pub fn message(&self, messages: &Messages) -> String {
        match self {
            NotifyError::MethodNotAllowed => messages.method_not_allowed().to_string(),
            NotifyError::MissingEmail => messages.missing_email().to_string(),
            NotifyError::InvalidEmail => messages.invalid_email().to_string(),
            NotifyError::MalformedBody(_) => messages.malformed_body().to_string(),
            NotifyError::Configuration(detail) => messages.configuration(detail),
            NotifyError::RateLimited { wait, .. } => messages.rate_limited(wait),
            NotifyError::Dispatch(detail) => messages.dispatch_failed(detail),
            NotifyError::Internal(_) => messages.internal().to_string(),
            NotifyError::NotFound => messages.not_found().to_string(),
        }
    }

    pub fn to_response(&self, messages: &Messages) -> HttpResponse {
        match self {
            NotifyError::Configuration(detail) => {
                tracing::error!(error = %detail, "Rejecting request: SMTP is not configured");
            }
            NotifyError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
            }
            _ => {}
        }

        let mut response = HttpResponse::build(self.status_code());
        response.insert_header((header::CONTENT_TYPE, JSON_UTF8));
        match self {
            NotifyError::MethodNotAllowed => {
                response.insert_header((header::ALLOW, "POST, OPTIONS"));
            }
            NotifyError::RateLimited {
                retry_after_secs, ..
            } => {
                response.insert_header((header::RETRY_AFTER, retry_after_secs.to_string()));
            }
            _ => {}
        }

        response.json(ApiResponse::failure(self.message(messages)))
    }
}

/// Result type alias for handlers.
pub type NotifyResult<T> = Result<T, NotifyError>;
