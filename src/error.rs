use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    repository::RepositoryError,
    response::{ApiResponse, Envelope, ErrorCode, FieldError},
};

/// ApiError
///
/// Every failure a request can end in. Each variant maps to exactly one status and
/// `errorCode`; internal detail carried by a variant is logged, never returned.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request validation failed")]
    Validation(Vec<FieldError>),

    #[error("user already exists")]
    Conflict,

    #[error("registration transaction failed: {0}")]
    Transaction(#[source] RepositoryError),

    #[error("infrastructure failure: {0}")]
    Infrastructure(String),

    #[error("malformed JSON body: {0}")]
    MalformedJson(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("unsupported media type")]
    UnsupportedMediaType,

    #[error("route not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("service unavailable")]
    Unavailable,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Transaction(e) if e.is_unique_violation() => StatusCode::CONFLICT,
            ApiError::Transaction(_) | ApiError::Infrastructure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::MalformedJson(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::Validation(_) => ErrorCode::ValidationError,
            ApiError::Conflict => ErrorCode::ConflictError,
            ApiError::Transaction(e) if e.is_unique_violation() => ErrorCode::ConflictError,
            ApiError::Transaction(_) | ApiError::Infrastructure(_) => {
                ErrorCode::InternalServerError
            }
            ApiError::MalformedJson(_) => ErrorCode::JsonParseError,
            ApiError::PayloadTooLarge => ErrorCode::PayloadTooLarge,
            ApiError::UnsupportedMediaType => ErrorCode::UnsupportedMediaType,
            ApiError::NotFound => ErrorCode::NotFoundError,
            ApiError::MethodNotAllowed => ErrorCode::MethodNotAllowed,
            ApiError::Unavailable => ErrorCode::ServiceUnavailable,
        }
    }

    /// The client-facing message. Stable per variant; no store or parser detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "Validation failed",
            ApiError::Conflict => "user already exists",
            ApiError::Transaction(e) if e.is_unique_violation() => "user already exists",
            ApiError::Transaction(_) | ApiError::Infrastructure(_) => "Internal server error",
            ApiError::MalformedJson(_) => "Invalid JSON payload",
            ApiError::PayloadTooLarge => "Request payload is too large",
            ApiError::UnsupportedMediaType => "Content-Type must be application/json",
            ApiError::NotFound => "Route not found",
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::Unavailable => "Service unavailable",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error_code = ?code, "request failed: {}", self);
        } else {
            tracing::info!(error_code = ?code, "request rejected: {}", self);
        }

        let message = self.public_message();
        let data = match self {
            ApiError::Validation(fields) => Some(fields),
            _ => None,
        };

        ApiResponse {
            status,
            body: Envelope::failure(message, code, data),
        }
        .into_response()
    }
}

/// StartupError
///
/// Failures while assembling `AppState` from configuration. Fatal: the process should not
/// start serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Hash(#[from] crate::password::HashError),

    #[error(transparent)]
    Token(#[from] crate::auth::TokenError),
}
