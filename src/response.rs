use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// ErrorCode
///
/// Stable, machine-readable failure identifiers. Clients branch on these, never on `message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    ValidationError,
    ConflictError,
    JsonParseError,
    PayloadTooLarge,
    UnsupportedMediaType,
    NotFoundError,
    MethodNotAllowed,
    InternalServerError,
    ServiceUnavailable,
}

/// FieldError
///
/// One rejected input field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Envelope
///
/// The uniform body of every response: `{message, data, errorCode}`. Success responses carry
/// `errorCode: null`; failures carry a code and, where useful, field-level `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: Option<T>,
    #[serde(rename = "errorCode")]
    pub error_code: Option<ErrorCode>,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            error_code: None,
        }
    }

    pub fn failure(message: impl Into<String>, error_code: ErrorCode, data: Option<T>) -> Self {
        Self {
            message: message.into(),
            data,
            error_code: Some(error_code),
        }
    }
}

/// ApiResponse
///
/// Pairs an envelope with the HTTP status it is sent under.
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub body: Envelope<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope::success(message, data),
        }
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: Envelope::success(message, data),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
