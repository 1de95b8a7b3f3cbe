//! Input rules for registration payloads and the `ValidatedJson` extractor that enforces them.

use std::borrow::Cow;
use std::sync::LazyLock;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, StatusCode, header},
};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{error::ApiError, models::Gender, response::FieldError};

/// National ID: 16 digits. Leading category digit, four-digit birth year (19xx/20xx),
/// a sex digit (7 or 8), then ten serial digits.
pub static NATIONAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-3](19|20)\d{2}[78]\d{10}$").unwrap());

/// Phone number in E.164 form: a `+`, a non-zero country code digit, then 7 to 14 digits.
pub static PHONE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{7,14}$").unwrap());

pub const PASSWORD_MIN_LEN: usize = 8;

const PASSWORD_RULE: &str =
    "Password must have at least 8 characters, including uppercase, lowercase, and a digit";

pub fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    if gender.parse::<Gender>().is_ok() {
        return Ok(());
    }
    let allowed = Gender::ALL.map(Gender::as_str).join(", ");
    Err(ValidationError::new("gender")
        .with_message(Cow::Owned(format!("gender must be one of [{}]", allowed))))
}

/// Rejects values that are empty once surrounding whitespace is trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= PASSWORD_MIN_LEN;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_upper && has_lower && has_digit {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength").with_message(Cow::Borrowed(PASSWORD_RULE)))
    }
}

/// TextField
///
/// Wire metadata for one string-typed request field: its Rust name, its JSON name, and the
/// message reported when the client sends a non-string value for it.
#[derive(Debug, Clone, Copy)]
pub struct TextField {
    pub name: &'static str,
    pub wire: &'static str,
    pub type_mismatch: &'static str,
}

impl TextField {
    pub const fn new(name: &'static str, wire: &'static str, type_mismatch: &'static str) -> Self {
        Self {
            name,
            wire,
            type_mismatch,
        }
    }
}

/// Request payloads whose fields are all JSON strings. The declared order is the order
/// field errors are reported in.
pub trait TextFields {
    const TEXT_FIELDS: &'static [TextField];
}

/// Flattens `validator` output into one `FieldError` per field, in declared field order.
///
/// When a field breaks several rules, the "required"/"length"/"blank" failure wins so an
/// empty or whitespace-only string reads as missing rather than malformed.
pub fn collect_field_errors(errors: &ValidationErrors, fields: &[TextField]) -> Vec<FieldError> {
    let by_field = errors.field_errors();
    let mut out = Vec::new();

    for field in fields {
        let Some(field_errors) = by_field
            .get(field.wire)
            .or_else(|| by_field.get(field.name))
        else {
            continue;
        };

        let chosen = field_errors
            .iter()
            .find(|e| matches!(&*e.code, "required" | "length" | "blank"))
            .or_else(|| field_errors.first());

        if let Some(error) = chosen {
            let reason = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field.wire));
            out.push(FieldError::new(field.wire, reason));
        }
    }

    out
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|ct| {
            let essence = ct.split(';').next().unwrap_or_default().trim().to_lowercase();
            essence == "application/json" || essence.ends_with("+json")
        })
        .unwrap_or(false)
}

/// ValidatedJson
///
/// JSON body extractor that runs the payload's `Validate` rules before the handler sees it.
///
/// Rejections, in the order they are checked:
/// 1. missing/foreign content type: 415
/// 2. body over the configured limit: 413
/// 3. unparsable JSON or a non-object body: 400 / 422
/// 4. wrong JSON types and rule violations: 422, every offending field listed once
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + TextFields,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Err(ApiError::UnsupportedMediaType);
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge
            } else {
                ApiError::MalformedJson(rejection.body_text())
            }
        })?;

        let mut value: Value =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::MalformedJson(e.to_string()))?;

        let Some(object) = value.as_object_mut() else {
            return Err(ApiError::Validation(vec![FieldError::new(
                "body",
                "Request body must be a JSON object",
            )]));
        };

        // Shape pass: a non-string value is reported with the field's own message, then
        // blanked so the typed decode below can still run and surface the other fields.
        let mut mistyped = Vec::new();
        for field in T::TEXT_FIELDS {
            if let Some(slot) = object.get_mut(field.wire) {
                if !slot.is_string() && !slot.is_null() {
                    mistyped.push(field.wire);
                    *slot = Value::Null;
                }
            }
        }

        let payload: T =
            serde_json::from_value(value).map_err(|e| ApiError::MalformedJson(e.to_string()))?;

        let rule_errors = match payload.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => collect_field_errors(&errors, T::TEXT_FIELDS),
        };

        if mistyped.is_empty() && rule_errors.is_empty() {
            return Ok(ValidatedJson(payload));
        }

        let errors = T::TEXT_FIELDS
            .iter()
            .filter_map(|field| {
                if mistyped.contains(&field.wire) {
                    Some(FieldError::new(field.wire, field.type_mismatch))
                } else {
                    rule_errors.iter().find(|e| e.field == field.wire).cloned()
                }
            })
            .collect();

        Err(ApiError::Validation(errors))
    }
}
