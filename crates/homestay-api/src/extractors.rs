//! # Request Extraction Helpers
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and pass it through
//! [`extract_validated_json`], so that malformed bodies become a structured
//! 400 and well-formed bodies with bad field values become a 422.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Field-level validation for request bodies, run after deserialization.
pub trait Validate {
    /// Return a human-readable reason when the body is invalid.
    fn validate(&self) -> Result<(), String>;
}

/// Maximum length of free-text fields.
pub const MAX_TEXT_LEN: usize = 1000;

/// Unwrap a JSON body.
///
/// Syntax errors and a missing content type map to 400. A body that parses
/// as JSON but does not fit the target type (unknown enum value, invalid
/// email, wrong field type) maps to 422.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result.map(|Json(v)| v).map_err(|err| match err {
        JsonRejection::JsonDataError(e) => AppError::Validation(e.body_text()),
        other => AppError::BadRequest(other.body_text()),
    })
}

/// Unwrap a JSON body and run its [`Validate`] impl.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Reject a blank required text field.
pub fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    check_len(field, value)
}

/// Reject an over-long text field.
pub fn check_len(field: &str, value: &str) -> Result<(), String> {
    if value.len() > MAX_TEXT_LEN {
        return Err(format!("{field} must not exceed {MAX_TEXT_LEN} characters"));
    }
    Ok(())
}

/// Same as [`require_text`] but only when the field is present.
pub fn require_text_if_present(field: &str, value: Option<&str>) -> Result<(), String> {
    value.map_or(Ok(()), |v| require_text(field, v))
}

/// Case-insensitive substring match used by every list filter.
pub fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(
            require_text("room_number", "   ").unwrap_err(),
            "room_number is required"
        );
        assert!(require_text("room_number", "101").is_ok());
    }

    #[test]
    fn long_text_is_rejected() {
        let long = "x".repeat(MAX_TEXT_LEN + 1);
        assert!(check_len("notes", &long).is_err());
    }

    #[test]
    fn optional_text_checked_only_when_present() {
        assert!(require_text_if_present("name", None).is_ok());
        assert!(require_text_if_present("name", Some("")).is_err());
    }

    #[test]
    fn substring_match_ignores_case() {
        assert!(contains_ci("Fire Safety NOC", "safety"));
        assert!(!contains_ci("Fire Safety NOC", "gst"));
    }
}
