//! # Error Hierarchy
//!
//! Structured error types shared across the workspace, built with `thiserror`.
//!
//! Each variant carries the offending input and, where useful, what was
//! expected, so that a rejected form can be corrected without guesswork.

use thiserror::Error;

/// Validation errors for form fields and domain primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was missing or blank.
    #[error("{field} is required")]
    MissingField {
        /// The field name as it appears on the wire.
        field: String,
    },

    /// Email address fails basic structural checks.
    #[error("invalid email address: \"{0}\"")]
    InvalidEmail(String),

    /// Phone number has fewer than 10 digits or stray characters.
    #[error("invalid phone number: \"{0}\" (expected at least 10 digits)")]
    InvalidPhone(String),

    /// URL is not an absolute http(s) URL.
    #[error("invalid URL: \"{0}\" (expected http:// or https://)")]
    InvalidUrl(String),

    /// A numeric field is outside its permitted range.
    #[error("{field} {reason}")]
    OutOfRange {
        /// The field name as it appears on the wire.
        field: String,
        /// Why the value was rejected, e.g. "must be at least 1".
        reason: String,
    },

    /// A string did not match any member of a closed vocabulary.
    #[error("unknown {kind}: \"{value}\" (expected one of: {expected})")]
    UnknownVariant {
        /// The vocabulary, e.g. "room type".
        kind: &'static str,
        /// The string that failed to parse.
        value: String,
        /// Comma-separated list of accepted values.
        expected: String,
    },

    /// A date string is not a valid `YYYY-MM-DD` calendar date.
    #[error("invalid date: \"{value}\" ({reason})")]
    InvalidDate {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::MissingField`].
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::OutOfRange`].
    pub fn out_of_range(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors during lifecycle state machine transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateTransitionError {
    /// The attempted transition is not valid from the current state.
    #[error("invalid {machine} transition from {from} to {to}")]
    InvalidTransition {
        /// Which lifecycle, e.g. "booking".
        machine: &'static str,
        /// The current state name.
        from: String,
        /// The attempted target state name.
        to: String,
    },

    /// The record is in a terminal state and accepts no further transitions.
    #[error("{machine} is in terminal state {state}")]
    TerminalState {
        /// Which lifecycle, e.g. "booking".
        machine: &'static str,
        /// The terminal state name.
        state: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_display() {
        let err = ValidationError::missing("room_number");
        assert_eq!(err.to_string(), "room_number is required");
    }

    #[test]
    fn out_of_range_display() {
        let err = ValidationError::out_of_range("max_occupancy", "must be at least 1");
        assert_eq!(err.to_string(), "max_occupancy must be at least 1");
    }

    #[test]
    fn unknown_variant_lists_expected_values() {
        let err = ValidationError::UnknownVariant {
            kind: "room type",
            value: "penthouse".to_string(),
            expected: "single, double".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("penthouse"));
        assert!(msg.contains("single, double"));
    }

    #[test]
    fn invalid_phone_mentions_digit_count() {
        let err = ValidationError::InvalidPhone("123".to_string());
        assert!(err.to_string().contains("10 digits"));
    }

    #[test]
    fn invalid_transition_display() {
        let err = StateTransitionError::InvalidTransition {
            machine: "booking",
            from: "confirmed".to_string(),
            to: "checked_out".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("booking"));
        assert!(msg.contains("confirmed"));
        assert!(msg.contains("checked_out"));
    }

    #[test]
    fn terminal_state_display() {
        let err = StateTransitionError::TerminalState {
            machine: "payment",
            state: "refunded".to_string(),
        };
        assert_eq!(err.to_string(), "payment is in terminal state refunded");
    }
}
