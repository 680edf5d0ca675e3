//! Calculator errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Rejections raised before any derived value is computed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    /// The stay has no positive length, or a date range is inverted.
    #[error("invalid stay: {reason}")]
    InvalidStay {
        /// What is wrong with the stay.
        reason: String,
    },

    /// A monetary input that must be non-negative was negative.
    #[error("{field} must not be negative (got {value})")]
    NegativeAmount {
        /// The input name as it appears on the wire.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// More guests than the room can hold, or none at all.
    #[error("{guests} guest(s) cannot be accommodated in a room for at most {max_occupancy}")]
    CapacityExceeded {
        /// Requested number of guests.
        guests: u32,
        /// The room's maximum occupancy.
        max_occupancy: u32,
    },

    /// A document expires before it was issued.
    #[error("expiry date {expiry_date} is before issue date {issue_date}")]
    InvalidDocumentDates {
        /// Date the document was issued.
        issue_date: NaiveDate,
        /// Date the document expires.
        expiry_date: NaiveDate,
    },

    /// An amount exceeded the representable decimal range.
    #[error("amount overflow while computing {what}")]
    Overflow {
        /// Which quantity overflowed.
        what: &'static str,
    },
}

impl CalcError {
    pub(crate) fn invalid_stay(reason: impl Into<String>) -> Self {
        Self::InvalidStay {
            reason: reason.into(),
        }
    }
}
