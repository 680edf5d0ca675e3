//! # Temporal Types
//!
//! All timestamps are UTC. Business dates (check-in, expiry, scheduled
//! maintenance) are calendar dates without a time component.
//!
//! ## Design Decision
//!
//! Derived values such as compliance status depend on "today". Rather than
//! reading the system clock wherever it is needed, callers obtain the
//! current instant from a [`Clock`] captured once per evaluation. Production
//! code uses [`SystemClock`]; tests pin time with [`FixedClock`].

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ValidationError;

/// Source of the current instant.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current UTC instant.
    fn now(&self) -> DateTime<Utc>;

    /// The current UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Freeze the clock at `instant`.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Freeze the clock at midnight UTC on `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] for anything else, including
/// impossible dates such as `2023-02-30`.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        ValidationError::InvalidDate {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })
}
