//! # Compliance Status Derivation
//!
//! A compliance document's status is a pure function of its expiry date,
//! its reminder lead time, and the date of evaluation:
//!
//! ```text
//! no expiry                          → valid
//! expiry < today                     → expired
//! expiry − reminder_days ≤ today     → pending_renewal
//! otherwise                          → valid
//! ```
//!
//! A document is in force through its expiry date, so on the expiry date
//! itself it is `pending_renewal`, not `expired`. A reminder window longer
//! than the validity window makes a fresh document `pending_renewal`
//! immediately; that is accepted behaviour.

use chrono::{Days, NaiveDate};
use homestay_core::ComplianceStatus;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;

/// Reminder lead time used when none is supplied.
pub const DEFAULT_REMINDER_DAYS: u32 = 30;

/// Dates that determine a document's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentValidity {
    /// Date the document was issued.
    pub issue_date: NaiveDate,
    /// Date the document lapses, if it ever does.
    pub expiry_date: Option<NaiveDate>,
    /// How many days before expiry renewal becomes due.
    pub reminder_days: u32,
}

impl DocumentValidity {
    /// Build a validity window, rejecting an expiry before the issue date.
    pub fn new(
        issue_date: NaiveDate,
        expiry_date: Option<NaiveDate>,
        reminder_days: u32,
    ) -> Result<Self, CalcError> {
        validate_document_dates(issue_date, expiry_date)?;
        Ok(Self {
            issue_date,
            expiry_date,
            reminder_days,
        })
    }

    /// First date on which the document counts as `pending_renewal`.
    ///
    /// `None` when the document never expires. Saturates at the earliest
    /// representable date when the reminder window reaches past it.
    pub fn renewal_due_on(&self) -> Option<NaiveDate> {
        self.expiry_date.map(|expiry| {
            expiry
                .checked_sub_days(Days::new(u64::from(self.reminder_days)))
                .unwrap_or(NaiveDate::MIN)
        })
    }

    /// Signed number of days from `today` until expiry.
    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date.map(|expiry| (expiry - today).num_days())
    }

    /// Status of the document as of `today`.
    pub fn status_on(&self, today: NaiveDate) -> ComplianceStatus {
        match (self.expiry_date, self.renewal_due_on()) {
            (Some(expiry), _) if expiry < today => ComplianceStatus::Expired,
            (Some(_), Some(due)) if due <= today => ComplianceStatus::PendingRenewal,
            _ => ComplianceStatus::Valid,
        }
    }
}

/// Derive the status of a document as of `today`.
///
/// The issue date does not influence the status; it is accepted so that
/// callers pass the whole validity window in one place.
pub fn derive_compliance_status(
    issue_date: NaiveDate,
    expiry_date: Option<NaiveDate>,
    reminder_days: u32,
    today: NaiveDate,
) -> ComplianceStatus {
    DocumentValidity {
        issue_date,
        expiry_date,
        reminder_days,
    }
    .status_on(today)
}

/// Reject a document whose expiry date precedes its issue date.
pub fn validate_document_dates(
    issue_date: NaiveDate,
    expiry_date: Option<NaiveDate>,
) -> Result<(), CalcError> {
    match expiry_date {
        Some(expiry_date) if expiry_date < issue_date => Err(CalcError::InvalidDocumentDates {
            issue_date,
            expiry_date,
        }),
        _ => Ok(()),
    }
}

/// Count of documents in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceTally {
    /// Documents in the collection.
    pub total: usize,
    /// Documents currently valid.
    pub valid: usize,
    /// Documents past expiry.
    pub expired: usize,
    /// Documents inside their reminder window.
    pub pending_renewal: usize,
}

impl ComplianceTally {
    /// Tally a collection of statuses.
    pub fn from_statuses(statuses: impl IntoIterator<Item = ComplianceStatus>) -> Self {
        statuses.into_iter().fold(Self::default(), |mut tally, status| {
            tally.record(status);
            tally
        })
    }

    /// Add one status to the tally.
    pub fn record(&mut self, status: ComplianceStatus) {
        self.total += 1;
        match status {
            ComplianceStatus::Valid => self.valid += 1,
            ComplianceStatus::Expired => self.expired += 1,
            ComplianceStatus::PendingRenewal => self.pending_renewal += 1,
        }
    }

    /// Documents that need attention (expired or due for renewal).
    pub fn needs_attention(&self) -> usize {
        self.expired + self.pending_renewal
    }
}
