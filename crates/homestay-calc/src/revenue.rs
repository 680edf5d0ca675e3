//! # Revenue Aggregation
//!
//! Filtered sums over a snapshot of records. The record type is generic;
//! callers supply accessors for the status and the amount, so the same
//! functions total payments, bookings, maintenance costs, or salaries.
//!
//! Aggregates saturate at [`Decimal::MAX`] / [`Decimal::MIN`] rather than
//! failing. A single computed amount that overflows is an error
//! ([`crate::CalcError::Overflow`]); a report over stored amounts always
//! yields a figure.

use homestay_core::PaymentStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sum `amount_of` over every record whose status equals `wanted`.
///
/// Saturates at the decimal range instead of overflowing.
pub fn sum_by_status<'a, T, S, I>(
    records: I,
    status_of: impl Fn(&T) -> S,
    wanted: S,
    amount_of: impl Fn(&T) -> Decimal,
) -> Decimal
where
    T: 'a,
    S: PartialEq,
    I: IntoIterator<Item = &'a T>,
{
    sum_where(records, |record| status_of(record) == wanted, amount_of)
}

/// Sum `amount_of` over every record matching `predicate`.
///
/// Saturates at the decimal range instead of overflowing.
pub fn sum_where<'a, T, I>(
    records: I,
    predicate: impl Fn(&T) -> bool,
    amount_of: impl Fn(&T) -> Decimal,
) -> Decimal
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .filter(|record| predicate(record))
        .map(|record| amount_of(record))
        .fold(Decimal::ZERO, saturating_add)
}

/// Add two amounts, clamping at the decimal range instead of panicking.
fn saturating_add(acc: Decimal, amount: Decimal) -> Decimal {
    acc.checked_add(amount).unwrap_or(if amount.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

/// Payment amounts and counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTotals {
    /// Sum of completed payments.
    pub revenue: Decimal,
    /// Sum of payments still pending.
    pub pending: Decimal,
    /// Sum of refunded payments.
    pub refunded: Decimal,
    /// Number of completed payments.
    pub completed_count: usize,
    /// Number of pending payments.
    pub pending_count: usize,
    /// Number of failed payments.
    pub failed_count: usize,
    /// Number of refunded payments.
    pub refunded_count: usize,
}

impl PaymentTotals {
    /// Aggregate `(status, total)` pairs. Sums saturate like [`sum_where`].
    pub fn from_payments(payments: impl IntoIterator<Item = (PaymentStatus, Decimal)>) -> Self {
        let mut totals = Self::default();
        for (status, amount) in payments {
            match status {
                PaymentStatus::Completed => {
                    totals.revenue = saturating_add(totals.revenue, amount);
                    totals.completed_count += 1;
                }
                PaymentStatus::Pending => {
                    totals.pending = saturating_add(totals.pending, amount);
                    totals.pending_count += 1;
                }
                PaymentStatus::Refunded => {
                    totals.refunded = saturating_add(totals.refunded, amount);
                    totals.refunded_count += 1;
                }
                PaymentStatus::Failed => totals.failed_count += 1,
            }
        }
        totals
    }
}
