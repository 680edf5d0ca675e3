//! # Stay Cost
//!
//! Nights between two calendar dates, and the subtotal / GST / total for a
//! stay at a nightly rate. Arithmetic is exact; nothing is rounded here.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;

/// GST rate applied to room tariffs unless configured otherwise.
pub const DEFAULT_GST_RATE_PERCENT: Decimal = Decimal::from_parts(18, 0, 0, false, 0);

/// Subtotal, tax, and total for a stay. `total == subtotal + tax` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayCost {
    /// Nightly rate multiplied by nights.
    pub subtotal: Decimal,
    /// GST on the subtotal.
    pub tax: Decimal,
    /// Amount payable.
    pub total: Decimal,
}

/// A priced stay between two dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayQuote {
    /// Arrival date.
    pub check_in: NaiveDate,
    /// Departure date.
    pub check_out: NaiveDate,
    /// Number of nights between arrival and departure.
    pub nights: u32,
    /// Nightly rate used.
    pub rate_per_night: Decimal,
    /// Tax rate applied, in percent.
    pub tax_rate_percent: Decimal,
    /// The resulting amounts.
    #[serde(flatten)]
    pub cost: StayCost,
}

/// Compute subtotal, tax, and total for `nights` at `rate`.
///
/// # Errors
///
/// - [`CalcError::NegativeAmount`] if `rate` or `tax_rate_percent` is negative.
/// - [`CalcError::InvalidStay`] if `nights` is zero.
/// - [`CalcError::Overflow`] if an amount leaves the decimal range.
pub fn compute_stay_cost(
    rate: Decimal,
    nights: u32,
    tax_rate_percent: Decimal,
) -> Result<StayCost, CalcError> {
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(CalcError::NegativeAmount {
            field: "rate_per_night",
            value: rate,
        });
    }
    if tax_rate_percent.is_sign_negative() && !tax_rate_percent.is_zero() {
        return Err(CalcError::NegativeAmount {
            field: "tax_rate_percent",
            value: tax_rate_percent,
        });
    }
    if nights == 0 {
        return Err(CalcError::invalid_stay("a stay must be at least one night"));
    }

    let subtotal = rate
        .checked_mul(Decimal::from(nights))
        .ok_or(CalcError::Overflow { what: "subtotal" })?;
    let tax = subtotal
        .checked_mul(tax_rate_percent)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(CalcError::Overflow { what: "tax" })?;
    let total = subtotal
        .checked_add(tax)
        .ok_or(CalcError::Overflow { what: "total" })?;

    Ok(StayCost {
        subtotal,
        tax,
        total,
    })
}

/// Whole calendar days from `check_in` to `check_out`.
///
/// # Errors
///
/// [`CalcError::InvalidStay`] unless `check_out` is strictly after `check_in`.
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> Result<u32, CalcError> {
    let days = (check_out - check_in).num_days();
    if days <= 0 {
        return Err(CalcError::invalid_stay(format!(
            "check-out {check_out} must be after check-in {check_in}"
        )));
    }
    u32::try_from(days).map_err(|_| CalcError::invalid_stay("stay is too long"))
}

/// Price a stay from its dates.
pub fn quote_stay(
    rate: Decimal,
    check_in: NaiveDate,
    check_out: NaiveDate,
    tax_rate_percent: Decimal,
) -> Result<StayQuote, CalcError> {
    let nights = nights_between(check_in, check_out)?;
    let cost = compute_stay_cost(rate, nights, tax_rate_percent)?;
    tracing::debug!(%check_in, %check_out, nights, total = %cost.total, "quoted stay");
    Ok(StayQuote {
        check_in,
        check_out,
        nights,
        rate_per_night: rate,
        tax_rate_percent,
        cost,
    })
}

/// Check a party size against a room's maximum occupancy.
///
/// # Errors
///
/// - [`CalcError::InvalidStay`] if `guests` is zero.
/// - [`CalcError::CapacityExceeded`] if `guests > max_occupancy`.
pub fn check_capacity(guests: u32, max_occupancy: u32) -> Result<(), CalcError> {
    if guests == 0 {
        return Err(CalcError::invalid_stay("at least one guest is required"));
    }
    if guests > max_occupancy {
        return Err(CalcError::CapacityExceeded {
            guests,
            max_occupancy,
        });
    }
    Ok(())
}
