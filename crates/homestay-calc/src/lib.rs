#![deny(missing_docs)]

//! # homestay-calc: Derived-Value Calculator
//!
//! Every figure the dashboard shows that is not typed in by an operator is
//! computed here: the price of a stay, the status of a compliance document,
//! the occupancy rate, and revenue totals.
//!
//! ## Design Principles
//!
//! 1. **Pure.** No I/O, no clock reads, no shared state. "Today" is a
//!    parameter.
//!
//! 2. **Validate first.** Inverted date ranges, negative amounts, zero
//!    nights, and over-capacity parties are rejected with [`CalcError`]
//!    before any arithmetic runs.
//!
//! 3. **Exact money.** Amounts are [`rust_decimal::Decimal`] and are never
//!    rounded here; see [`homestay_core::money`] for display rounding.

pub mod compliance;
pub mod error;
pub mod occupancy;
pub mod revenue;
pub mod stay;

pub use compliance::{
    derive_compliance_status, validate_document_dates, ComplianceTally, DocumentValidity,
    DEFAULT_REMINDER_DAYS,
};
pub use error::CalcError;
pub use occupancy::{occupancy_rate, OccupancyBreakdown};
pub use revenue::{sum_by_status, sum_where, PaymentTotals};
pub use stay::{
    check_capacity, compute_stay_cost, nights_between, quote_stay, StayCost, StayQuote,
    DEFAULT_GST_RATE_PERCENT,
};
