#![deny(missing_docs)]

//! # homestay-core: Foundational Types for the Homestay Stack
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies, only `serde`,
//! `thiserror`, `chrono`, `uuid`, and `rust_decimal` from the ecosystem.
//!
//! ## Design Principles
//!
//! 1. **One enum per closed vocabulary.** Room types, lifecycle statuses,
//!    payment methods and so on are exhaustive enums with a single string
//!    form each. Unknown strings are rejected at the boundary.
//!
//! 2. **Money is exact.** Amounts are [`rust_decimal::Decimal`]. Rounding to
//!    the currency minor unit happens only in [`money::format_inr`].
//!
//! 3. **Time is injected.** Anything that depends on "now" receives it from a
//!    [`Clock`], so derived values stay deterministic under test.
//!
//! 4. **Structured errors.** [`ValidationError`] and [`StateTransitionError`]
//!    carry the offending input; no `.unwrap()` outside tests.

pub mod domain;
pub mod error;
pub mod identity;
pub mod money;
pub mod temporal;

pub use domain::{
    BookingPaymentStatus, BookingStatus, ComplianceDocumentType, ComplianceStatus, IdType,
    MaintenancePriority, MaintenanceStatus, MaintenanceType, PaymentMethod, PaymentStatus,
    RoomStatus, RoomType, StaffRole, StaffStatus, KNOWN_PERMISSIONS,
};
pub use error::{StateTransitionError, ValidationError};
pub use identity::{BookingReference, DocumentUrl, EmailAddress, InvoiceNumber, PhoneNumber};
pub use money::{format_inr, round_currency};
pub use temporal::{parse_date, Clock, FixedClock, SystemClock};
