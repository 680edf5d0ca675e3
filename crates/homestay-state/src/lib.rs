//! # homestay-state: Lifecycle State Machines
//!
//! Transition tables for the records that move through a lifecycle. The
//! status enums themselves live in `homestay-core`; this crate decides which
//! moves between them are legal and records the moves taken.
//!
//! ## State Machines
//!
//! - **Booking** (`booking.rs`): `Confirmed → CheckedIn → CheckedOut`, or
//!   `Confirmed → Cancelled`.
//!
//! - **Payment** (`payment.rs`): `Pending → Completed → Refunded`, with
//!   `Pending ⇄ Failed` for retries.
//!
//! - **Maintenance** (`maintenance.rs`): `Pending → InProgress → Completed`,
//!   or `Pending → Completed`.
//!
//! ## Design
//!
//! Records are stored and queried with their status as plain data, so the
//! machines operate on the status value rather than on distinct types per
//! state. Every transition goes through [`Lifecycle::transition`], which
//! rejects terminal states and missing edges with a structured
//! [`homestay_core::StateTransitionError`].

pub mod booking;
pub mod maintenance;
pub mod payment;
pub mod transition;

pub use transition::{apply, Lifecycle, TransitionRecord};
