//! # Booking Lifecycle
//!
//! ```text
//! Confirmed ──▶ CheckedIn ──▶ CheckedOut (terminal)
//!     │
//!     └──▶ Cancelled (terminal)
//! ```
//!
//! A guest who has checked in can no longer cancel; the stay ends with a
//! check-out.

use homestay_core::BookingStatus;

use crate::transition::Lifecycle;

impl Lifecycle for BookingStatus {
    const MACHINE: &'static str = "booking";

    fn initial() -> Self {
        Self::Confirmed
    }

    fn is_terminal(&self) -> bool {
        BookingStatus::is_terminal(self)
    }

    fn can_transition_to(&self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Confirmed, Self::CheckedIn)
                | (Self::Confirmed, Self::Cancelled)
                | (Self::CheckedIn, Self::CheckedOut)
        )
    }
}
