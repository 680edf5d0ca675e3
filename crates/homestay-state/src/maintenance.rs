//! # Maintenance Ticket Lifecycle
//!
//! ```text
//! Pending ──▶ InProgress ──▶ Completed (terminal)
//!    │                           ▲
//!    └───────────────────────────┘
//! ```
//!
//! Quick jobs may be closed straight from `Pending`.

use homestay_core::MaintenanceStatus;

use crate::transition::Lifecycle;

impl Lifecycle for MaintenanceStatus {
    const MACHINE: &'static str = "maintenance";

    fn initial() -> Self {
        Self::Pending
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    fn can_transition_to(&self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::InProgress)
                | (Self::Pending, Self::Completed)
                | (Self::InProgress, Self::Completed)
        )
    }
}
