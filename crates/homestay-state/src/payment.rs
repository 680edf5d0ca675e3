//! # Payment Lifecycle
//!
//! ```text
//! Pending ──▶ Completed ──▶ Refunded (terminal)
//!    │  ▲
//!    ▼  │
//!   Failed
//! ```
//!
//! A failed payment may be retried, which puts it back into `Pending`.

use homestay_core::PaymentStatus;

use crate::transition::Lifecycle;

impl Lifecycle for PaymentStatus {
    const MACHINE: &'static str = "payment";

    fn initial() -> Self {
        Self::Pending
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Refunded)
    }

    fn can_transition_to(&self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Completed)
                | (Self::Pending, Self::Failed)
                | (Self::Failed, Self::Pending)
                | (Self::Completed, Self::Refunded)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homestay_core::StateTransitionError;

    #[test]
    fn settles_and_refunds() {
        let status = PaymentStatus::initial()
            .transition(PaymentStatus::Completed)
            .unwrap()
            .transition(PaymentStatus::Refunded)
            .unwrap();
        assert_eq!(status, PaymentStatus::Refunded);
        assert!(status.is_terminal());
    }

    #[test]
    fn failed_payment_can_be_retried() {
        let status = PaymentStatus::Pending
            .transition(PaymentStatus::Failed)
            .unwrap()
            .transition(PaymentStatus::Pending)
            .unwrap()
            .transition(PaymentStatus::Completed)
            .unwrap();
        assert_eq!(status, PaymentStatus::Completed);
    }

    #[test]
    fn failed_is_not_terminal() {
        assert!(!PaymentStatus::Failed.is_terminal());
        assert!(!PaymentStatus::Completed.is_terminal());
    }

    #[test]
    fn pending_cannot_be_refunded() {
        assert!(matches!(
            PaymentStatus::Pending.transition(PaymentStatus::Refunded),
            Err(StateTransitionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn completed_cannot_fail() {
        assert!(PaymentStatus::Completed
            .transition(PaymentStatus::Failed)
            .is_err());
    }

    #[test]
    fn refunded_is_final() {
        let err = PaymentStatus::Refunded
            .transition(PaymentStatus::Pending)
            .unwrap_err();
        assert_eq!(err.to_string(), "payment is in terminal state refunded");
    }
}
