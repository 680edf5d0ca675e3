//! # Transition Machinery
//!
//! The shared shape of every lifecycle: a status enum, a transition table,
//! a terminal-state check, and a log of the transitions taken.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use homestay_core::StateTransitionError;
use serde::{Deserialize, Serialize};

/// A lifecycle over a closed status enum.
///
/// Implementors supply the machine name, the terminal states, and the
/// transition table; [`Lifecycle::transition`] enforces them.
pub trait Lifecycle: Copy + Eq + Display {
    /// Machine name used in error messages, e.g. "booking".
    const MACHINE: &'static str;

    /// Status a freshly created record starts in.
    fn initial() -> Self;

    /// Whether no further transitions are allowed.
    fn is_terminal(&self) -> bool;

    /// Whether the table has an edge from `self` to `to`.
    fn can_transition_to(&self, to: Self) -> bool;

    /// Validate a move from `self` to `to` and return the new status.
    ///
    /// # Errors
    ///
    /// - [`StateTransitionError::TerminalState`] if `self` is terminal.
    /// - [`StateTransitionError::InvalidTransition`] if the table has no
    ///   such edge. Self-loops are never edges.
    fn transition(self, to: Self) -> Result<Self, StateTransitionError> {
        if self.is_terminal() {
            return Err(StateTransitionError::TerminalState {
                machine: Self::MACHINE,
                state: self.to_string(),
            });
        }
        if !self.can_transition_to(to) {
            return Err(StateTransitionError::InvalidTransition {
                machine: Self::MACHINE,
                from: self.to_string(),
                to: to.to_string(),
            });
        }
        Ok(to)
    }
}

/// One entry in a record's transition log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord<S> {
    /// Status before the transition.
    pub from_state: S,
    /// Status after the transition.
    pub to_state: S,
    /// When the transition was applied.
    pub timestamp: DateTime<Utc>,
    /// Operator-supplied reason, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Move `state` to `to`, appending to `log` on success.
///
/// On error neither `state` nor `log` is modified.
pub fn apply<S: Lifecycle>(
    state: &mut S,
    log: &mut Vec<TransitionRecord<S>>,
    to: S,
    at: DateTime<Utc>,
    reason: Option<String>,
) -> Result<(), StateTransitionError> {
    let from = *state;
    *state = from.transition(to)?;
    log.push(TransitionRecord {
        from_state: from,
        to_state: to,
        timestamp: at,
        reason,
    });
    Ok(())
}
