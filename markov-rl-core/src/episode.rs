//! Observed transition records

use serde::{Deserialize, Serialize};

/// A single observed or simulated transition.
///
/// Episodes are transient: a simulator produces one per step and a
/// learner consumes it immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode<S, A> {
    /// Starting state
    pub state: S,
    /// Action taken
    pub action: A,
    /// Immediate reward
    pub reward: f64,
    /// Where the transition ended up
    pub next_state: S,
}

impl<S, A> Episode<S, A> {
    /// Create a new episode record.
    pub fn new(state: S, action: A, reward: f64, next_state: S) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
        }
    }
}
