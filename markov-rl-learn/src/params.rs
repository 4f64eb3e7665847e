//! Learning-rate, discount, and exploration parameters

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Per-step decrement applied to `alpha` and `epsilon` during
/// simulation.
pub const DECAY_STEP: f64 = 1e-4;

/// Lower bound the learning rate never decays past.
pub const ALPHA_FLOOR: f64 = 0.05;

/// Parameters for sample-based learning.
///
/// `alpha` is the learning rate, `gamma` the discount factor, and
/// `epsilon` the exploration rate. The Q-learning update never reads
/// `epsilon`; it exists solely for exploration policies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parametrization {
    /// Learning rate
    pub alpha: f64,
    /// Discount factor
    pub gamma: f64,
    /// Exploration rate
    pub epsilon: f64,
}

/// Parametrization shared between concurrently running tasks.
///
/// The simulation pipeline decays the parameters from its driver stage
/// while its learner stage reads them, so shared access goes through a
/// lock and readers take a [`Copy`] snapshot per step.
pub type SharedParametrization = Arc<RwLock<Parametrization>>;

impl Parametrization {
    /// Create a new parametrization.
    #[must_use]
    pub fn new(alpha: f64, gamma: f64, epsilon: f64) -> Self {
        Self {
            alpha,
            gamma,
            epsilon,
        }
    }

    /// Apply one decay step.
    ///
    /// `alpha` and `epsilon` each lose [`DECAY_STEP`], floored at
    /// [`ALPHA_FLOOR`] and zero respectively. `gamma` never changes.
    pub fn decay(&mut self) {
        self.alpha = (self.alpha - DECAY_STEP).max(ALPHA_FLOOR);
        self.epsilon = (self.epsilon - DECAY_STEP).max(0.0);
    }

    /// Wrap into the shared form used by the simulation pipeline.
    #[must_use]
    pub fn shared(self) -> SharedParametrization {
        Arc::new(RwLock::new(self))
    }
}
