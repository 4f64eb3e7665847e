//! Sample-based learning for Markov decision processes
//!
//! This crate provides the learners that work from experience rather
//! than a known model:
//! - temporal-difference value updates over episode streams
//! - linear Q-function approximation with per-sample updates
//! - the concurrent simulation pipeline driving online training
//!
//! Exact planning over known models lives in `markov-rl-plan`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod linear;
pub mod params;
pub mod pipeline;
pub mod td;

// Re-export learners and their supporting types
pub use linear::{
    dot_checked, feature_vector, max_q_value, q_value, update, DecayingEpsilonGreedy, Feature,
    GreedyQPolicy, LinearProcess, LinearReward,
};
pub use params::{Parametrization, SharedParametrization, ALPHA_FLOOR, DECAY_STEP};
pub use pipeline::{Simulation, Simulator};
pub use td::{temporal_difference_learning, temporal_difference_update};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        temporal_difference_learning, temporal_difference_update, update, Feature, LinearProcess,
        Parametrization, Simulation, Simulator,
    };
    pub use markov_rl_core::prelude::*;
}
