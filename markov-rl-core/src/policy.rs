//! Policy abstractions for action selection

use async_trait::async_trait;

use crate::{MdpError, Process, Result};

/// Core policy trait for selecting actions.
///
/// A policy maps a state to an action under a given process. Policies
/// may be stochastic, and may read exploration parameters from outside
/// the process.
#[async_trait]
pub trait Policy<P: Process>: Send + Sync {
    /// Select an action for `state` under `process`.
    async fn act(&self, process: &P, state: &P::State) -> Result<P::Action>;
}

/// Policy that selects uniformly among the legal actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

#[async_trait]
impl<P: Process> Policy<P> for RandomPolicy {
    async fn act(&self, process: &P, state: &P::State) -> Result<P::Action> {
        use rand::seq::SliceRandom;

        process
            .actions(state)
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| MdpError::NoActions(format!("{state:?}")))
    }
}

/// Epsilon-greedy wrapper around a base policy.
///
/// With probability `epsilon` a uniformly random legal action is
/// taken, otherwise selection is delegated to the base policy.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<B> {
    /// Base policy
    pub base: B,
    /// Exploration rate
    pub epsilon: f64,
}

impl<B> EpsilonGreedy<B> {
    /// Create a new epsilon-greedy policy.
    pub fn new(base: B, epsilon: f64) -> Self {
        Self { base, epsilon }
    }

    /// Set the exploration rate.
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }
}

#[async_trait]
impl<P, B> Policy<P> for EpsilonGreedy<B>
where
    P: Process,
    B: Policy<P>,
{
    async fn act(&self, process: &P, state: &P::State) -> Result<P::Action> {
        let explore = rand::random::<f64>() < self.epsilon;
        if explore {
            RandomPolicy.act(process, state).await
        } else {
            self.base.act(process, state).await
        }
    }
}
