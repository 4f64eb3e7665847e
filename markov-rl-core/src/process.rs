//! Process traits describing a Markov decision process

use crate::{Action, State};

/// The interface for an MDP, at the highest level.
///
/// A process is pure: it carries no hidden mutable state, and the
/// action set and reward function may be queried freely. A state with
/// an empty action set is terminal by contract.
pub trait Process: Send + Sync {
    /// State type
    type State: State;
    /// Action type
    type Action: Action;

    /// Legal actions in `state`.
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Reward for the transition `state --action--> next`.
    fn reward(&self, state: &Self::State, action: &Self::Action, next: &Self::State) -> f64;
}

/// A process for which the states and transition function are known.
///
/// Invariant: for every reachable `(s, a)`, the transition
/// probabilities over `outcomes(s, a)` are non-negative and sum to one
/// within floating-point tolerance.
pub trait KnownProcess: Process {
    /// Enumerate every state of the process.
    fn states(&self) -> Vec<Self::State>;

    /// States reachable from `state` by taking `action`.
    fn outcomes(&self, state: &Self::State, action: &Self::Action) -> Vec<Self::State>;

    /// Transition probability `P(next | state, action)`.
    fn transition(&self, state: &Self::State, action: &Self::Action, next: &Self::State) -> f64;
}
