//! Linear Q-function approximation
//!
//! Approximates `Q(s, a)` as a weighted sum over a fixed ordered list
//! of feature functions, with one gradient-style update per experience
//! sample. Used when the state space is too large to tabulate.

use std::sync::Arc;

use async_trait::async_trait;
use ndarray::Array1;

use markov_rl_core::{Episode, MdpError, Policy, Process, RandomPolicy, Result};

use crate::params::{Parametrization, SharedParametrization};

/// A feature maps a state-action pair to a scalar.
pub trait Feature<S, A>: Send + Sync {
    /// Evaluate the feature.
    fn value(&self, state: &S, action: &A) -> f64;
}

impl<S, A, F> Feature<S, A> for F
where
    F: Fn(&S, &A) -> f64 + Send + Sync,
{
    fn value(&self, state: &S, action: &A) -> f64 {
        self(state, action)
    }
}

/// A process whose Q-function is linearly approximated.
///
/// Weights are index-aligned 1:1 with the feature list; the two must
/// have the same length at all times. The feature list is fixed for
/// the life of the process, while the weights are replaced wholesale
/// by training.
pub trait LinearProcess: Process {
    /// Ordered feature list.
    fn features(&self) -> &[Arc<dyn Feature<Self::State, Self::Action>>];

    /// Snapshot of the current weight vector, index-aligned with
    /// [`features`](Self::features).
    fn weights(&self) -> Array1<f64>;
}

/// Evaluate every feature at `(state, action)`, in feature order.
pub fn feature_vector<S, A>(
    features: &[Arc<dyn Feature<S, A>>],
    state: &S,
    action: &A,
) -> Array1<f64> {
    features.iter().map(|f| f.value(state, action)).collect()
}

/// Length-checked dot product.
pub fn dot_checked(a: &Array1<f64>, b: &Array1<f64>) -> Result<f64> {
    if a.len() != b.len() {
        return Err(MdpError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.dot(b))
}

/// Evaluate the approximate Q-function at `(state, action)`.
pub fn q_value<P: LinearProcess>(process: &P, state: &P::State, action: &P::Action) -> Result<f64> {
    let phi = feature_vector(process.features(), state, action);
    dot_checked(&process.weights(), &phi)
}

/// Greatest approximate Q-value over the legal actions in `state`.
///
/// Maximizing over an empty action set yields negative infinity;
/// states with no legal actions are terminal by contract.
pub fn max_q_value<P: LinearProcess>(process: &P, state: &P::State) -> Result<f64> {
    let mut best = f64::NEG_INFINITY;
    for action in process.actions(state) {
        let q = q_value(process, state, &action)?;
        if q > best {
            best = q;
        }
    }
    Ok(best)
}

/// One Q-learning update from a single experience sample.
///
/// Pure: returns a fresh weight vector and mutates neither the process
/// nor the episode.
///
/// `tdError = r + gamma max_{a'} Q(s', a') - Q(s, a)`
/// `w_i' = w_i + alpha tdError f_i(s, a)`
///
/// A next state with no legal actions is terminal and contributes no
/// future value to the temporal-difference error. `epsilon` is never
/// read here.
pub fn update<P: LinearProcess>(
    process: &P,
    episode: &Episode<P::State, P::Action>,
    params: &Parametrization,
) -> Result<Array1<f64>> {
    let weights = process.weights();
    let features = process.features();
    if weights.len() != features.len() {
        return Err(MdpError::DimensionMismatch {
            expected: features.len(),
            actual: weights.len(),
        });
    }

    let next_q = if process.actions(&episode.next_state).is_empty() {
        0.0
    } else {
        max_q_value(process, &episode.next_state)?
    };

    let phi = feature_vector(features, &episode.state, &episode.action);
    let td_error = episode.reward + params.gamma * next_q - weights.dot(&phi);

    Ok(td_step(weights, phi, td_error, params.alpha))
}

fn td_step(weights: Array1<f64>, phi: Array1<f64>, td_error: f64, alpha: f64) -> Array1<f64> {
    weights + phi * (alpha * td_error)
}

/// Linear reward model `r(phi) = theta . phi` over a feature vector.
#[derive(Debug, Clone)]
pub struct LinearReward {
    /// Coefficient vector
    pub theta: Array1<f64>,
}

impl LinearReward {
    /// Create a linear reward model.
    #[must_use]
    pub fn new(theta: Array1<f64>) -> Self {
        Self { theta }
    }

    /// Evaluate against a feature vector of matching length.
    pub fn compute(&self, phi: &Array1<f64>) -> Result<f64> {
        dot_checked(&self.theta, phi)
    }
}

/// Greedy policy over the linear Q approximation.
///
/// Ties keep the first maximum encountered, in action-list order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyQPolicy;

#[async_trait]
impl<P: LinearProcess> Policy<P> for GreedyQPolicy {
    async fn act(&self, process: &P, state: &P::State) -> Result<P::Action> {
        let mut best: Option<(P::Action, f64)> = None;
        for action in process.actions(state) {
            let q = q_value(process, state, &action)?;
            if best.as_ref().map_or(true, |(_, b)| q > *b) {
                best = Some((action, q));
            }
        }
        best.map(|(action, _)| action)
            .ok_or_else(|| MdpError::NoActions(format!("{state:?}")))
    }
}

/// Epsilon-greedy exploration with the rate read from a shared,
/// decaying parametrization.
///
/// The simulation pipeline decays `epsilon` as training progresses, so
/// exploration fades over the course of a run.
pub struct DecayingEpsilonGreedy<B> {
    /// Base policy
    base: B,
    /// Shared parameters supplying the current exploration rate
    parameters: SharedParametrization,
}

impl<B> DecayingEpsilonGreedy<B> {
    /// Create a new decaying epsilon-greedy policy.
    #[must_use]
    pub fn new(base: B, parameters: SharedParametrization) -> Self {
        Self { base, parameters }
    }
}

#[async_trait]
impl<P, B> Policy<P> for DecayingEpsilonGreedy<B>
where
    P: Process,
    B: Policy<P>,
{
    async fn act(&self, process: &P, state: &P::State) -> Result<P::Action> {
        let epsilon = self.parameters.read().await.epsilon;
        let explore = rand::random::<f64>() < epsilon;
        if explore {
            RandomPolicy.act(process, state).await
        } else {
            self.base.act(process, state).await
        }
    }
}
