//! Value and Q-value stores

use std::collections::HashMap;

use crate::{Action, State};

/// Mapping from states to value estimates.
///
/// Stores are used single-threaded by the planning engine and the TD
/// learner; no concurrency guarantee is required or provided.
pub trait Values: Send {
    /// State type
    type State: State;

    /// Current estimate for `state`.
    fn value(&self, state: &Self::State) -> f64;

    /// Replace the estimate for `state`.
    fn update(&mut self, state: Self::State, value: f64);
}

/// Mapping from state-action pairs to value estimates.
///
/// Same contract as [`Values`], keyed per pair.
pub trait QValues: Send {
    /// State type
    type State: State;
    /// Action type
    type Action: Action;

    /// Current estimate for `(state, action)`.
    fn value(&self, state: &Self::State, action: &Self::Action) -> f64;

    /// Replace the estimate for `(state, action)`.
    fn update(&mut self, state: Self::State, action: Self::Action, value: f64);
}

/// Hash-map backed value store.
#[derive(Debug, Clone)]
pub struct ValueTable<S> {
    /// Value table
    values: HashMap<S, f64>,
    /// Default value for unseen states
    default_value: f64,
}

impl<S: State> ValueTable<S> {
    /// Create a store returning `default_value` for unseen states.
    #[must_use]
    pub fn new(default_value: f64) -> Self {
        Self {
            values: HashMap::new(),
            default_value,
        }
    }

    /// Number of states with an explicit estimate.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if any state has an explicit estimate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: State> Default for ValueTable<S> {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<S: State> Values for ValueTable<S> {
    type State = S;

    fn value(&self, state: &S) -> f64 {
        self.values.get(state).copied().unwrap_or(self.default_value)
    }

    fn update(&mut self, state: S, value: f64) {
        self.values.insert(state, value);
    }
}

/// Hash-map backed Q-value store.
#[derive(Debug, Clone)]
pub struct QTable<S, A> {
    /// Q-value table keyed per state-action pair
    values: HashMap<(S, A), f64>,
    /// Default value for unseen pairs
    default_value: f64,
}

impl<S: State, A: Action> QTable<S, A> {
    /// Create a store returning `default_value` for unseen pairs.
    #[must_use]
    pub fn new(default_value: f64) -> Self {
        Self {
            values: HashMap::new(),
            default_value,
        }
    }

    /// Number of pairs with an explicit estimate.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if any pair has an explicit estimate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: State, A: Action> Default for QTable<S, A> {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<S: State, A: Action> QValues for QTable<S, A> {
    type State = S;
    type Action = A;

    fn value(&self, state: &S, action: &A) -> f64 {
        self.values
            .get(&(state.clone(), action.clone()))
            .copied()
            .unwrap_or(self.default_value)
    }

    fn update(&mut self, state: S, action: A, value: f64) {
        self.values.insert((state, action), value);
    }
}
