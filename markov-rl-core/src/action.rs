//! Action identities

use std::fmt::Debug;
use std::hash::Hash;

/// Marker trait for action identities.
///
/// An action is a choice that can be taken in a state. Like states,
/// actions are opaque to the core: equality and hashability are the
/// only requirements.
pub trait Action: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Action for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}
