//! State identities

use std::fmt::Debug;
use std::hash::Hash;

/// Marker trait for state identities.
///
/// A state is an opaque model of the world supplied by the domain. The
/// core assumes no structure beyond equality comparison and usability
/// as a map key; any type meeting those bounds is a state.
pub trait State: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> State for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}
