//! Error types for the MDP core library

use thiserror::Error;

/// Core error type for MDP operations
#[derive(Error, Debug)]
pub enum MdpError {
    /// Policy-related errors
    #[error("Policy error: {0}")]
    Policy(String),

    /// Simulation-related errors
    #[error("Simulation error: {0}")]
    Simulation(String),

    /// No legal actions available in a state
    #[error("No legal actions in state: {0}")]
    NoActions(String),

    /// Dimension mismatch in vector arithmetic
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for MDP operations
pub type Result<T> = std::result::Result<T, MdpError>;
