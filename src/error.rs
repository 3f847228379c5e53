//! Cyclesim error types.
//!
//! # Error Classification
//!
//! The protocol core has no recoverable-error taxonomy: a message that does not
//! match any pending state at its target is simply dropped. Errors therefore only
//! come from the edges of the system:
//!
//! - **Contract violations** by collaborators (non-prime modulus, degenerate
//!   generator, out-of-range neighbour ids) are rejected at construction time as
//!   [`SimError::Config`], never discovered mid-simulation.
//! - **Resource exhaustion** of the message cascade surfaces as
//!   [`SimError::Capacity`] instead of running unbounded.
//! - **I/O** while reading edge lists or writing reports.

use thiserror::Error;

use crate::graph::NodeId;

/// Cyclesim errors.
#[derive(Error, Debug)]
pub enum SimError {
    /// Invalid configuration or collaborator contract violation.
    #[error("Config error: {0}")]
    Config(String),

    /// The live message queue of a root run grew past its limit.
    #[error("Capacity exceeded: message queue for root {root} grew past {limit} messages")]
    Capacity {
        /// Root whose cascade overflowed.
        root: NodeId,
        /// Configured queue limit.
        limit: usize,
    },

    /// Malformed graph input.
    #[error("Graph error: {0}")]
    Graph(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for cyclesim operations
pub type Result<T> = std::result::Result<T, SimError>;

impl From<toml::de::Error> for SimError {
    fn from(err: toml::de::Error) -> Self {
        SimError::Config(err.to_string())
    }
}
