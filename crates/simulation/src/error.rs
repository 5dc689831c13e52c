//! Error types for a single replicate.

use episim_types::{Compartment, ConfigError, GraphError, NodeId};
use thiserror::Error;

/// Errors raised while setting up or running one replicate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Model parameters failed validation.
    #[error("invalid model parameters: {0}")]
    Config(#[from] ConfigError),

    /// Contact graph is malformed or does not match the population.
    #[error("invalid contact graph: {0}")]
    Graph(#[from] GraphError),

    /// The queue ran dry before the horizon. Every pending sample marker up
    /// to the horizon lives in the queue, so this means the scheduler lost
    /// track of events.
    #[error("event queue empty at t={time} before reaching the horizon")]
    EmptyQueue { time: f64 },

    /// The rate model produced a negative or NaN rate.
    #[error("invalid rate {rate} for {node} towards {destination}")]
    InvalidRate {
        node: NodeId,
        rate: f64,
        destination: Compartment,
    },
}

impl SimulationError {
    /// Whether this is a scheduler invariant violation rather than a
    /// configuration or graph problem.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            SimulationError::EmptyQueue { .. } | SimulationError::InvalidRate { .. }
        )
    }
}
