//! Error types for parameter and graph validation.

use crate::{Compartment, NodeId};
use thiserror::Error;

/// Out-of-range or inconsistent [`ModelParameters`](crate::ModelParameters).
///
/// Raised by validation before any replicate starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Population must contain at least one node.
    #[error("population must be positive")]
    EmptyPopulation,

    /// Population does not fit the node index type.
    #[error("population {0} exceeds the supported maximum of {max}", max = u32::MAX)]
    PopulationTooLarge(usize),

    /// More initial infections requested than there are nodes.
    #[error("initial_infected ({initial_infected}) exceeds population ({population})")]
    TooManyInitialInfected {
        initial_infected: usize,
        population: usize,
    },

    /// A scalar parameter is outside its permitted range.
    #[error("{name} = {value} is outside {range}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        range: &'static str,
    },

    /// Probabilities leaving one compartment add up to more than one.
    #[error("transition probabilities leaving {from} sum to {sum}, which exceeds 1")]
    BranchSumExceedsOne { from: Compartment, sum: f64 },

    /// The sample interval yields more output rows than supported.
    #[error("horizon {horizon} with sample_interval {sample_interval} yields more than {max} samples")]
    TooManySamples {
        horizon: f64,
        sample_interval: f64,
        max: usize,
    },

    /// An explicitly chosen index case is not a node of the population.
    #[error("index case {node} is outside a population of {population}")]
    UnknownIndexCase { node: NodeId, population: usize },

    /// Initial infections must enter the exposed or an infectious compartment.
    #[error("{0} cannot be used as the seed compartment")]
    InvalidSeedCompartment(Compartment),
}

/// Malformed adjacency structure.
///
/// Raised when a population model is built from a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Graph size disagrees with the configured population.
    #[error("graph has {actual} nodes but population is {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Neighbour id does not name a node in the graph.
    #[error("{node} lists neighbour {neighbor}, but the graph has only {node_count} nodes")]
    DanglingNeighbor {
        node: NodeId,
        neighbor: usize,
        node_count: usize,
    },

    /// Node lists itself as a neighbour.
    #[error("{0} has an edge to itself")]
    SelfLoop(NodeId),

    /// The same edge appears twice.
    #[error("edge {node} - {neighbor} appears more than once")]
    DuplicateEdge { node: NodeId, neighbor: NodeId },

    /// Edge present in one direction only.
    #[error("{node} lists {neighbor}, but {neighbor} does not list {node}")]
    AsymmetricEdge { node: NodeId, neighbor: NodeId },
}
