//! Error types for scenarios and ensembles.

use episim_simulation::SimulationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a scenario or running an ensemble.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// A scenario or graph file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Scenario file is not valid TOML or does not match the schema.
    #[error("invalid scenario {path}: {source}")]
    Scenario {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Graph file is not a JSON array of neighbour lists.
    #[error("invalid graph {path}: {source}")]
    Graph {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Parameters or graph rejected before any replicate ran.
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    /// A replicate failed and the ensemble was configured to stop.
    #[error("replicate {replicate} failed: {source}")]
    ReplicateFailed {
        replicate: usize,
        source: SimulationError,
    },

    /// The dedicated worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Summary histogram could not be allocated.
    #[error("failed to create histogram: {0}")]
    Histogram(#[from] hdrhistogram::CreationError),

    /// Writing results failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
