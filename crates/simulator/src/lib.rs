//! Episim Simulator
//!
//! Runs ensembles of independent epidemic replicates in parallel on top of
//! `episim-simulation`.
//!
//! # Architecture
//!
//! - **Scenario**: a TOML file naming model parameters, ensemble settings
//!   and a JSON contact graph
//! - **Ensemble**: fans replicates out over a rayon pool, one ChaCha stream
//!   per replicate, and collects outcomes and failures
//! - **Metrics**: final-size percentiles, peak prevalence and extinction
//!   share across replicates
//! - **Output**: long-format CSV or JSON
//!
//! # Example
//!
//! ```ignore
//! use episim_simulator::{Ensemble, EnsembleConfig, EnsembleReport};
//! use episim_simulation::Adjacency;
//! use episim_types::ModelParameters;
//! use std::sync::Arc;
//!
//! let graph = Arc::new(Adjacency::from_edges(100, (0..100).map(|i| (i, (i + 1) % 100)))?);
//! let params = ModelParameters::new(100).with_infectiousness(0.3);
//!
//! let ensemble = Ensemble::new(params, graph, EnsembleConfig::new(50).with_seed(7))?;
//! let results = ensemble.run()?;
//!
//! println!("{}", EnsembleReport::from_results(&results)?);
//! ```

pub mod config;
pub mod ensemble;
pub mod error;
pub mod metrics;
pub mod output;
pub mod scenario;

pub use config::EnsembleConfig;
pub use ensemble::{Ensemble, EnsembleResults, ReplicateFailure, ReplicateOutcome};
pub use error::SimulatorError;
pub use metrics::EnsembleReport;
pub use scenario::{load_adjacency, Scenario};
