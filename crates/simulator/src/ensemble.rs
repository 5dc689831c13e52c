//! Parallel execution of independent replicates.

use crate::config::EnsembleConfig;
use crate::error::SimulatorError;
use episim_simulation::{Adjacency, RunOutcome, SimulationError, SimulationRunner};
use episim_types::{GraphError, ModelParameters};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A finished replicate, tagged with its index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicateOutcome {
    pub replicate: usize,
    #[serde(flatten)]
    pub outcome: RunOutcome,
}

/// A replicate that aborted with a scheduler error.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateFailure {
    pub replicate: usize,
    pub error: SimulationError,
}

/// Everything an ensemble produced, ordered by replicate index.
#[derive(Debug, Clone, Default)]
pub struct EnsembleResults {
    pub outcomes: Vec<ReplicateOutcome>,
    pub failures: Vec<ReplicateFailure>,
}

impl EnsembleResults {
    /// Split per-replicate results into successes and failures.
    fn from_replicates(results: Vec<(usize, Result<RunOutcome, SimulationError>)>) -> Self {
        let mut collected = Self::default();
        for (replicate, result) in results {
            match result {
                Ok(outcome) => collected
                    .outcomes
                    .push(ReplicateOutcome { replicate, outcome }),
                Err(error) => {
                    warn!(replicate, %error, "Replicate failed");
                    collected.failures.push(ReplicateFailure { replicate, error });
                }
            }
        }
        collected
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs many independent replicates of one configuration.
///
/// The contact graph is shared read-only between replicates; everything
/// else (population state, queue, random stream) is built per replicate.
/// Replicate `i` always draws from ChaCha stream `i` of the configured
/// seed, so results do not depend on which worker ran it or when.
pub struct Ensemble {
    params: ModelParameters,
    adjacency: Arc<Adjacency>,
    config: EnsembleConfig,
}

impl Ensemble {
    /// Validate once up front so configuration faults are reported before
    /// any replicate starts.
    pub fn new(
        params: ModelParameters,
        adjacency: Arc<Adjacency>,
        config: EnsembleConfig,
    ) -> Result<Self, SimulatorError> {
        params.validate().map_err(SimulationError::from)?;
        if adjacency.node_count() != params.population {
            return Err(SimulationError::from(GraphError::SizeMismatch {
                expected: params.population,
                actual: adjacency.node_count(),
            })
            .into());
        }
        Ok(Self {
            params,
            adjacency,
            config,
        })
    }

    pub fn params(&self) -> &ModelParameters {
        &self.params
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    pub fn adjacency(&self) -> &Arc<Adjacency> {
        &self.adjacency
    }

    /// The random stream replicate `replicate` draws from.
    pub fn replicate_rng(&self, replicate: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        rng.set_stream(replicate as u64);
        rng
    }

    /// Run a single replicate on the calling thread.
    pub fn run_replicate(&self, replicate: usize) -> Result<RunOutcome, SimulationError> {
        let runner = SimulationRunner::new(
            self.params.clone(),
            Arc::clone(&self.adjacency),
            self.replicate_rng(replicate),
        )?;
        let outcome = runner.run()?;
        debug!(
            replicate,
            termination = ?outcome.termination,
            transitions = outcome.stats.transitions_applied,
            "Replicate complete"
        );
        Ok(outcome)
    }

    /// Run every replicate in parallel.
    ///
    /// By default failures are collected next to successes. With
    /// `fail_fast` the first failure aborts the ensemble and is returned as
    /// [`SimulatorError::ReplicateFailed`].
    pub fn run(&self) -> Result<EnsembleResults, SimulatorError> {
        info!(
            replicates = self.config.replicates,
            seed = self.config.seed,
            population = self.params.population,
            fail_fast = self.config.fail_fast,
            "Starting ensemble"
        );

        let results = match self.config.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(|| self.run_all()),
            None => self.run_all(),
        }?;

        info!(
            succeeded = results.outcomes.len(),
            failed = results.failures.len(),
            "Ensemble finished"
        );
        Ok(results)
    }

    fn run_all(&self) -> Result<EnsembleResults, SimulatorError> {
        let replicates = (0..self.config.replicates).into_par_iter();

        if self.config.fail_fast {
            let outcomes = replicates
                .map(|replicate| fail_fast_outcome(replicate, self.run_replicate(replicate)))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(EnsembleResults {
                outcomes,
                failures: Vec::new(),
            });
        }

        let results: Vec<_> = replicates
            .map(|replicate| (replicate, self.run_replicate(replicate)))
            .collect();
        Ok(EnsembleResults::from_replicates(results))
    }
}

/// Tag a replicate's result, turning a failure into an ensemble-level error.
fn fail_fast_outcome(
    replicate: usize,
    result: Result<RunOutcome, SimulationError>,
) -> Result<ReplicateOutcome, SimulatorError> {
    result
        .map(|outcome| ReplicateOutcome { replicate, outcome })
        .map_err(|source| SimulatorError::ReplicateFailed { replicate, source })
}
