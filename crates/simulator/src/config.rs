//! Configuration types for the ensemble runner.

use serde::{Deserialize, Serialize};

/// How many replicates to run, and how.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnsembleConfig {
    /// Number of independent replicates.
    pub replicates: usize,

    /// Base random seed. Replicate `i` draws from ChaCha stream `i` of
    /// this seed.
    pub seed: u64,

    /// Abort the ensemble on the first failed replicate instead of
    /// collecting failures alongside successes.
    pub fail_fast: bool,

    /// Worker threads. `None` uses rayon's global pool.
    pub threads: Option<usize>,
}

impl EnsembleConfig {
    /// Create a new ensemble configuration.
    pub fn new(replicates: usize) -> Self {
        Self {
            replicates,
            seed: 12345,
            fail_fast: false,
            threads: None,
        }
    }

    /// Set the base random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Stop at the first failure.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Run on a dedicated pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: EnsembleConfig = toml::from_str("replicates = 4").unwrap();
        assert_eq!(config, EnsembleConfig::new(4));

        let config: EnsembleConfig =
            toml::from_str("seed = 7\nfail_fast = true\nthreads = 2").unwrap();
        assert_eq!(
            config,
            EnsembleConfig::default()
                .with_seed(7)
                .with_fail_fast(true)
                .with_threads(2)
        );
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(toml::from_str::<EnsembleConfig>("replicas = 4").is_err());
    }
}
