//! Ensemble-level summary statistics.

use crate::ensemble::EnsembleResults;
use crate::error::SimulatorError;
use episim_simulation::Termination;
use episim_types::Compartment;
use hdrhistogram::Histogram;
use serde::Serialize;
use std::fmt;

/// Summary of an ensemble's successful replicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleReport {
    pub succeeded: usize,
    pub failed: usize,

    /// Mean final count per compartment, in compartment order.
    pub mean_final_counts: [f64; Compartment::COUNT],

    /// Final epidemic size (nodes that ever left Susceptible).
    pub final_size_p50: u64,
    pub final_size_p90: u64,
    pub final_size_p99: u64,

    /// Mean over replicates of the largest sampled Carrier + Infected count.
    pub mean_peak_infectious: f64,

    /// Share of replicates that died out before the horizon.
    pub extinction_fraction: f64,
}

impl EnsembleReport {
    pub fn from_results(results: &EnsembleResults) -> Result<Self, SimulatorError> {
        let succeeded = results.outcomes.len();
        let mut final_sizes = Histogram::<u64>::new(3)?;
        let mut totals = [0.0; Compartment::COUNT];
        let mut peak_sum = 0.0;
        let mut extinct = 0usize;

        for replicate in &results.outcomes {
            let outcome = &replicate.outcome;
            for (total, count) in totals.iter_mut().zip(outcome.final_counts.as_array()) {
                *total += *count as f64;
            }
            final_sizes.saturating_record(outcome.final_counts.ever_infected());
            peak_sum += outcome.time_series.peak_infectious() as f64;
            if matches!(outcome.termination, Termination::Extinct { .. }) {
                extinct += 1;
            }
        }

        let mean = |sum: f64| {
            if succeeded == 0 {
                0.0
            } else {
                sum / succeeded as f64
            }
        };

        Ok(Self {
            succeeded,
            failed: results.failures.len(),
            mean_final_counts: totals.map(mean),
            final_size_p50: final_sizes.value_at_quantile(0.50),
            final_size_p90: final_sizes.value_at_quantile(0.90),
            final_size_p99: final_sizes.value_at_quantile(0.99),
            mean_peak_infectious: mean(peak_sum),
            extinction_fraction: mean(extinct as f64),
        })
    }
}

impl fmt::Display for EnsembleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "replicates: {} succeeded, {} failed",
            self.succeeded, self.failed
        )?;
        writeln!(
            f,
            "final size: p50 {}  p90 {}  p99 {}",
            self.final_size_p50, self.final_size_p90, self.final_size_p99
        )?;
        writeln!(f, "mean peak infectious: {:.2}", self.mean_peak_infectious)?;
        writeln!(f, "extinct before horizon: {:.1}%", self.extinction_fraction * 100.0)?;
        write!(f, "mean final counts:")?;
        for (compartment, mean) in Compartment::ALL.iter().zip(self.mean_final_counts) {
            write!(f, " {compartment}={mean:.2}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::{ReplicateFailure, ReplicateOutcome};
    use episim_simulation::{RunOutcome, SimulationError, SimulationStats, TimeSeries};
    use episim_types::CompartmentCounts;

    fn outcome(replicate: usize, finals: [u64; 8], peak: u64, extinct: bool) -> ReplicateOutcome {
        let mut time_series = TimeSeries::default();
        time_series.record(0.0, CompartmentCounts::from_array([10 - peak, 0, peak, 0, 0, 0, 0, 0]));
        time_series.record(10.0, CompartmentCounts::from_array(finals));
        let termination = if extinct {
            Termination::Extinct { time: 7.0 }
        } else {
            Termination::Horizon
        };
        ReplicateOutcome {
            replicate,
            outcome: RunOutcome {
                time_series,
                final_counts: CompartmentCounts::from_array(finals),
                termination,
                terminated_at: 10.0,
                stats: SimulationStats::default(),
            },
        }
    }

    #[test]
    fn test_report_aggregates_outcomes() {
        let results = EnsembleResults {
            outcomes: vec![
                outcome(0, [8, 0, 0, 0, 0, 0, 0, 2], 2, true),
                outcome(1, [4, 0, 0, 0, 0, 0, 2, 4], 4, true),
                outcome(2, [2, 0, 0, 2, 0, 0, 0, 6], 6, false),
                outcome(3, [2, 0, 0, 2, 0, 0, 0, 6], 6, false),
            ],
            failures: vec![ReplicateFailure {
                replicate: 4,
                error: SimulationError::EmptyQueue { time: 1.0 },
            }],
        };
        let report = EnsembleReport::from_results(&results).unwrap();

        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failed, 1);
        assert_eq!(report.mean_final_counts[Compartment::Susceptible.index()], 4.0);
        assert_eq!(report.mean_final_counts[Compartment::Dead.index()], 0.5);
        assert_eq!(report.final_size_p50, 6);
        assert_eq!(report.final_size_p99, 8);
        assert_eq!(report.mean_peak_infectious, 4.5);
        assert_eq!(report.extinction_fraction, 0.5);

        let text = report.to_string();
        assert!(text.contains("4 succeeded, 1 failed"));
        assert!(text.contains("susceptible=4.00"));
    }

    #[test]
    fn test_empty_results_report_zeros() {
        let report = EnsembleReport::from_results(&EnsembleResults::default()).unwrap();
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.mean_peak_infectious, 0.0);
        assert_eq!(report.final_size_p90, 0);
    }
}
