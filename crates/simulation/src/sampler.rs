//! Periodic snapshots of the aggregate counts.

use episim_types::{Compartment, CompartmentCounts, ModelParameters};
use serde::{Deserialize, Serialize};

/// Nominal times of every sample marker for `params`.
///
/// Exact multiples `k · sample_interval` for every whole interval strictly
/// before the horizon, followed by the horizon itself. The length always
/// equals [`ModelParameters::sample_count`].
pub fn sample_schedule(params: &ModelParameters) -> Vec<f64> {
    let steps = params.sample_count() - 1;
    (0..steps)
        .map(|k| k as f64 * params.sample_interval)
        .chain(std::iter::once(params.horizon))
        .collect()
}

/// One output row: nominal marker time and a copy of the counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub counts: CompartmentCounts,
}

/// Uniformly spaced output rows of one replicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

impl TimeSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Append a snapshot taken at marker time `time`.
    pub fn record(&mut self, time: f64, counts: CompartmentCounts) {
        self.samples.push(Sample { time, counts });
    }

    pub fn rows(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn final_row(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Largest sampled count of `compartment`, with the earliest time it
    /// was observed.
    pub fn peak(&self, compartment: Compartment) -> Option<(f64, u64)> {
        self.samples.iter().fold(None, |best, sample| {
            let value = sample.counts[compartment];
            match best {
                Some((_, top)) if top >= value => best,
                _ => Some((sample.time, value)),
            }
        })
    }

    /// Largest sampled number of infectious nodes (Carrier + Infected).
    pub fn peak_infectious(&self) -> u64 {
        self.samples
            .iter()
            .map(|s| s.counts.infectious())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_for_exact_multiple() {
        let params = ModelParameters::new(10)
            .with_horizon(100.0)
            .with_sample_interval(10.0);
        let schedule = sample_schedule(&params);

        assert_eq!(schedule.len(), 11);
        assert_eq!(schedule[0], 0.0);
        assert_eq!(schedule[3], 30.0);
        assert_eq!(schedule[10], 100.0);
    }

    #[test]
    fn test_schedule_ends_at_horizon() {
        let params = ModelParameters::new(10)
            .with_horizon(25.0)
            .with_sample_interval(10.0);
        assert_eq!(sample_schedule(&params), vec![0.0, 10.0, 25.0]);

        let params = ModelParameters::new(10)
            .with_horizon(5.0)
            .with_sample_interval(5.0);
        assert_eq!(sample_schedule(&params), vec![0.0, 5.0]);
    }

    #[test]
    fn test_schedule_uses_exact_multiples() {
        let params = ModelParameters::new(10)
            .with_horizon(1.0)
            .with_sample_interval(0.1);
        let schedule = sample_schedule(&params);

        assert_eq!(schedule.len(), 11);
        assert_eq!(schedule[7], 7.0 * 0.1);
        assert_eq!(schedule[10], 1.0);
    }

    #[test]
    fn test_peak_prefers_earliest_maximum() {
        let mut series = TimeSeries::default();
        series.record(0.0, CompartmentCounts::from_array([9, 0, 1, 0, 0, 0, 0, 0]));
        series.record(1.0, CompartmentCounts::from_array([6, 0, 2, 2, 0, 0, 0, 0]));
        series.record(2.0, CompartmentCounts::from_array([5, 0, 1, 2, 0, 0, 0, 2]));
        series.record(3.0, CompartmentCounts::from_array([5, 0, 0, 0, 0, 0, 0, 5]));

        assert_eq!(series.peak(Compartment::Infected), Some((1.0, 2)));
        assert_eq!(series.peak_infectious(), 4);
        assert_eq!(series.final_row().map(|s| s.time), Some(3.0));
        assert_eq!(TimeSeries::default().peak(Compartment::Infected), None);
    }
}
