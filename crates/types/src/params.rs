//! Model parameters for a single simulation run.

use crate::{Compartment, ConfigError};
use serde::{Deserialize, Serialize};

/// Tolerance when checking that branch probabilities sum to at most one.
const BRANCH_SUM_TOLERANCE: f64 = 1e-9;

/// Upper bound on output rows per replicate.
pub const MAX_SAMPLES: usize = 1_000_000;

/// Per-unit-time probabilities of each edge of the progression state machine.
///
/// The engine reinterprets every value as the rate of an independent
/// exponential clock. Pairs that share a source compartment compete.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionProbabilities {
    pub exposed_to_carrier: f64,
    pub carrier_to_infected: f64,
    pub carrier_to_recovered: f64,
    pub infected_to_hospitalized: f64,
    pub infected_to_recovered: f64,
    pub hospitalized_to_icu: f64,
    pub hospitalized_to_recovered: f64,
    pub icu_to_dead: f64,
    pub icu_to_recovered: f64,
}

impl TransitionProbabilities {
    /// Every probability zero: nobody progresses once exposed.
    pub fn zero() -> Self {
        Self {
            exposed_to_carrier: 0.0,
            carrier_to_infected: 0.0,
            carrier_to_recovered: 0.0,
            infected_to_hospitalized: 0.0,
            infected_to_recovered: 0.0,
            hospitalized_to_icu: 0.0,
            hospitalized_to_recovered: 0.0,
            icu_to_dead: 0.0,
            icu_to_recovered: 0.0,
        }
    }

    /// Named values paired with the field name, for validation messages.
    fn named(&self) -> [(&'static str, f64); 9] {
        [
            ("exposed_to_carrier", self.exposed_to_carrier),
            ("carrier_to_infected", self.carrier_to_infected),
            ("carrier_to_recovered", self.carrier_to_recovered),
            ("infected_to_hospitalized", self.infected_to_hospitalized),
            ("infected_to_recovered", self.infected_to_recovered),
            ("hospitalized_to_icu", self.hospitalized_to_icu),
            ("hospitalized_to_recovered", self.hospitalized_to_recovered),
            ("icu_to_dead", self.icu_to_dead),
            ("icu_to_recovered", self.icu_to_recovered),
        ]
    }

    /// Competing pairs grouped by source compartment.
    fn branches(&self) -> [(Compartment, f64, f64); 4] {
        [
            (
                Compartment::Carrier,
                self.carrier_to_infected,
                self.carrier_to_recovered,
            ),
            (
                Compartment::Infected,
                self.infected_to_hospitalized,
                self.infected_to_recovered,
            ),
            (
                Compartment::Hospitalized,
                self.hospitalized_to_icu,
                self.hospitalized_to_recovered,
            ),
            (Compartment::Icu, self.icu_to_dead, self.icu_to_recovered),
        ]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.named() {
            check_range(name, value, "[0, 1]", |v| (0.0..=1.0).contains(&v))?;
        }
        for (from, a, b) in self.branches() {
            let sum = a + b;
            if sum > 1.0 + BRANCH_SUM_TOLERANCE {
                return Err(ConfigError::BranchSumExceedsOne { from, sum });
            }
        }
        Ok(())
    }
}

impl Default for TransitionProbabilities {
    fn default() -> Self {
        Self {
            exposed_to_carrier: 0.45,
            carrier_to_infected: 0.17,
            carrier_to_recovered: 0.06,
            infected_to_hospitalized: 0.1,
            infected_to_recovered: 0.15,
            hospitalized_to_icu: 0.12,
            hospitalized_to_recovered: 0.2,
            icu_to_dead: 0.12,
            icu_to_recovered: 0.2,
        }
    }
}

/// A one-off reduction of per-edge infectiousness from `time` onward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Intervention {
    /// Simulated time at which the reduction takes effect.
    pub time: f64,

    /// Fraction of infectiousness that remains (0 = full lockdown, 1 = no effect).
    pub intensity: f64,
}

/// Immutable configuration for one run.
///
/// Build with [`ModelParameters::new`] and the `with_*` setters, or
/// deserialize from TOML. Always call [`validate`](Self::validate) before
/// handing the parameters to a runner; the runner does so itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelParameters {
    /// Number of nodes in the contact graph.
    pub population: usize,

    /// Number of nodes seeded into `seed_compartment` at time zero.
    pub initial_infected: usize,

    /// Per-edge infection rate λ exerted by a Carrier neighbour.
    pub infectiousness: f64,

    /// Factor γ applied to λ for Infected (symptomatic) neighbours.
    pub contact_reduction: f64,

    /// Progression probabilities, reinterpreted as exponential rates.
    pub transitions: TransitionProbabilities,

    /// Simulated time at which the run stops.
    pub horizon: f64,

    /// Spacing of output rows.
    pub sample_interval: f64,

    /// Compartment initial infections are placed in.
    #[serde(default = "default_seed_compartment")]
    pub seed_compartment: Compartment,

    /// Optional scheduled reduction of infectiousness.
    #[serde(default)]
    pub intervention: Option<Intervention>,
}

fn default_seed_compartment() -> Compartment {
    Compartment::Carrier
}

impl ModelParameters {
    /// Parameters for a population of the given size with the reference
    /// disease profile.
    pub fn new(population: usize) -> Self {
        Self {
            population,
            initial_infected: 3.min(population),
            infectiousness: 0.05,
            contact_reduction: 0.2,
            transitions: TransitionProbabilities::default(),
            horizon: 100.0,
            sample_interval: 10.0,
            seed_compartment: default_seed_compartment(),
            intervention: None,
        }
    }

    /// Set the number of initial infections.
    pub fn with_initial_infected(mut self, initial_infected: usize) -> Self {
        self.initial_infected = initial_infected;
        self
    }

    /// Set the per-edge infectiousness λ.
    pub fn with_infectiousness(mut self, infectiousness: f64) -> Self {
        self.infectiousness = infectiousness;
        self
    }

    /// Set the contact-reduction factor γ.
    pub fn with_contact_reduction(mut self, contact_reduction: f64) -> Self {
        self.contact_reduction = contact_reduction;
        self
    }

    /// Set the progression probabilities.
    pub fn with_transitions(mut self, transitions: TransitionProbabilities) -> Self {
        self.transitions = transitions;
        self
    }

    /// Set the run horizon.
    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    /// Set the output sampling interval.
    pub fn with_sample_interval(mut self, sample_interval: f64) -> Self {
        self.sample_interval = sample_interval;
        self
    }

    /// Set the compartment initial infections are placed in.
    pub fn with_seed_compartment(mut self, compartment: Compartment) -> Self {
        self.seed_compartment = compartment;
        self
    }

    /// Schedule an intervention.
    pub fn with_intervention(mut self, time: f64, intensity: f64) -> Self {
        self.intervention = Some(Intervention { time, intensity });
        self
    }

    /// Number of rows every output table of this configuration has.
    pub fn sample_count(&self) -> usize {
        sample_steps(self.horizon, self.sample_interval).saturating_add(1)
    }

    /// Check every range and consistency constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if u32::try_from(self.population).is_err() {
            return Err(ConfigError::PopulationTooLarge(self.population));
        }
        if self.initial_infected > self.population {
            return Err(ConfigError::TooManyInitialInfected {
                initial_infected: self.initial_infected,
                population: self.population,
            });
        }

        check_range("infectiousness", self.infectiousness, "(0, 1)", |v| {
            v > 0.0 && v < 1.0
        })?;
        check_range("contact_reduction", self.contact_reduction, "[0, 1]", |v| {
            (0.0..=1.0).contains(&v)
        })?;
        self.transitions.validate()?;

        check_range("horizon", self.horizon, "(0, inf)", |v| {
            v > 0.0 && v.is_finite()
        })?;
        let horizon = self.horizon;
        check_range("sample_interval", self.sample_interval, "(0, horizon]", |v| {
            v > 0.0 && v <= horizon
        })?;
        if sample_steps(self.horizon, self.sample_interval) >= MAX_SAMPLES {
            return Err(ConfigError::TooManySamples {
                horizon: self.horizon,
                sample_interval: self.sample_interval,
                max: MAX_SAMPLES,
            });
        }

        if !matches!(
            self.seed_compartment,
            Compartment::Exposed | Compartment::Carrier | Compartment::Infected
        ) {
            return Err(ConfigError::InvalidSeedCompartment(self.seed_compartment));
        }

        if let Some(intervention) = &self.intervention {
            check_range("intervention.time", intervention.time, "(0, horizon)", |v| {
                v > 0.0 && v < horizon
            })?;
            check_range(
                "intervention.intensity",
                intervention.intensity,
                "[0, 1]",
                |v| (0.0..=1.0).contains(&v),
            )?;
        }

        Ok(())
    }
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Number of whole sample intervals before the horizon.
///
/// A small tolerance absorbs representation error, so that e.g. a horizon
/// of 0.3 with interval 0.1 yields 3 steps rather than 2.
pub(crate) fn sample_steps(horizon: f64, sample_interval: f64) -> usize {
    ((horizon / sample_interval) + 1e-9).floor() as usize
}

fn check_range(
    name: &'static str,
    value: f64,
    range: &'static str,
    accept: impl Fn(f64) -> bool,
) -> Result<(), ConfigError> {
    // NaN fails every comparison, so it is rejected here as well.
    if accept(value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value, range })
    }
}
