//! Rate model: per-node competing exponential clocks.
//!
//! Each compartment maps to the set of compartments reachable in one hop,
//! with one exponential rate per destination. The configured per-step
//! probabilities are used directly as rates.
//!
//! # Race form
//!
//! [`race`] draws one waiting time `-ln(U) / r` per candidate with a
//! positive rate, in the order returned by [`RateModel::hazards`], and the
//! minimum wins. Zero-rate candidates consume no random numbers. This is
//! statistically equivalent to drawing `Exp(Σr)` and then picking a branch
//! with probability `r / Σr`, but consumes the stream differently; runs are
//! only reproducible against this form.

use episim_types::{Compartment, CompartmentCounts, ModelParameters, TransitionProbabilities};
use rand::distributions::Open01;
use rand::Rng;

/// One competing clock: a rate towards a destination compartment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hazard {
    pub rate: f64,
    pub destination: Compartment,
}

impl Hazard {
    pub fn new(rate: f64, destination: Compartment) -> Self {
        Self { rate, destination }
    }

    /// Non-negative and not NaN. Infinite rates are allowed and fire
    /// immediately.
    pub fn is_valid(&self) -> bool {
        self.rate >= 0.0
    }
}

/// Outcome of a race: who won and how long it took.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Firing {
    pub delay: f64,
    pub destination: Compartment,
}

/// Maps a node's compartment and neighbourhood to its competing clocks.
#[derive(Debug, Clone)]
pub struct RateModel {
    infectiousness: f64,
    contact_reduction: f64,
    transitions: TransitionProbabilities,
    /// Multiplier on infectiousness; drops below one once an intervention fires.
    intervention_factor: f64,
}

impl RateModel {
    pub fn new(params: &ModelParameters) -> Self {
        Self {
            infectiousness: params.infectiousness,
            contact_reduction: params.contact_reduction,
            transitions: params.transitions,
            intervention_factor: 1.0,
        }
    }

    /// Scale per-edge infectiousness by `intensity` from now on.
    pub fn apply_intervention(&mut self, intensity: f64) {
        self.intervention_factor = intensity;
    }

    /// Per-edge infection rate currently in force.
    pub fn effective_infectiousness(&self) -> f64 {
        self.infectiousness * self.intervention_factor
    }

    /// Competing clocks for a node in `current` whose neighbours are
    /// distributed as `neighbors`.
    ///
    /// Never empty. Terminal compartments return a single zero-rate
    /// self-loop, which [`race`] turns into "no further event".
    pub fn hazards(&self, current: Compartment, neighbors: &CompartmentCounts) -> Vec<Hazard> {
        let p = &self.transitions;
        match current {
            Compartment::Susceptible => {
                let lambda = self.effective_infectiousness();
                let pressure = lambda * neighbors[Compartment::Carrier] as f64
                    + lambda * self.contact_reduction * neighbors[Compartment::Infected] as f64;
                vec![Hazard::new(pressure, Compartment::Exposed)]
            }
            Compartment::Exposed => vec![Hazard::new(p.exposed_to_carrier, Compartment::Carrier)],
            Compartment::Carrier => vec![
                Hazard::new(p.carrier_to_infected, Compartment::Infected),
                Hazard::new(p.carrier_to_recovered, Compartment::Recovered),
            ],
            Compartment::Infected => vec![
                Hazard::new(p.infected_to_hospitalized, Compartment::Hospitalized),
                Hazard::new(p.infected_to_recovered, Compartment::Recovered),
            ],
            Compartment::Hospitalized => vec![
                Hazard::new(p.hospitalized_to_icu, Compartment::Icu),
                Hazard::new(p.hospitalized_to_recovered, Compartment::Recovered),
            ],
            Compartment::Icu => vec![
                Hazard::new(p.icu_to_dead, Compartment::Dead),
                Hazard::new(p.icu_to_recovered, Compartment::Recovered),
            ],
            Compartment::Dead | Compartment::Recovered => vec![Hazard::new(0.0, current)],
        }
    }
}

/// Run the competing exponential race.
///
/// Returns `None` when every rate is zero: the node has no pending event
/// until something regenerates it. Callers must reject invalid hazards
/// first; see [`Hazard::is_valid`].
pub fn race<R: Rng + ?Sized>(hazards: &[Hazard], rng: &mut R) -> Option<Firing> {
    let mut winner: Option<Firing> = None;
    for hazard in hazards {
        if hazard.rate <= 0.0 {
            continue;
        }
        let u: f64 = rng.sample(Open01);
        let delay = -u.ln() / hazard.rate;
        if winner.map_or(true, |w| delay < w.delay) {
            winner = Some(Firing {
                delay,
                destination: hazard.destination,
            });
        }
    }
    winner
}
