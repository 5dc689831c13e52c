//! Disease compartments and the ordering of the progression state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The disease state an individual occupies.
///
/// The discriminants are the column order of every output table and the
/// ordering used to break ties between events firing at the same instant.
/// Progression only ever moves to a strictly greater ordinal:
///
/// ```text
/// Susceptible → Exposed → Carrier ─┬→ Infected ─┬→ Hospitalized ─┬→ Icu ─┬→ Dead
///                                  │            │                │       │
///                                  └────────────┴────────────────┴───────┴→ Recovered
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Compartment {
    Susceptible = 0,
    Exposed = 1,
    /// Pre-symptomatic and infectious at the full per-edge rate.
    Carrier = 2,
    /// Symptomatic; infectious at the contact-reduced rate.
    Infected = 3,
    Hospitalized = 4,
    Icu = 5,
    Dead = 6,
    Recovered = 7,
}

impl Compartment {
    /// Number of compartments.
    pub const COUNT: usize = 8;

    /// All compartments in ordinal order.
    pub const ALL: [Compartment; Self::COUNT] = [
        Compartment::Susceptible,
        Compartment::Exposed,
        Compartment::Carrier,
        Compartment::Infected,
        Compartment::Hospitalized,
        Compartment::Icu,
        Compartment::Dead,
        Compartment::Recovered,
    ];

    /// Compartments a node can still leave. The run has reached a fixed
    /// point once all of these are empty.
    pub const TRANSIENT: [Compartment; 5] = [
        Compartment::Exposed,
        Compartment::Carrier,
        Compartment::Infected,
        Compartment::Hospitalized,
        Compartment::Icu,
    ];

    /// Ordinal of this compartment.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Compartment for an ordinal, if it is in range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Lower-case name, used for output column headers.
    pub fn name(self) -> &'static str {
        match self {
            Compartment::Susceptible => "susceptible",
            Compartment::Exposed => "exposed",
            Compartment::Carrier => "carrier",
            Compartment::Infected => "infected",
            Compartment::Hospitalized => "hospitalized",
            Compartment::Icu => "icu",
            Compartment::Dead => "dead",
            Compartment::Recovered => "recovered",
        }
    }

    /// Whether no transition ever leaves this compartment.
    pub fn is_terminal(self) -> bool {
        matches!(self, Compartment::Dead | Compartment::Recovered)
    }

    /// Whether a node in this compartment can still transition somewhere.
    ///
    /// `Susceptible` is neither transient nor terminal: it only moves when a
    /// neighbour applies infection pressure.
    pub fn is_transient(self) -> bool {
        Self::TRANSIENT.contains(&self)
    }

    /// Whether a node in this compartment exerts infection pressure on its
    /// susceptible neighbours.
    pub fn is_infectious(self) -> bool {
        matches!(self, Compartment::Carrier | Compartment::Infected)
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
