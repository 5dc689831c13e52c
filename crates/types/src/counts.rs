//! Live per-compartment population counts.

use crate::Compartment;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Number of nodes in each compartment, indexed by [`Compartment`].
///
/// During a run the vector is seeded once by a full scan and afterwards only
/// changed through [`transfer`](Self::transfer), so the total never drifts
/// from the population size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompartmentCounts([u64; Compartment::COUNT]);

impl CompartmentCounts {
    /// All-zero counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every compartment yielded by the iterator.
    pub fn tally<I>(compartments: I) -> Self
    where
        I: IntoIterator<Item = Compartment>,
    {
        let mut counts = Self::new();
        for compartment in compartments {
            counts.0[compartment.index()] += 1;
        }
        counts
    }

    /// Build counts from raw values in compartment order.
    pub fn from_array(values: [u64; Compartment::COUNT]) -> Self {
        Self(values)
    }

    /// Raw values in compartment order.
    pub fn as_array(&self) -> &[u64; Compartment::COUNT] {
        &self.0
    }

    /// Count for a single compartment.
    pub fn get(&self, compartment: Compartment) -> u64 {
        self.0[compartment.index()]
    }

    /// Sum over all compartments.
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Nodes currently exerting infection pressure (Carrier + Infected).
    pub fn infectious(&self) -> u64 {
        self.get(Compartment::Carrier) + self.get(Compartment::Infected)
    }

    /// Nodes that have ever left `Susceptible`.
    pub fn ever_infected(&self) -> u64 {
        self.total() - self.get(Compartment::Susceptible)
    }

    /// True once every transient compartment is empty. No further
    /// transition is possible from such a state.
    pub fn is_quiescent(&self) -> bool {
        Compartment::TRANSIENT.iter().all(|c| self.get(*c) == 0)
    }

    /// Move one node from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if `from` is already empty.
    pub fn transfer(&mut self, from: Compartment, to: Compartment) {
        let source = &mut self.0[from.index()];
        assert!(*source > 0, "transfer out of empty compartment {from}");
        *source -= 1;
        self.0[to.index()] += 1;
    }
}

impl Index<Compartment> for CompartmentCounts {
    type Output = u64;

    fn index(&self, compartment: Compartment) -> &u64 {
        &self.0[compartment.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_and_total() {
        let counts = CompartmentCounts::tally([
            Compartment::Susceptible,
            Compartment::Susceptible,
            Compartment::Carrier,
            Compartment::Dead,
        ]);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts[Compartment::Susceptible], 2);
        assert_eq!(counts.get(Compartment::Carrier), 1);
        assert_eq!(counts.infectious(), 1);
        assert_eq!(counts.ever_infected(), 2);
    }

    #[test]
    fn test_transfer_moves_exactly_one() {
        let mut counts = CompartmentCounts::from_array([3, 0, 1, 0, 0, 0, 0, 0]);
        counts.transfer(Compartment::Carrier, Compartment::Infected);

        assert_eq!(counts.as_array(), &[3, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    #[should_panic(expected = "empty compartment")]
    fn test_transfer_from_empty_panics() {
        let mut counts = CompartmentCounts::new();
        counts.transfer(Compartment::Icu, Compartment::Dead);
    }

    #[test]
    fn test_quiescence() {
        let mut counts = CompartmentCounts::from_array([5, 0, 0, 0, 0, 1, 2, 3]);
        assert!(!counts.is_quiescent());

        counts.transfer(Compartment::Icu, Compartment::Recovered);
        assert!(counts.is_quiescent());
    }
}
