//! Event scheduler for a single replicate.

use crate::error::SimulationError;
use crate::event_queue::{Event, EventQueue};
use crate::population::{Adjacency, Population};
use crate::rates::{self, RateModel};
use crate::sampler::{sample_schedule, TimeSeries};
use episim_types::{
    Compartment, CompartmentCounts, ConfigError, GraphError, ModelParameters, NodeId,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Constructed; infections not yet placed and no events queued.
    Seeding,
    /// Popping and applying events.
    Running,
    /// Finished; the output series is complete.
    Terminated(Termination),
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// Reached the configured horizon.
    Horizon,
    /// Every transient compartment emptied at `time`; nothing further can happen.
    Extinct { time: f64 },
}

/// Counters collected while running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    /// Transition events popped from the queue, stale or not.
    pub events_processed: u64,
    /// Transitions that passed validation and changed a node.
    pub transitions_applied: u64,
    /// Transition events discarded because their epoch was out of date.
    pub stale_events: u64,
    /// Transition events pushed onto the queue.
    pub events_scheduled: u64,
    /// Rows written to the time series.
    pub samples_taken: u64,
}

/// Result of a finished replicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub time_series: TimeSeries,
    pub final_counts: CompartmentCounts,
    pub termination: Termination,
    /// Simulated time at which the run stopped.
    pub terminated_at: f64,
    pub stats: SimulationStats,
}

/// Single-threaded event-driven simulation of one replicate.
///
/// Owns its population, its queue, its aggregate counts, and its random
/// stream. Nothing is shared with other replicates except the read-only
/// contact graph.
///
/// Events are validated against the node's epoch: every time a node's
/// outgoing event is recomputed its epoch is bumped, so at most one queued
/// transition per node is live and anything older is discarded on pop.
pub struct SimulationRunner<R> {
    params: ModelParameters,
    rates: RateModel,
    population: Population,
    counts: CompartmentCounts,
    queue: EventQueue,
    series: TimeSeries,
    rng: R,
    now: f64,
    phase: Phase,
    index_cases: Option<Vec<NodeId>>,
    samples_remaining: usize,
    stats: SimulationStats,
}

impl<R: Rng> SimulationRunner<R> {
    /// Validate the parameters against the graph and build an unseeded runner.
    pub fn new(
        params: ModelParameters,
        adjacency: Arc<Adjacency>,
        rng: R,
    ) -> Result<Self, SimulationError> {
        params.validate()?;
        if adjacency.node_count() != params.population {
            return Err(GraphError::SizeMismatch {
                expected: params.population,
                actual: adjacency.node_count(),
            }
            .into());
        }

        let population = Population::new(adjacency);
        let counts = population.counts();

        Ok(Self {
            rates: RateModel::new(&params),
            series: TimeSeries::with_capacity(params.sample_count()),
            population,
            counts,
            queue: EventQueue::new(),
            rng,
            now: 0.0,
            phase: Phase::Seeding,
            index_cases: None,
            samples_remaining: 0,
            stats: SimulationStats::default(),
            params,
        })
    }

    /// Use these nodes as the initial infections instead of a random draw.
    ///
    /// Their number takes the place of `initial_infected`; duplicates are
    /// seeded once.
    pub fn with_index_cases(mut self, nodes: Vec<NodeId>) -> Result<Self, SimulationError> {
        let population = self.population.len();
        if let Some(&node) = nodes.iter().find(|n| n.index() >= population) {
            return Err(ConfigError::UnknownIndexCase { node, population }.into());
        }
        self.index_cases = Some(nodes);
        Ok(self)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current simulated time.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Live aggregate counts.
    pub fn counts(&self) -> &CompartmentCounts {
        &self.counts
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn time_series(&self) -> &TimeSeries {
        &self.series
    }

    /// Number of queued events, live and stale.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Place initial infections, queue every sample marker, and give every
    /// node its first event. Called by the first [`step`](Self::step) if
    /// not called explicitly.
    pub fn seed(&mut self) -> Result<(), SimulationError> {
        if self.phase != Phase::Seeding {
            return Ok(());
        }

        for time in sample_schedule(&self.params) {
            self.queue.push(time, Event::SampleMarker);
        }
        self.samples_remaining = self.params.sample_count();

        if let Some(intervention) = self.params.intervention {
            self.queue.push(intervention.time, Event::Intervention);
        }

        let compartment = self.params.seed_compartment;
        match self.index_cases.take() {
            Some(nodes) => {
                for node in nodes {
                    if self.population.compartment(node) == Compartment::Susceptible {
                        self.population.set_compartment(node, compartment);
                    }
                }
            }
            None => {
                self.population.seed_infections(
                    self.params.initial_infected,
                    compartment,
                    &mut self.rng,
                );
            }
        }
        // The only full rescan; from here on counts change incrementally.
        self.counts = self.population.counts();

        for index in 0..self.population.len() {
            self.schedule_next(NodeId::from_index(index))?;
        }

        self.phase = Phase::Running;
        debug!(
            population = self.population.len(),
            infectious = self.counts.infectious(),
            queued = self.queue.len(),
            "Seeded replicate"
        );

        if self.counts.is_quiescent() {
            debug!("No transient nodes after seeding");
            self.terminate(Termination::Extinct { time: 0.0 });
        }
        Ok(())
    }

    /// Process the next event. Returns `false` once the run has terminated.
    pub fn step(&mut self) -> Result<bool, SimulationError> {
        match self.phase {
            Phase::Seeding => self.seed()?,
            Phase::Running => {}
            Phase::Terminated(_) => return Ok(false),
        }
        if matches!(self.phase, Phase::Terminated(_)) {
            return Ok(false);
        }

        let Some((time, event)) = self.queue.pop() else {
            return Err(SimulationError::EmptyQueue { time: self.now });
        };
        if time > self.params.horizon {
            self.terminate(Termination::Horizon);
            return Ok(false);
        }
        self.now = time;

        match event {
            Event::SampleMarker => {
                self.record_sample(time);
                if self.samples_remaining == 0 {
                    self.terminate(Termination::Horizon);
                }
            }
            Event::Intervention => self.on_intervention()?,
            Event::Transition {
                node,
                destination,
                epoch,
            } => self.on_transition(node, destination, epoch)?,
        }

        Ok(!matches!(self.phase, Phase::Terminated(_)))
    }

    /// Run to termination and hand back the outcome.
    pub fn run(mut self) -> Result<RunOutcome, SimulationError> {
        while self.step()? {}

        let termination = match self.phase {
            Phase::Terminated(termination) => termination,
            // step() only returns false once terminated
            Phase::Seeding | Phase::Running => Termination::Horizon,
        };
        debug!(
            ?termination,
            transitions = self.stats.transitions_applied,
            stale = self.stats.stale_events,
            rows = self.series.len(),
            "Replicate finished"
        );

        let terminated_at = match termination {
            Termination::Horizon => self.params.horizon,
            Termination::Extinct { time } => time,
        };
        Ok(RunOutcome {
            time_series: self.series,
            final_counts: self.counts,
            termination,
            terminated_at,
            stats: self.stats,
        })
    }

    /// Apply a popped transition. A stale pop changes nothing: the node's
    /// newer event is already queued and stays in place.
    fn on_transition(
        &mut self,
        node: NodeId,
        destination: Compartment,
        epoch: u64,
    ) -> Result<(), SimulationError> {
        self.stats.events_processed += 1;

        let current = *self.population.node(node);
        if current.epoch != epoch || destination <= current.compartment {
            // A newer event for this node is already queued.
            self.stats.stale_events += 1;
            trace!(
                %node,
                %destination,
                epoch,
                current_epoch = current.epoch,
                "Discarding stale event"
            );
            return Ok(());
        }

        let from = self.population.set_compartment(node, destination);
        self.counts.transfer(from, destination);
        self.stats.transitions_applied += 1;
        trace!(time = self.now, %node, %from, to = %destination, "Applied transition");

        if from.is_infectious() || destination.is_infectious() {
            self.regenerate_susceptible_neighbors(node)?;
        }
        self.schedule_next(node)?;

        if self.counts.is_quiescent() {
            debug!(time = self.now, "Epidemic extinct");
            self.terminate(Termination::Extinct { time: self.now });
        }
        Ok(())
    }

    fn on_intervention(&mut self) -> Result<(), SimulationError> {
        let Some(intervention) = self.params.intervention else {
            return Ok(());
        };
        self.rates.apply_intervention(intervention.intensity);
        info!(
            time = self.now,
            intensity = intervention.intensity,
            susceptible = self.counts[Compartment::Susceptible],
            "Intervention in effect"
        );

        // Every susceptible node's infection rate just changed.
        for index in 0..self.population.len() {
            let node = NodeId::from_index(index);
            if self.population.compartment(node) == Compartment::Susceptible {
                self.schedule_next(node)?;
            }
        }
        Ok(())
    }

    /// Infection pressure from `node` changed; redraw the clocks of the
    /// neighbours it acts on.
    fn regenerate_susceptible_neighbors(&mut self, node: NodeId) -> Result<(), SimulationError> {
        let adjacency = Arc::clone(self.population.adjacency());
        for &neighbor in adjacency.neighbors(node) {
            if self.population.compartment(neighbor) == Compartment::Susceptible {
                self.schedule_next(neighbor)?;
            }
        }
        Ok(())
    }

    /// Invalidate every queued event of `node` and queue a fresh one drawn
    /// from its current state.
    fn schedule_next(&mut self, node: NodeId) -> Result<(), SimulationError> {
        let epoch = self.population.bump_epoch(node);
        let compartment = self.population.compartment(node);
        let neighbors = if compartment == Compartment::Susceptible {
            self.population.neighbor_counts(node)
        } else {
            CompartmentCounts::new()
        };

        let hazards = self.rates.hazards(compartment, &neighbors);
        if let Some(bad) = hazards.iter().find(|h| !h.is_valid()) {
            return Err(SimulationError::InvalidRate {
                node,
                rate: bad.rate,
                destination: bad.destination,
            });
        }

        if let Some(firing) = rates::race(&hazards, &mut self.rng) {
            self.queue.push(
                self.now + firing.delay,
                Event::Transition {
                    node,
                    destination: firing.destination,
                    epoch,
                },
            );
            self.stats.events_scheduled += 1;
        }
        Ok(())
    }

    fn record_sample(&mut self, time: f64) {
        self.series.record(time, self.counts);
        self.stats.samples_taken += 1;
        self.samples_remaining = self.samples_remaining.saturating_sub(1);
    }

    /// Stop the run. Sample markers still pending replay the final counts so
    /// the series keeps its fixed length.
    fn terminate(&mut self, termination: Termination) {
        while self.samples_remaining > 0 {
            match self.queue.pop() {
                Some((time, Event::SampleMarker)) => self.record_sample(time),
                Some(_) => {}
                None => break,
            }
        }
        self.phase = Phase::Terminated(termination);
    }
}
