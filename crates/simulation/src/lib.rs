//! Event-driven epidemic simulation runner.
//!
//! This crate runs one replicate of a continuous-time stochastic epidemic
//! on a fixed contact graph. Every node races a set of exponential clocks,
//! one per compartment it can move to next, and the runner advances time to
//! the earliest firing clock. Given the same seed it produces identical
//! results every run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SimulationRunner                       │
//! │                                                         │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Event Queue (BTreeMap<EventKey, Event>)        │ │
//! │  │     Ordered by: time, priority, node, sequence     │ │
//! │  │     Transitions + sample markers + intervention    │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │ pop                         │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Population: Vec<Node> (compartment, epoch)     │ │
//! │  │     epoch mismatch → stale event, discarded        │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │ accepted transition         │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     CompartmentCounts (-1 source, +1 destination)  │ │
//! │  │     RateModel → race → schedule new events         │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod error;
mod event_queue;
mod population;
pub mod rates;
mod runner;
mod sampler;

pub use error::SimulationError;
pub use event_queue::{Event, EventKey, EventQueue};
pub use population::{Adjacency, Node, Population};
pub use rates::{Firing, Hazard, RateModel};
pub use runner::{Phase, RunOutcome, SimulationRunner, SimulationStats, Termination};
pub use sampler::{sample_schedule, Sample, TimeSeries};
