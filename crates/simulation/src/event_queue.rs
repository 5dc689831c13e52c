//! Time-ordered event queue shared by transitions and sample markers.

use episim_types::{Compartment, NodeId};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Something scheduled to happen at a point in simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A node moves to `destination`, provided its epoch still equals the
    /// one captured when the event was generated.
    Transition {
        node: NodeId,
        destination: Compartment,
        epoch: u64,
    },

    /// Snapshot the aggregate counts into the output series.
    SampleMarker,

    /// Activate the scheduled infectiousness reduction.
    Intervention,
}

impl Event {
    /// Tie-break rank among events firing at the same instant.
    ///
    /// Markers come first so a snapshot at time `t` never sees a transition
    /// that fires at exactly `t`. Transitions are ranked by destination
    /// ordinal.
    fn priority(&self) -> u8 {
        match self {
            Event::SampleMarker => 0,
            Event::Intervention => 1,
            Event::Transition { destination, .. } => 2 + destination.index() as u8,
        }
    }

    fn node(&self) -> u32 {
        match self {
            Event::Transition { node, .. } => node.0,
            Event::SampleMarker | Event::Intervention => 0,
        }
    }
}

/// Total order over queued events: time, priority, node, insertion sequence.
///
/// The sequence number makes every key unique and keeps the pop order
/// fully deterministic, even for identical times.
#[derive(Debug, Clone, Copy)]
pub struct EventKey {
    pub time: f64,
    pub priority: u8,
    pub node: u32,
    pub sequence: u64,
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EventKey {}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.priority.cmp(&other.priority))
            .then(self.node.cmp(&other.node))
            .then(self.sequence.cmp(&other.sequence))
    }
}

/// Min-queue of events keyed by [`EventKey`].
#[derive(Debug, Default)]
pub struct EventQueue {
    events: BTreeMap<EventKey, Event>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event at `time`.
    pub fn push(&mut self, time: f64, event: Event) {
        let key = EventKey {
            time,
            priority: event.priority(),
            node: event.node(),
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.events.insert(key, event);
    }

    /// Remove and return the earliest event.
    pub fn pop(&mut self) -> Option<(f64, Event)> {
        self.events
            .pop_first()
            .map(|(key, event)| (key.time, event))
    }

    /// Time of the earliest event without removing it.
    pub fn peek_time(&self) -> Option<f64> {
        self.events.keys().next().map(|key| key.time)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
