//! Core types shared by the episim simulation crates.
//!
//! Everything here is plain data: the compartment state machine, the
//! per-compartment population counts, and the validated model parameters.
//! Nothing in this crate draws random numbers or owns a clock.

mod compartment;
mod counts;
mod error;
mod identifiers;
mod params;

pub use compartment::Compartment;
pub use counts::CompartmentCounts;
pub use error::{ConfigError, GraphError};
pub use identifiers::NodeId;
pub use params::{Intervention, ModelParameters, TransitionProbabilities, MAX_SAMPLES};
