//! Cell-cycle phase state machine and G1 duration policies for crypt
//! proliferation.
//!
//! A [`CycleModel`] tracks one cell's progression through M, G1, S and G2,
//! decides when the cell is ready to divide, and resets itself (and a
//! cloned daughter) at division. Five policies choose how long G1 lasts:
//! fixed per-fate means, a uniform window, a morphogen-ramped window, and
//! a generation-based window with or without stalling under crowding.
//!
//! # Modules
//!
//! - [`collab`] -- Traits for the clock, random stream, owning cell and
//!   fate registry the model is driven with.
//! - [`error`] -- [`CycleError`], the single failure type of the core.
//! - [`fate_switch`] -- Morphogen thresholds, mutation scaling and fate
//!   reclassification through the registry.
//! - [`model`] -- [`CycleModel`] and the per-policy state it carries.
//! - [`output`] -- Ordered parameter output for run logs.
//! - [`params`] -- Shared phase lengths and per-policy configuration.
//! - [`phase`] -- The pure age-to-phase classifier.
//! - [`quiescence`] -- Contact-inhibition volume tracking.
//! - [`sampler`] -- The G1 duration laws.
//! - [`snapshot`] -- JSON-safe model state for checkpointing.

pub mod collab;
pub mod error;
pub mod fate_switch;
pub mod model;
pub mod output;
pub mod params;
pub mod phase;
pub mod quiescence;
pub mod sampler;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

pub use collab::{CellContext, Clock, FateRegistry, UniformSource};
pub use error::CycleError;
pub use fate_switch::{parse_fate, parse_mutation};
pub use model::{CycleModel, DEFAULT_INITIAL_SIGNAL_LEVEL, Lineage, PolicyState};
pub use params::{CycleParams, PolicyConfig};
pub use quiescence::{QuiescenceState, QuiescenceTracker};
pub use snapshot::{CycleSnapshot, RandomSnapshot, SampledG1};
