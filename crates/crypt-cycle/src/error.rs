//! Error types for the crypt-cycle crate.
//!
//! Every failure in the cell-cycle core is a caller contract violation:
//! there is no transient error class and nothing here is worth retrying.
//! Callers are expected to propagate these errors and halt the run rather
//! than substitute a guessed value, since a substituted duration or fate
//! would silently break reproducibility.

use crypt_types::{CellId, ProliferativeFate};

/// Errors raised by cell-cycle model operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CycleError {
    /// A textual fate tag did not name a known proliferative fate.
    #[error("unknown proliferative fate: {tag}")]
    UnknownFate {
        /// The unrecognised tag.
        tag: String,
    },

    /// A textual mutation tag did not name a known mutation state.
    #[error("unknown mutation state: {tag}")]
    UnknownMutation {
        /// The unrecognised tag.
        tag: String,
    },

    /// The spatial dimension was queried before it was set.
    #[error("spatial dimension has not been set on this cell-cycle model")]
    DimensionUnset,

    /// A spatial dimension was supplied to a policy that does not use one.
    #[error("the {policy} policy does not accept a spatial dimension")]
    DimensionForbidden {
        /// Name of the policy that rejected the dimension.
        policy: &'static str,
    },

    /// A spatial dimension outside 1..=3 was supplied.
    #[error("invalid spatial dimension {dimension}: must be 1, 2 or 3")]
    InvalidDimension {
        /// The rejected dimension.
        dimension: u8,
    },

    /// A configuration parameter is outside its valid range.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// The fate registry has no entry for the requested fate.
    #[error("fate {fate:?} is not registered with the fate registry")]
    FateNotRegistered {
        /// The fate that could not be resolved.
        fate: ProliferativeFate,
    },

    /// The fate registry's population count for a fate would go negative.
    #[error("fate registry holds no {fate:?} cells to reclassify (cell {cell_id})")]
    FateCountUnderflow {
        /// The cell being reclassified.
        cell_id: CellId,
        /// The fate whose count is already zero.
        fate: ProliferativeFate,
    },

    /// An operation was requested that the model's policy does not support.
    #[error("{operation} is not supported by the {policy} policy")]
    NotApplicable {
        /// The rejected operation.
        operation: &'static str,
        /// Name of the model's policy.
        policy: &'static str,
    },

    /// The simulation clock is behind the model's birth time.
    #[error("negative cell age {age}: clock is behind the model's birth time")]
    NegativeAge {
        /// The computed (negative or NaN) age.
        age: f64,
    },

    /// A G1 duration was required before `sample` had ever run.
    #[error("G1 duration queried before it was sampled")]
    G1Unsampled,

    /// The generation counter would overflow.
    #[error("generation counter overflow")]
    GenerationOverflow,
}
