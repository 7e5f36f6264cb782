//! Morphogen-threshold fate decisions.
//!
//! A cell keeps proliferating (as a transit cell) while its morphogen level
//! is at or above a division threshold, and differentiates below it. The
//! threshold depends on the cell's mutation: partial loss-of-function
//! mutations lower it, full loss of function removes it entirely.
//!
//! Every reclassification is routed through the externally owned
//! [`FateRegistry`] before the cell's own fate changes, so population
//! counters kept by outer observers stay consistent.

use crypt_types::{MutationState, ProliferativeFate};
use tracing::debug;

use crate::collab::{CellContext, FateRegistry};
use crate::error::CycleError;

/// Threshold scale for a single APC hit.
const APC_ONE_HIT_SCALE: f64 = 0.77;

/// Threshold scale for a single beta-catenin hit.
const BETA_CATENIN_ONE_HIT_SCALE: f64 = 0.155;

/// Morphogen level a cell with `mutation` needs in order to keep dividing.
pub fn division_threshold(mutation: MutationState, transit_threshold: f64) -> f64 {
    match mutation {
        MutationState::WildType => transit_threshold,
        MutationState::ApcOneHit => APC_ONE_HIT_SCALE * transit_threshold,
        MutationState::BetaCateninOneHit => BETA_CATENIN_ONE_HIT_SCALE * transit_threshold,
        MutationState::ApcTwoHit => 0.0,
    }
}

/// Fate implied by a signal level against a division threshold.
pub fn decide(signal_level: f64, division_threshold: f64) -> ProliferativeFate {
    if signal_level < division_threshold {
        ProliferativeFate::Differentiated
    } else {
        ProliferativeFate::Transit
    }
}

/// Move the cell behind `ctx` to `to`, going through the fate registry.
///
/// A no-op when the cell already has that fate.
pub fn switch_fate(
    ctx: &mut dyn CellContext,
    registry: &mut dyn FateRegistry,
    to: ProliferativeFate,
) -> Result<(), CycleError> {
    let from = ctx.fate();
    if from == to {
        return Ok(());
    }
    let cell_id = ctx.cell_id();
    registry.reclassify(cell_id, from, to)?;
    ctx.set_fate(to);
    debug!(cell_id = %cell_id, from = from.tag(), to = to.tag(), "Cell fate switched");
    Ok(())
}

/// Reclassify a non-Paneth cell from a morphogen level.
///
/// Paneth cells keep their fate for the lifetime of the model.
pub fn apply_threshold(
    ctx: &mut dyn CellContext,
    registry: &mut dyn FateRegistry,
    signal_level: f64,
    transit_threshold: f64,
) -> Result<(), CycleError> {
    if ctx.fate() == ProliferativeFate::Paneth {
        return Ok(());
    }
    let threshold = division_threshold(ctx.mutation(), transit_threshold);
    switch_fate(ctx, registry, decide(signal_level, threshold))
}

/// Parse a `snake_case` fate tag.
///
/// # Errors
///
/// Returns [`CycleError::UnknownFate`] if the tag names no fate.
pub fn parse_fate(tag: &str) -> Result<ProliferativeFate, CycleError> {
    let normalised = tag.trim().to_lowercase();
    ProliferativeFate::ALL
        .into_iter()
        .find(|fate| fate.tag() == normalised)
        .ok_or_else(|| CycleError::UnknownFate {
            tag: tag.to_owned(),
        })
}

/// Parse a `snake_case` mutation tag.
///
/// # Errors
///
/// Returns [`CycleError::UnknownMutation`] if the tag names no mutation.
pub fn parse_mutation(tag: &str) -> Result<MutationState, CycleError> {
    let normalised = tag.trim().to_lowercase();
    MutationState::ALL
        .into_iter()
        .find(|mutation| mutation.tag() == normalised)
        .ok_or_else(|| CycleError::UnknownMutation {
            tag: tag.to_owned(),
        })
}
