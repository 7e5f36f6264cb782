//! Phase clock: maps a cell's age onto a discrete cell-cycle phase.
//!
//! The cycle is laid out as consecutive half-open intervals in the fixed
//! order M, G1, S, G2 starting at the cell's birth, so a freshly divided
//! cell begins in mitosis. Classification is a pure query: it never
//! mutates state and may be called any number of times.

use crypt_types::{CellCyclePhase, ProliferativeFate};

use crate::error::CycleError;
use crate::params::CycleParams;

/// Classify `elapsed` hours since birth into a phase.
///
/// Terminal fates are always [`CellCyclePhase::G0`]. For cycling fates the
/// result is `None` when no interval covers `elapsed`: the cell is past the
/// end of G2, or G1 has not been sampled and the cell has left M. Callers
/// keep the previously computed phase in that case.
///
/// # Errors
///
/// Returns [`CycleError::NegativeAge`] if `elapsed` is negative or NaN.
pub fn classify(
    elapsed: f64,
    g1_duration: Option<f64>,
    params: &CycleParams,
    fate: ProliferativeFate,
) -> Result<Option<CellCyclePhase>, CycleError> {
    if !(elapsed >= 0.0) {
        return Err(CycleError::NegativeAge { age: elapsed });
    }

    if fate.is_terminal() {
        return Ok(Some(CellCyclePhase::G0));
    }

    let end_of_m = params.m_duration;
    if elapsed < end_of_m {
        return Ok(Some(CellCyclePhase::M));
    }

    let Some(g1) = g1_duration else {
        return Ok(None);
    };

    let end_of_g1 = end_of_m + g1;
    if elapsed < end_of_g1 {
        return Ok(Some(CellCyclePhase::G1));
    }
    let end_of_s = end_of_g1 + params.s_duration;
    if elapsed < end_of_s {
        return Ok(Some(CellCyclePhase::S));
    }
    let end_of_g2 = end_of_s + params.g2_duration;
    if elapsed < end_of_g2 {
        return Ok(Some(CellCyclePhase::G2));
    }

    Ok(None)
}

/// Total length of one cycle for the given G1 duration.
pub fn cycle_duration(g1_duration: f64, params: &CycleParams) -> f64 {
    params.m_duration + g1_duration + params.s_duration + params.g2_duration
}
