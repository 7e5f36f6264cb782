//! G1 duration policies.
//!
//! Each policy turns a fate (and, for the morphogen ramp, a captured signal
//! level) into a G1 duration. Terminal fates always receive
//! `f64::INFINITY` and consume no random draw; every other case consumes
//! at most one draw from the shared [`UniformSource`], so the draw sequence
//! depends only on the order in which the engine visits cells.
//!
//! | Policy | Stem | Transit | Floor |
//! |---|---|---|---|
//! | baseline | `stem_g1_mean` | `transit_g1_mean` | none |
//! | uniform width | `transit_g1_mean - 2 + 4u` | same | `minimum_gap_duration` |
//! | morphogen variable | `ramp * transit_g1_mean - 2 + 4u` | same | `minimum_gap_duration` |
//! | stochastic generation, contact inhibition | `stem_g1_mean + 4u` | `transit_g1_mean + 2u` | none |

use crypt_types::ProliferativeFate;

use crate::collab::UniformSource;
use crate::params::CycleParams;

/// Half-width of the uniform window used by the uniform and morphogen
/// policies.
const UNIFORM_HALF_WIDTH: f64 = 2.0;

/// Slope of the morphogen ramp: the mean G1 at the midpoint between the
/// threshold and saturation is this many times longer than at threshold.
const MORPHOGEN_RAMP_SLOPE: f64 = 12.0;

/// Baseline policy: fixed per-fate G1 means, no randomness.
pub fn baseline(params: &CycleParams, fate: ProliferativeFate) -> f64 {
    match fate {
        ProliferativeFate::Stem => params.stem_g1_mean,
        ProliferativeFate::Transit => params.transit_g1_mean,
        ProliferativeFate::Differentiated | ProliferativeFate::Paneth => f64::INFINITY,
    }
}

/// Uniform-width policy: every cycling fate draws from a width-4 window
/// centred on the transit mean, floored at the minimum gap duration.
pub fn uniform_width(
    params: &CycleParams,
    fate: ProliferativeFate,
    rng: &mut impl UniformSource,
) -> f64 {
    if fate.is_terminal() {
        return f64::INFINITY;
    }
    let u = rng.next_uniform01();
    let g1 = params.transit_g1_mean - UNIFORM_HALF_WIDTH + 2.0 * UNIFORM_HALF_WIDTH * u;
    g1.max(params.minimum_gap_duration)
}

/// Morphogen-variable policy: the window's centre ramps linearly with the
/// captured signal level, from the transit mean at threshold upward.
pub fn morphogen_variable(
    params: &CycleParams,
    fate: ProliferativeFate,
    signal_level: f64,
    transit_threshold: f64,
    rng: &mut impl UniformSource,
) -> f64 {
    if fate.is_terminal() {
        return f64::INFINITY;
    }
    let ramp = 1.0
        + MORPHOGEN_RAMP_SLOPE * (signal_level - transit_threshold) / (1.0 - transit_threshold);
    let centre = ramp * params.transit_g1_mean;
    let u = rng.next_uniform01();
    let g1 = centre - UNIFORM_HALF_WIDTH + 2.0 * UNIFORM_HALF_WIDTH * u;
    g1.max(params.minimum_gap_duration)
}

/// Generation-based window shared by the stochastic-generation and
/// contact-inhibition policies: U[mean, mean + 4] for stem cells and
/// U[mean, mean + 2] for transit cells.
pub fn generation_window(
    params: &CycleParams,
    fate: ProliferativeFate,
    rng: &mut impl UniformSource,
) -> f64 {
    match fate {
        ProliferativeFate::Stem => params.stem_g1_mean + 4.0 * rng.next_uniform01(),
        ProliferativeFate::Transit => params.transit_g1_mean + 2.0 * rng.next_uniform01(),
        ProliferativeFate::Differentiated | ProliferativeFate::Paneth => f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedUniform;

    fn exact(actual: f64, expected: f64) {
        assert_eq!(actual.to_bits(), expected.to_bits(), "{actual} != {expected}");
    }

    #[test]
    fn baseline_uses_fixed_means() {
        let params = CycleParams::default();
        exact(baseline(&params, ProliferativeFate::Stem), 14.0);
        exact(baseline(&params, ProliferativeFate::Transit), 2.0);
    }

    #[test]
    fn uniform_width_exact_values() {
        let params = CycleParams::default();
        let mut rng = ScriptedUniform::new(&[0.25, 0.75]);
        // 2 - 2 + 4 * 0.25 = 1
        exact(uniform_width(&params, ProliferativeFate::Transit, &mut rng), 1.0);
        // Stem cells use the transit mean too: 2 - 2 + 4 * 0.75 = 3
        exact(uniform_width(&params, ProliferativeFate::Stem, &mut rng), 3.0);
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn uniform_width_floors_at_minimum_gap() {
        let params = CycleParams::default();
        let mut rng = ScriptedUniform::new(&[0.0]);
        exact(
            uniform_width(&params, ProliferativeFate::Transit, &mut rng),
            params.minimum_gap_duration,
        );
    }

    #[test]
    fn morphogen_variable_exact_values() {
        let params = CycleParams::default();
        let mut rng = ScriptedUniform::new(&[0.5, 0.5]);
        // At threshold the ramp is 1: 2 - 2 + 2 = 2
        exact(
            morphogen_variable(&params, ProliferativeFate::Transit, 0.5, 0.5, &mut rng),
            2.0,
        );
        // Midway to saturation the ramp is 7: 14 - 2 + 2 = 14
        exact(
            morphogen_variable(&params, ProliferativeFate::Stem, 0.75, 0.5, &mut rng),
            14.0,
        );
    }

    #[test]
    fn morphogen_variable_floors_below_threshold() {
        let params = CycleParams::default();
        let mut rng = ScriptedUniform::new(&[0.0]);
        let g1 = morphogen_variable(&params, ProliferativeFate::Transit, 0.0, 0.5, &mut rng);
        exact(g1, params.minimum_gap_duration);
    }

    #[test]
    fn generation_window_exact_values() {
        let params = CycleParams::default();
        let mut rng = ScriptedUniform::new(&[0.5, 0.25]);
        exact(generation_window(&params, ProliferativeFate::Stem, &mut rng), 16.0);
        exact(generation_window(&params, ProliferativeFate::Transit, &mut rng), 2.5);
    }

    #[test]
    fn terminal_fates_are_infinite_without_draws() {
        let params = CycleParams::default();
        let mut rng = ScriptedUniform::new(&[]);
        for fate in [ProliferativeFate::Differentiated, ProliferativeFate::Paneth] {
            assert!(baseline(&params, fate).is_infinite());
            assert!(uniform_width(&params, fate, &mut rng).is_infinite());
            assert!(morphogen_variable(&params, fate, 0.9, 0.5, &mut rng).is_infinite());
            assert!(generation_window(&params, fate, &mut rng).is_infinite());
        }
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn floor_law_holds_across_the_unit_interval() {
        let params = CycleParams {
            transit_g1_mean: 1.0,
            ..CycleParams::default()
        };
        let draws: Vec<f64> = (0..100_i32).map(|i| f64::from(i) / 100.0).collect();
        let mut rng = ScriptedUniform::new(&draws);
        for _ in 0..50 {
            let g1 = uniform_width(&params, ProliferativeFate::Transit, &mut rng);
            assert!(g1 >= params.minimum_gap_duration);
            let g1 = morphogen_variable(&params, ProliferativeFate::Transit, 0.1, 0.5, &mut rng);
            assert!(g1 >= params.minimum_gap_duration);
        }
    }
}
