//! Crypt presets for each proliferation model.
//!
//! Every model shares the same M, S and G2 lengths (10 hours in total).
//! With the 2 hour transit G1 mean, a transit cell's whole cycle lies in
//! [10, 14] hours under the uniform-width policy and under the morphogen
//! ramp at threshold, and in [12, 14] hours under the generation-based
//! windows. The models differ in how G1 is chosen and how fate is decided.

use crypt_cycle::{CycleParams, PolicyConfig};
use crypt_types::ModelKind;

use crate::config::CycleSection;

/// Cell-cycle configuration for one model kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CryptPreset {
    /// Which model this preset configures.
    pub kind: ModelKind,
    /// Shared phase lengths.
    pub params: CycleParams,
    /// Policy selection and policy parameters.
    pub policy: PolicyConfig,
}

impl CryptPreset {
    /// Build the preset for `kind` from the configured cycle section.
    pub fn for_kind(kind: ModelKind, cycle: &CycleSection) -> Self {
        let params = CycleParams {
            stem_g1_mean: cycle.stem_g1_mean,
            transit_g1_mean: cycle.transit_g1_mean,
            s_duration: cycle.s_duration,
            g2_duration: cycle.g2_duration,
            m_duration: cycle.m_duration,
            minimum_gap_duration: cycle.minimum_gap_duration,
        };
        let policy = match kind {
            ModelKind::UniformWnt => PolicyConfig::UniformWidth {
                transit_threshold: cycle.transit_threshold,
            },
            ModelKind::VariableWnt => PolicyConfig::MorphogenVariable {
                transit_threshold: cycle.transit_threshold,
            },
            ModelKind::StochasticGenerationBased => PolicyConfig::StochasticGeneration {
                max_transit_generations: cycle.max_transit_generations,
            },
            ModelKind::ContactInhibition => PolicyConfig::ContactInhibition {
                max_transit_generations: cycle.max_transit_generations,
                quiescent_volume_fraction: cycle.quiescent_volume_fraction,
                equilibrium_volume: cycle.equilibrium_volume,
            },
        };
        Self {
            kind,
            params,
            policy,
        }
    }

    /// Whether cells of this model track lineage depth. The others take
    /// their fate from the morphogen field instead.
    pub const fn uses_generations(&self) -> bool {
        matches!(
            self.policy,
            PolicyConfig::Baseline { .. }
                | PolicyConfig::StochasticGeneration { .. }
                | PolicyConfig::ContactInhibition { .. }
        )
    }
}
