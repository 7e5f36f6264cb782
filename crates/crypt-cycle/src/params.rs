//! Configuration shared by every cell-cycle policy, plus the per-policy
//! extensions selected at construction.
//!
//! All durations are in hours. The defaults follow the standard
//! Meineke-style crypt parameterisation; crypt runs usually override the
//! phase lengths through the presets in `crypt-core`.

use serde::{Deserialize, Serialize};

use crate::error::CycleError;

/// Phase lengths and baseline G1 means common to all policies.
///
/// These are configuration: they are copied verbatim to every daughter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleParams {
    /// Mean G1 duration for stem cells (default: 14).
    pub stem_g1_mean: f64,

    /// Mean G1 duration for transit cells (default: 2).
    pub transit_g1_mean: f64,

    /// S phase duration (default: 5).
    pub s_duration: f64,

    /// G2 phase duration (default: 4).
    pub g2_duration: f64,

    /// M phase duration (default: 1).
    pub m_duration: f64,

    /// Floor applied to sampled G1 durations by the uniform policies
    /// (default: 0.01).
    pub minimum_gap_duration: f64,
}

impl Default for CycleParams {
    fn default() -> Self {
        Self {
            stem_g1_mean: 14.0,
            transit_g1_mean: 2.0,
            s_duration: 5.0,
            g2_duration: 4.0,
            m_duration: 1.0,
            minimum_gap_duration: 0.01,
        }
    }
}

impl CycleParams {
    /// Check that every duration is finite and non-negative.
    pub fn validate(&self) -> Result<(), CycleError> {
        let fields = [
            ("stem_g1_mean", self.stem_g1_mean),
            ("transit_g1_mean", self.transit_g1_mean),
            ("s_duration", self.s_duration),
            ("g2_duration", self.g2_duration),
            ("m_duration", self.m_duration),
            ("minimum_gap_duration", self.minimum_gap_duration),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(CycleError::InvalidParameter {
                    name,
                    value,
                    reason: "durations must be finite and non-negative",
                });
            }
        }
        Ok(())
    }

    /// Sum of the fixed (non-G1) phase lengths.
    pub fn fixed_phase_total(&self) -> f64 {
        self.m_duration + self.s_duration + self.g2_duration
    }
}

/// Policy selection with its configuration-only parameters.
///
/// A [`CycleModel`](crate::CycleModel) is built from one of these; the
/// mutable signal-history state each policy needs is initialised by the
/// model constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PolicyConfig {
    /// Fixed per-fate G1 durations with a transit generation limit.
    Baseline {
        /// Divisions a transit lineage may undergo before differentiating.
        max_transit_generations: u32,
    },

    /// Generation-based cycling with G1 drawn uniformly above the per-fate
    /// mean.
    StochasticGeneration {
        /// Divisions a transit lineage may undergo before differentiating.
        max_transit_generations: u32,
    },

    /// Width-4 uniform G1 around the transit mean; fate gated every update
    /// by the live morphogen level.
    UniformWidth {
        /// Morphogen level a wild-type cell needs to keep proliferating.
        transit_threshold: f64,
    },

    /// G1 mean ramps linearly with the morphogen level captured at
    /// division; fate decided once per cycle from that captured level.
    MorphogenVariable {
        /// Morphogen level a wild-type cell needs to keep proliferating.
        transit_threshold: f64,
    },

    /// Generation-based cycling whose G1 stalls while the cell is crowded.
    ContactInhibition {
        /// Divisions a transit lineage may undergo before differentiating.
        max_transit_generations: u32,
        /// Fraction of the equilibrium volume below which a G1 cell is
        /// quiescent.
        quiescent_volume_fraction: f64,
        /// Equilibrium volume of a cell in G1.
        equilibrium_volume: f64,
    },
}

impl PolicyConfig {
    /// Short policy name used in log fields and error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Baseline { .. } => "baseline",
            Self::StochasticGeneration { .. } => "stochastic_generation",
            Self::UniformWidth { .. } => "uniform_width",
            Self::MorphogenVariable { .. } => "morphogen_variable",
            Self::ContactInhibition { .. } => "contact_inhibition",
        }
    }

    /// Check policy-specific parameter ranges.
    pub fn validate(&self) -> Result<(), CycleError> {
        match *self {
            Self::Baseline { .. } | Self::StochasticGeneration { .. } => Ok(()),
            Self::UniformWidth { transit_threshold } => {
                if transit_threshold.is_finite() {
                    Ok(())
                } else {
                    Err(CycleError::InvalidParameter {
                        name: "transit_threshold",
                        value: transit_threshold,
                        reason: "threshold must be finite",
                    })
                }
            }
            Self::MorphogenVariable { transit_threshold } => {
                // The duration ramp divides by (1 - threshold).
                if transit_threshold.is_finite() && transit_threshold < 1.0 {
                    Ok(())
                } else {
                    Err(CycleError::InvalidParameter {
                        name: "transit_threshold",
                        value: transit_threshold,
                        reason: "threshold must be finite and below 1",
                    })
                }
            }
            Self::ContactInhibition {
                quiescent_volume_fraction,
                equilibrium_volume,
                ..
            } => {
                if !(quiescent_volume_fraction > 0.0 && quiescent_volume_fraction <= 1.0) {
                    return Err(CycleError::InvalidParameter {
                        name: "quiescent_volume_fraction",
                        value: quiescent_volume_fraction,
                        reason: "fraction must lie in (0, 1]",
                    });
                }
                if !(equilibrium_volume.is_finite() && equilibrium_volume > 0.0) {
                    return Err(CycleError::InvalidParameter {
                        name: "equilibrium_volume",
                        value: equilibrium_volume,
                        reason: "volume must be finite and positive",
                    });
                }
                Ok(())
            }
        }
    }
}
