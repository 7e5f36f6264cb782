//! Enumeration types shared across the crypt proliferation workspace.
//!
//! All textual tags use `snake_case` so that the YAML configuration and the
//! JSON snapshots agree on spelling.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cell-cycle phases
// ---------------------------------------------------------------------------

/// A discrete phase of the cell division cycle.
///
/// A freshly divided cell starts in [`CellCyclePhase::M`] and proceeds
/// through G1, S and G2 before it becomes ready to divide again. Cells with
/// a non-cycling fate sit in [`CellCyclePhase::G0`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellCyclePhase {
    /// Non-cycling by fate (differentiated or Paneth cells).
    G0,
    /// Growth phase 1, the only phase with a stochastic length.
    G1,
    /// DNA synthesis.
    S,
    /// Growth phase 2.
    G2,
    /// Mitosis, the first phase after a division.
    M,
}

// ---------------------------------------------------------------------------
// Proliferative fates
// ---------------------------------------------------------------------------

/// The proliferative classification of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProliferativeFate {
    /// Self-renewing stem cell at the crypt base.
    Stem,
    /// Transit-amplifying cell with a limited number of divisions.
    Transit,
    /// Terminally differentiated cell; never cycles.
    Differentiated,
    /// Paneth cell; never cycles and never changes fate.
    Paneth,
}

impl ProliferativeFate {
    /// Every fate, in declaration order.
    pub const ALL: [Self; 4] = [Self::Stem, Self::Transit, Self::Differentiated, Self::Paneth];

    /// Whether cells of this fate are permanently out of the cycle.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Differentiated | Self::Paneth)
    }

    /// The `snake_case` tag for this fate.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Stem => "stem",
            Self::Transit => "transit",
            Self::Differentiated => "differentiated",
            Self::Paneth => "paneth",
        }
    }
}

// ---------------------------------------------------------------------------
// Mutation states
// ---------------------------------------------------------------------------

/// The mutation carried by a cell, which shifts its morphogen sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationState {
    /// Healthy cell.
    WildType,
    /// One copy of APC lost (partial loss of function).
    ApcOneHit,
    /// One activating beta-catenin hit (stronger partial loss of function).
    BetaCateninOneHit,
    /// Both copies of APC lost (full loss of function).
    ApcTwoHit,
}

impl MutationState {
    /// Every mutation state, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::WildType,
        Self::ApcOneHit,
        Self::BetaCateninOneHit,
        Self::ApcTwoHit,
    ];

    /// The `snake_case` tag for this mutation state.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::WildType => "wild_type",
            Self::ApcOneHit => "apc_one_hit",
            Self::BetaCateninOneHit => "beta_catenin_one_hit",
            Self::ApcTwoHit => "apc_two_hit",
        }
    }
}

// ---------------------------------------------------------------------------
// Model kinds
// ---------------------------------------------------------------------------

/// The proliferation models available to a crypt run.
///
/// Each kind selects one G1 duration policy in the cell-cycle core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Width-4 uniform G1 durations, fate gated by the live morphogen level.
    UniformWnt,
    /// G1 duration ramps with the morphogen level captured at division.
    VariableWnt,
    /// Uniform G1 above the per-fate mean with a transit generation limit.
    StochasticGenerationBased,
    /// Generation-based cycling that stalls in G1 while crowded.
    ContactInhibition,
}

impl ModelKind {
    /// Every model kind, in the order a parameter sweep runs them.
    pub const ALL: [Self; 4] = [
        Self::UniformWnt,
        Self::VariableWnt,
        Self::StochasticGenerationBased,
        Self::ContactInhibition,
    ];

    /// Human-readable model name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::UniformWnt => "Uniform Wnt",
            Self::VariableWnt => "Variable Wnt",
            Self::StochasticGenerationBased => "Stochastic Generation-based",
            Self::ContactInhibition => "Contact Inhibition",
        }
    }
}

impl core::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.display_name())
    }
}
