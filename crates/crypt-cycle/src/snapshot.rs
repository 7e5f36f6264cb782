//! Serializable model state.
//!
//! A snapshot holds everything needed to resume a model mid-run: the
//! configuration, birth time, sampled G1, latched readiness and signal
//! history. JSON has no infinity, so the G1 of a non-cycling cell is an
//! explicit variant rather than a float.

use crypt_types::CellCyclePhase;
use serde::{Deserialize, Serialize};

use crate::error::CycleError;
use crate::model::{CycleModel, PolicyState};
use crate::params::CycleParams;

/// A sampled G1 duration in a JSON-safe form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampledG1 {
    /// `sample` has not run yet.
    Unsampled,
    /// A finite G1 duration.
    Cycling(f64),
    /// Terminal fate: the cell never leaves G0.
    NonCycling,
}

impl SampledG1 {
    fn from_duration(g1: Option<f64>) -> Self {
        match g1 {
            None => Self::Unsampled,
            Some(g1) if g1.is_finite() => Self::Cycling(g1),
            Some(_) => Self::NonCycling,
        }
    }

    const fn into_duration(self) -> Option<f64> {
        match self {
            Self::Unsampled => None,
            Self::Cycling(g1) => Some(g1),
            Self::NonCycling => Some(f64::INFINITY),
        }
    }
}

/// Position in the shared random stream: the seed and the number of draws
/// consumed so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomSnapshot {
    /// Seed the stream was created from.
    pub seed: u64,
    /// Draws consumed since seeding.
    pub draws: u64,
}

/// Full serializable state of one [`CycleModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    /// Shared phase lengths.
    pub params: CycleParams,
    /// Policy configuration and signal history.
    pub policy: PolicyState,
    /// Birth time of the cell.
    pub birth_time: f64,
    /// Phase from the last update.
    pub phase: CellCyclePhase,
    /// Sampled G1 duration.
    pub g1_duration: SampledG1,
    /// Latched readiness to divide.
    pub ready_to_divide: bool,
    /// Spatial dimension, for the morphogen policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<u8>,
    /// Random stream position at the time of the snapshot, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random: Option<RandomSnapshot>,
}

impl CycleSnapshot {
    /// Attach the random stream position.
    #[must_use]
    pub const fn with_random(mut self, random: RandomSnapshot) -> Self {
        self.random = Some(random);
        self
    }
}

impl CycleModel {
    /// Capture the model's state.
    pub fn snapshot(&self) -> CycleSnapshot {
        CycleSnapshot {
            params: self.params.clone(),
            policy: self.policy.clone(),
            birth_time: self.birth_time,
            phase: self.phase,
            g1_duration: SampledG1::from_duration(self.g1_duration),
            ready_to_divide: self.ready_to_divide,
            dimension: self.dimension,
            random: None,
        }
    }

    /// Rebuild a model from a snapshot.
    ///
    /// # Errors
    ///
    /// Rejects snapshots with out-of-range parameters, or with a dimension
    /// on a policy that does not read the morphogen field.
    pub fn from_snapshot(snapshot: CycleSnapshot) -> Result<Self, CycleError> {
        snapshot.params.validate()?;
        let mut model = Self {
            params: snapshot.params,
            policy: snapshot.policy,
            birth_time: snapshot.birth_time,
            phase: snapshot.phase,
            g1_duration: snapshot.g1_duration.into_duration(),
            ready_to_divide: snapshot.ready_to_divide,
            dimension: None,
        };
        if let Some(dimension) = snapshot.dimension {
            model.set_dimension(dimension)?;
        }
        Ok(model)
    }
}
