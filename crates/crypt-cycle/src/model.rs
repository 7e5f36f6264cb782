//! The per-cell cell-cycle model.
//!
//! A [`CycleModel`] is owned by exactly one cell. It stores the cell's
//! birth time, its sampled G1 duration and the configuration of one of five
//! policies, and exposes the operations the outer engine drives:
//!
//! - [`CycleModel::update_phase`] once per timestep
//! - [`CycleModel::ready_to_divide`] to decide whether the cell divides
//! - [`CycleModel::reset_for_division`] on the parent when it divides
//! - [`CycleModel::clone_model`] followed by
//!   [`CycleModel::initialise_daughter`] for the new cell
//! - [`CycleModel::sample`] whenever a fresh G1 duration is needed
//!
//! The model never holds a reference to its cell. Signals are read through
//! the [`CellContext`] handle passed into each call.

use crypt_types::{CellCyclePhase, ProliferativeFate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collab::{CellContext, Clock, FateRegistry, UniformSource};
use crate::error::CycleError;
use crate::fate_switch;
use crate::params::{CycleParams, PolicyConfig};
use crate::phase;
use crate::quiescence::{QuiescenceState, QuiescenceTracker};
use crate::sampler;

/// Morphogen level assumed before a morphogen-variable model has captured
/// one: every cell starts out stem-like.
pub const DEFAULT_INITIAL_SIGNAL_LEVEL: f64 = 1.0;

/// Lineage depth for the generation-based policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    /// Divisions since the lineage left the stem compartment.
    pub generation: u32,

    /// Divisions a transit lineage may undergo before differentiating.
    pub max_transit_generations: u32,
}

/// Policy-specific configuration and signal history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PolicyState {
    /// Fixed per-fate G1 durations.
    Baseline {
        /// Generation counter.
        lineage: Lineage,
    },

    /// Uniform G1 above the per-fate mean.
    StochasticGeneration {
        /// Generation counter.
        lineage: Lineage,
    },

    /// Width-4 uniform G1 with live morphogen gating.
    UniformWidth {
        /// Wild-type division threshold.
        transit_threshold: f64,
    },

    /// Morphogen-ramped G1 with fate decided from a captured level.
    MorphogenVariable {
        /// Wild-type division threshold.
        transit_threshold: f64,
        /// Morphogen level captured at the last division.
        initial_signal_level: f64,
    },

    /// Generation-based cycling stalled by crowding.
    ContactInhibition {
        /// Generation counter.
        lineage: Lineage,
        /// Quiescence configuration and history.
        quiescence: QuiescenceTracker,
    },
}

impl PolicyState {
    fn from_config(config: &PolicyConfig, now: f64) -> Self {
        match *config {
            PolicyConfig::Baseline {
                max_transit_generations,
            } => Self::Baseline {
                lineage: Lineage {
                    generation: 0,
                    max_transit_generations,
                },
            },
            PolicyConfig::StochasticGeneration {
                max_transit_generations,
            } => Self::StochasticGeneration {
                lineage: Lineage {
                    generation: 0,
                    max_transit_generations,
                },
            },
            PolicyConfig::UniformWidth { transit_threshold } => {
                Self::UniformWidth { transit_threshold }
            }
            PolicyConfig::MorphogenVariable { transit_threshold } => Self::MorphogenVariable {
                transit_threshold,
                initial_signal_level: DEFAULT_INITIAL_SIGNAL_LEVEL,
            },
            PolicyConfig::ContactInhibition {
                max_transit_generations,
                quiescent_volume_fraction,
                equilibrium_volume,
            } => Self::ContactInhibition {
                lineage: Lineage {
                    generation: 0,
                    max_transit_generations,
                },
                quiescence: QuiescenceTracker::new(
                    quiescent_volume_fraction,
                    equilibrium_volume,
                    now,
                ),
            },
        }
    }

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

    /// The generation counter, for the generation-based policies.
    pub const fn lineage(&self) -> Option<&Lineage> {
        match self {
            Self::Baseline { lineage }
            | Self::StochasticGeneration { lineage }
            | Self::ContactInhibition { lineage, .. } => Some(lineage),
            Self::UniformWidth { .. } | Self::MorphogenVariable { .. } => None,
        }
    }

    const fn lineage_mut(&mut self) -> Option<&mut Lineage> {
        match self {
            Self::Baseline { lineage }
            | Self::StochasticGeneration { lineage }
            | Self::ContactInhibition { lineage, .. } => Some(lineage),
            Self::UniformWidth { .. } | Self::MorphogenVariable { .. } => None,
        }
    }

    /// Whether the policy reads the morphogen field (and so needs a
    /// spatial dimension).
    pub const fn uses_morphogen(&self) -> bool {
        matches!(self, Self::UniformWidth { .. } | Self::MorphogenVariable { .. })
    }

    /// Copy the configuration into fresh state anchored at `now`.
    fn fresh(&self, now: f64) -> Self {
        match self {
            Self::Baseline { lineage } => Self::Baseline {
                lineage: lineage.clone(),
            },
            Self::StochasticGeneration { lineage } => Self::StochasticGeneration {
                lineage: lineage.clone(),
            },
            Self::UniformWidth { transit_threshold } => Self::UniformWidth {
                transit_threshold: *transit_threshold,
            },
            Self::MorphogenVariable {
                transit_threshold, ..
            } => Self::MorphogenVariable {
                transit_threshold: *transit_threshold,
                initial_signal_level: DEFAULT_INITIAL_SIGNAL_LEVEL,
            },
            Self::ContactInhibition {
                lineage,
                quiescence,
            } => Self::ContactInhibition {
                lineage: lineage.clone(),
                quiescence: quiescence.fresh(now),
            },
        }
    }
}

/// Cell-cycle state for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleModel {
    pub(crate) params: CycleParams,
    pub(crate) policy: PolicyState,
    pub(crate) birth_time: f64,
    pub(crate) phase: CellCyclePhase,
    pub(crate) g1_duration: Option<f64>,
    pub(crate) ready_to_divide: bool,
    pub(crate) dimension: Option<u8>,
}

impl CycleModel {
    /// Build a model for a cell born at `birth_time`.
    ///
    /// The model starts in M phase with no G1 duration; call
    /// [`sample`](Self::sample) before the first phase update that leaves M.
    pub fn new(
        params: CycleParams,
        policy: &PolicyConfig,
        birth_time: f64,
    ) -> Result<Self, CycleError> {
        params.validate()?;
        policy.validate()?;
        if !birth_time.is_finite() {
            return Err(CycleError::InvalidParameter {
                name: "birth_time",
                value: birth_time,
                reason: "birth time must be finite",
            });
        }
        Ok(Self {
            params,
            policy: PolicyState::from_config(policy, birth_time),
            birth_time,
            phase: CellCyclePhase::M,
            g1_duration: None,
            ready_to_divide: false,
            dimension: None,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Shared phase-length configuration.
    pub const fn params(&self) -> &CycleParams {
        &self.params
    }

    /// Policy configuration and signal history.
    pub const fn policy(&self) -> &PolicyState {
        &self.policy
    }

    /// Short policy name.
    pub const fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Simulation time at which the cell was born (or last divided).
    pub const fn birth_time(&self) -> f64 {
        self.birth_time
    }

    /// Override the birth time, e.g. to stagger the initial population.
    pub const fn set_birth_time(&mut self, birth_time: f64) {
        self.birth_time = birth_time;
    }

    /// Age of the cell at time `now`.
    pub fn age(&self, now: f64) -> f64 {
        now - self.birth_time
    }

    /// Phase computed by the most recent update.
    pub const fn current_phase(&self) -> CellCyclePhase {
        self.phase
    }

    /// Sampled G1 duration, or `None` before the first sample.
    pub const fn g1_duration(&self) -> Option<f64> {
        self.g1_duration
    }

    /// Whether the model has latched readiness to divide.
    pub const fn is_ready_to_divide(&self) -> bool {
        self.ready_to_divide
    }

    /// Generation counter, for the generation-based policies.
    pub fn generation(&self) -> Option<u32> {
        self.policy.lineage().map(|lineage| lineage.generation)
    }

    /// Set the generation counter, e.g. when seeding a crypt by height.
    pub fn set_generation(&mut self, generation: u32) -> Result<(), CycleError> {
        let policy = self.policy.name();
        let lineage = self.policy.lineage_mut().ok_or(CycleError::NotApplicable {
            operation: "set_generation",
            policy,
        })?;
        lineage.generation = generation;
        Ok(())
    }

    /// Quiescence history, for the contact-inhibition policy.
    pub const fn quiescence(&self) -> Option<&QuiescenceTracker> {
        match &self.policy {
            PolicyState::ContactInhibition { quiescence, .. } => Some(quiescence),
            _ => None,
        }
    }

    /// Wild-type division threshold, for the morphogen policies.
    pub const fn transit_threshold(&self) -> Option<f64> {
        match self.policy {
            PolicyState::UniformWidth { transit_threshold }
            | PolicyState::MorphogenVariable {
                transit_threshold, ..
            } => Some(transit_threshold),
            PolicyState::Baseline { .. }
            | PolicyState::StochasticGeneration { .. }
            | PolicyState::ContactInhibition { .. } => None,
        }
    }

    /// Captured morphogen level, for the morphogen-variable policy.
    pub const fn initial_signal_level(&self) -> Option<f64> {
        match self.policy {
            PolicyState::MorphogenVariable {
                initial_signal_level,
                ..
            } => Some(initial_signal_level),
            _ => None,
        }
    }

    /// Override the captured morphogen level.
    pub fn set_initial_signal_level(&mut self, level: f64) -> Result<(), CycleError> {
        match &mut self.policy {
            PolicyState::MorphogenVariable {
                initial_signal_level,
                ..
            } => {
                *initial_signal_level = level;
                Ok(())
            }
            other => Err(CycleError::NotApplicable {
                operation: "set_initial_signal_level",
                policy: other.name(),
            }),
        }
    }

    /// Spatial dimension of the tissue.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::DimensionUnset`] until
    /// [`set_dimension`](Self::set_dimension) has been called.
    pub fn dimension(&self) -> Result<u8, CycleError> {
        self.dimension.ok_or(CycleError::DimensionUnset)
    }

    /// Set the spatial dimension. Only the morphogen policies read the
    /// morphogen field and accept one.
    pub fn set_dimension(&mut self, dimension: u8) -> Result<(), CycleError> {
        if !self.policy.uses_morphogen() {
            return Err(CycleError::DimensionForbidden {
                policy: self.policy.name(),
            });
        }
        if !(1..=3).contains(&dimension) {
            return Err(CycleError::InvalidDimension { dimension });
        }
        self.dimension = Some(dimension);
        Ok(())
    }

    /// Total length of the current cycle.
    pub fn cycle_duration(&self) -> Result<f64, CycleError> {
        let g1 = self.g1_duration.ok_or(CycleError::G1Unsampled)?;
        Ok(phase::cycle_duration(g1, &self.params))
    }

    // -----------------------------------------------------------------------
    // Per-timestep operations
    // -----------------------------------------------------------------------

    /// Recompute and store the current phase.
    ///
    /// Runs the policy's per-step work first: quiescence tracking for
    /// contact inhibition, live morphogen gating for the uniform-width
    /// policy. When no phase interval covers the cell's age the previous
    /// phase is kept.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::NegativeAge`] if the clock is behind the birth
    /// time, [`CycleError::G1Unsampled`] if a cycling cell has left M
    /// without a sampled G1, or a registry/dimension error from gating.
    pub fn update_phase(
        &mut self,
        ctx: &mut dyn CellContext,
        clock: &dyn Clock,
        registry: &mut dyn FateRegistry,
    ) -> Result<CellCyclePhase, CycleError> {
        match self.policy {
            PolicyState::ContactInhibition { .. } => self.track_quiescence(ctx, clock)?,
            PolicyState::UniformWidth { transit_threshold } => {
                self.gate_on_live_signal(ctx, registry, transit_threshold)?;
            }
            PolicyState::MorphogenVariable { .. } => {
                if ctx.fate() == ProliferativeFate::Paneth {
                    self.g1_duration = Some(f64::INFINITY);
                }
            }
            PolicyState::Baseline { .. } | PolicyState::StochasticGeneration { .. } => {}
        }

        let age = self.age(clock.now());
        match phase::classify(age, self.g1_duration, &self.params, ctx.fate())? {
            Some(phase) => self.phase = phase,
            None if self.g1_duration.is_none() => return Err(CycleError::G1Unsampled),
            None => {}
        }
        Ok(self.phase)
    }

    /// Whether the cell should divide now.
    ///
    /// Readiness latches once a cycling cell's age reaches the full cycle
    /// duration and stays set until [`reset_for_division`](Self::reset_for_division).
    pub fn ready_to_divide(
        &mut self,
        ctx: &mut dyn CellContext,
        clock: &dyn Clock,
        registry: &mut dyn FateRegistry,
    ) -> Result<bool, CycleError> {
        if !self.ready_to_divide {
            let phase = self.update_phase(ctx, clock, registry)?;
            if phase != CellCyclePhase::G0 && self.age(clock.now()) >= self.cycle_duration()? {
                self.ready_to_divide = true;
            }
        }
        Ok(self.ready_to_divide)
    }

    /// Sample a fresh G1 duration for the cell's current fate.
    ///
    /// For the morphogen-variable policy every non-Paneth cell is then
    /// reclassified as transit or differentiated from the captured
    /// morphogen level.
    pub fn sample(
        &mut self,
        ctx: &mut dyn CellContext,
        rng: &mut impl UniformSource,
        registry: &mut dyn FateRegistry,
    ) -> Result<f64, CycleError> {
        let fate = ctx.fate();
        let g1 = match self.policy {
            PolicyState::Baseline { .. } => sampler::baseline(&self.params, fate),
            PolicyState::StochasticGeneration { .. } | PolicyState::ContactInhibition { .. } => {
                sampler::generation_window(&self.params, fate, rng)
            }
            PolicyState::UniformWidth { .. } => sampler::uniform_width(&self.params, fate, rng),
            PolicyState::MorphogenVariable {
                transit_threshold,
                initial_signal_level,
            } => {
                let g1 = sampler::morphogen_variable(
                    &self.params,
                    fate,
                    initial_signal_level,
                    transit_threshold,
                    rng,
                );
                fate_switch::apply_threshold(
                    ctx,
                    registry,
                    initial_signal_level,
                    transit_threshold,
                )?;
                g1
            }
        };
        self.g1_duration = Some(g1);
        debug!(
            cell_id = %ctx.cell_id(),
            policy = self.policy.name(),
            fate = fate.tag(),
            g1_duration = g1,
            "G1 duration sampled"
        );
        Ok(g1)
    }

    // -----------------------------------------------------------------------
    // Division
    // -----------------------------------------------------------------------

    /// Turn the parent into a newborn cell after it divides.
    ///
    /// Generation-based policies advance the lineage (forcing
    /// differentiation past the transit limit, and keeping stem cells at
    /// generation 0); the morphogen-variable policy captures the current
    /// morphogen level. The birth time moves to now, the phase returns to
    /// M and G1 is resampled.
    pub fn reset_for_division(
        &mut self,
        ctx: &mut dyn CellContext,
        clock: &dyn Clock,
        rng: &mut impl UniformSource,
        registry: &mut dyn FateRegistry,
    ) -> Result<(), CycleError> {
        if let Some(lineage) = self.policy.lineage_mut() {
            lineage.generation = lineage
                .generation
                .checked_add(1)
                .ok_or(CycleError::GenerationOverflow)?;
            if lineage.generation > lineage.max_transit_generations {
                fate_switch::switch_fate(ctx, registry, ProliferativeFate::Differentiated)?;
            }
            if ctx.fate() == ProliferativeFate::Stem {
                lineage.generation = 0;
            }
        }
        self.capture_signal(&*ctx)?;

        let now = clock.now();
        self.birth_time = now;
        self.phase = CellCyclePhase::M;
        self.ready_to_divide = false;
        if let PolicyState::ContactInhibition { quiescence, .. } = &mut self.policy {
            *quiescence = quiescence.fresh(now);
        }
        self.sample(ctx, rng, registry)?;
        Ok(())
    }

    /// Copy the configuration into a new model for a daughter cell.
    ///
    /// Birth time, phase lengths, generation counters, thresholds,
    /// fractions, volumes and the spatial dimension are copied. The phase
    /// starts at M, G1 is unset and quiescence history starts fresh at the
    /// birth time; call [`initialise_daughter`](Self::initialise_daughter)
    /// before first use.
    pub fn clone_model(&self) -> Self {
        Self {
            params: self.params.clone(),
            policy: self.policy.fresh(self.birth_time),
            birth_time: self.birth_time,
            phase: CellCyclePhase::M,
            g1_duration: None,
            ready_to_divide: false,
            dimension: self.dimension,
        }
    }

    /// Finish setting up a daughter produced by [`clone_model`](Self::clone_model).
    ///
    /// A daughter of a stem cell becomes a transit cell at generation 1;
    /// a daughter past the transit limit differentiates. The
    /// morphogen-variable policy captures the daughter's morphogen level.
    /// G1 is then sampled.
    pub fn initialise_daughter(
        &mut self,
        ctx: &mut dyn CellContext,
        rng: &mut impl UniformSource,
        registry: &mut dyn FateRegistry,
    ) -> Result<(), CycleError> {
        if let Some(lineage) = self.policy.lineage_mut() {
            if lineage.generation == 0 {
                lineage.generation = 1;
            }
            if lineage.generation > lineage.max_transit_generations {
                fate_switch::switch_fate(ctx, registry, ProliferativeFate::Differentiated)?;
            }
            if ctx.fate() == ProliferativeFate::Stem {
                fate_switch::switch_fate(ctx, registry, ProliferativeFate::Transit)?;
            }
        }
        self.capture_signal(&*ctx)?;
        self.sample(ctx, rng, registry)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Policy internals
    // -----------------------------------------------------------------------

    fn read_signal(&self, ctx: &dyn CellContext) -> Result<f64, CycleError> {
        self.dimension()?;
        Ok(ctx.signal_level())
    }

    fn capture_signal(&mut self, ctx: &dyn CellContext) -> Result<(), CycleError> {
        if !matches!(self.policy, PolicyState::MorphogenVariable { .. }) {
            return Ok(());
        }
        let level = self.read_signal(ctx)?;
        self.set_initial_signal_level(level)
    }

    fn track_quiescence(
        &mut self,
        ctx: &mut dyn CellContext,
        clock: &dyn Clock,
    ) -> Result<(), CycleError> {
        ctx.set_labelled(false);
        if self.phase != CellCyclePhase::G1 {
            return Ok(());
        }
        let g1 = self.g1_duration.ok_or(CycleError::G1Unsampled)?;
        let PolicyState::ContactInhibition { quiescence, .. } = &mut self.policy else {
            return Ok(());
        };
        if quiescence.observe(ctx.occupied_volume(), clock.now()) == QuiescenceState::Quiescent {
            let quiescent_duration = quiescence.duration();
            self.g1_duration = Some(g1 + clock.timestep());
            ctx.set_labelled(true);
            debug!(
                cell_id = %ctx.cell_id(),
                quiescent_duration,
                "Cell contact inhibited in G1"
            );
        }
        Ok(())
    }

    fn gate_on_live_signal(
        &self,
        ctx: &mut dyn CellContext,
        registry: &mut dyn FateRegistry,
        transit_threshold: f64,
    ) -> Result<(), CycleError> {
        if ctx.fate() == ProliferativeFate::Paneth {
            return Ok(());
        }
        let level = self.read_signal(&*ctx)?;
        fate_switch::apply_threshold(ctx, registry, level, transit_threshold)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{CountingRegistry, FixedClock, ScriptedUniform, TestCell};

    const fn at(now: f64) -> FixedClock {
        FixedClock { now, dt: 0.25 }
    }

    fn baseline(max_transit_generations: u32) -> CycleModel {
        let policy = PolicyConfig::Baseline {
            max_transit_generations,
        };
        CycleModel::new(CycleParams::default(), &policy, 0.0).unwrap()
    }

    fn stochastic_generation(max_transit_generations: u32) -> CycleModel {
        let policy = PolicyConfig::StochasticGeneration {
            max_transit_generations,
        };
        CycleModel::new(CycleParams::default(), &policy, 0.0).unwrap()
    }

    fn contact_inhibition() -> CycleModel {
        let policy = PolicyConfig::ContactInhibition {
            max_transit_generations: 4,
            quiescent_volume_fraction: 0.8,
            equilibrium_volume: 1.0,
        };
        CycleModel::new(CycleParams::default(), &policy, 0.0).unwrap()
    }

    fn morphogen_variable() -> CycleModel {
        let policy = PolicyConfig::MorphogenVariable {
            transit_threshold: 0.5,
        };
        let mut model = CycleModel::new(CycleParams::default(), &policy, 0.0).unwrap();
        model.set_dimension(2).unwrap();
        model
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn new_model_starts_in_m_unsampled() {
        let model = baseline(3);
        assert_eq!(model.current_phase(), CellCyclePhase::M);
        assert_eq!(model.g1_duration(), None);
        assert_eq!(model.generation(), Some(0));
        assert!(!model.is_ready_to_divide());
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let policy = PolicyConfig::MorphogenVariable {
            transit_threshold: 1.0,
        };
        assert!(CycleModel::new(CycleParams::default(), &policy, 0.0).is_err());
        let policy = PolicyConfig::Baseline {
            max_transit_generations: 3,
        };
        assert!(CycleModel::new(CycleParams::default(), &policy, f64::NAN).is_err());
    }

    // -----------------------------------------------------------------------
    // Phase updates and readiness
    // -----------------------------------------------------------------------

    #[test]
    fn update_before_sample_fails_once_out_of_m() {
        let mut model = baseline(3);
        let mut cell = TestCell::new(ProliferativeFate::Transit);
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        assert_eq!(
            model.update_phase(&mut cell, &at(0.5), &mut registry).unwrap(),
            CellCyclePhase::M
        );
        assert_eq!(
            model.update_phase(&mut cell, &at(1.5), &mut registry),
            Err(CycleError::G1Unsampled)
        );
    }

    #[test]
    fn clock_behind_birth_is_an_error() {
        let mut model = baseline(3);
        model.set_birth_time(5.0);
        let mut cell = TestCell::new(ProliferativeFate::Transit);
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        assert!(matches!(
            model.update_phase(&mut cell, &at(4.0), &mut registry),
            Err(CycleError::NegativeAge { .. })
        ));
    }

    #[test]
    fn readiness_latches_at_cycle_end() {
        let mut model = baseline(3);
        let mut cell = TestCell::new(ProliferativeFate::Transit);
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        let mut rng = ScriptedUniform::new(&[]);
        model.sample(&mut cell, &mut rng, &mut registry).unwrap();
        // 1 (M) + 2 (G1) + 5 (S) + 4 (G2)
        assert!((model.cycle_duration().unwrap() - 12.0).abs() < 1e-12);

        assert!(!model.ready_to_divide(&mut cell, &at(11.75), &mut registry).unwrap());
        assert_eq!(model.current_phase(), CellCyclePhase::G2);
        assert!(model.ready_to_divide(&mut cell, &at(12.0), &mut registry).unwrap());
        // Past G2 nothing covers the age, so the phase stays put.
        assert_eq!(model.current_phase(), CellCyclePhase::G2);
        assert!(model.ready_to_divide(&mut cell, &at(30.0), &mut registry).unwrap());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn terminal_cells_never_divide() {
        let mut model = baseline(3);
        let mut cell = TestCell::new(ProliferativeFate::Differentiated);
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Differentiated]);
        let mut rng = ScriptedUniform::new(&[]);
        let g1 = model.sample(&mut cell, &mut rng, &mut registry).unwrap();
        assert!(g1.is_infinite());
        for now in [0.0, 10.0, 1000.0] {
            assert!(!model.ready_to_divide(&mut cell, &at(now), &mut registry).unwrap());
            assert_eq!(model.current_phase(), CellCyclePhase::G0);
        }
    }

    // -----------------------------------------------------------------------
    // Contact inhibition
    // -----------------------------------------------------------------------

    #[test]
    fn crowded_g1_cell_extends_g1_by_one_step() {
        let mut model = contact_inhibition();
        let mut cell = TestCell::new(ProliferativeFate::Transit);
        cell.volume = 0.5;
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        let mut rng = ScriptedUniform::new(&[0.5]);
        // 2 + 2 * 0.5
        assert!((model.sample(&mut cell, &mut rng, &mut registry).unwrap() - 3.0).abs() < 1e-12);

        // First G1 update: the stored phase was still M, no tracking yet.
        model.update_phase(&mut cell, &at(1.0), &mut registry).unwrap();
        assert!(!cell.labelled);

        let mut previous = model.g1_duration().unwrap();
        for now in [1.25, 1.5, 1.75] {
            assert_eq!(
                model.update_phase(&mut cell, &at(now), &mut registry).unwrap(),
                CellCyclePhase::G1
            );
            let g1 = model.g1_duration().unwrap();
            assert!((g1 - previous - 0.25).abs() < 1e-12);
            assert!(cell.labelled);
            previous = g1;
        }
        let tracker = model.quiescence().unwrap();
        assert!((tracker.duration() - 1.75).abs() < 1e-12);

        cell.volume = 1.0;
        model.update_phase(&mut cell, &at(2.0), &mut registry).unwrap();
        assert!(!cell.labelled);
        assert!((model.g1_duration().unwrap() - previous).abs() < 1e-12);
        assert!(model.quiescence().unwrap().duration().abs() < 1e-12);
    }

    #[test]
    fn cells_outside_g1_are_not_stalled() {
        let mut model = contact_inhibition();
        let mut cell = TestCell::new(ProliferativeFate::Transit);
        cell.volume = 0.1;
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        model
            .sample(&mut cell, &mut ScriptedUniform::new(&[0.0]), &mut registry)
            .unwrap();
        model.update_phase(&mut cell, &at(0.5), &mut registry).unwrap();
        model.update_phase(&mut cell, &at(0.75), &mut registry).unwrap();
        assert!((model.g1_duration().unwrap() - 2.0).abs() < 1e-12);
        assert!(!cell.labelled);
    }

    // -----------------------------------------------------------------------
    // Division
    // -----------------------------------------------------------------------

    #[test]
    fn transit_lineage_differentiates_past_limit() {
        let mut model = baseline(2);
        let mut cell = TestCell::new(ProliferativeFate::Transit);
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        let mut rng = ScriptedUniform::new(&[]);

        model.reset_for_division(&mut cell, &at(12.0), &mut rng, &mut registry).unwrap();
        assert_eq!(model.generation(), Some(1));
        assert!((model.birth_time() - 12.0).abs() < 1e-12);
        assert_eq!(model.current_phase(), CellCyclePhase::M);

        model.reset_for_division(&mut cell, &at(24.0), &mut rng, &mut registry).unwrap();
        assert_eq!(cell.fate, ProliferativeFate::Transit);
        model.reset_for_division(&mut cell, &at(36.0), &mut rng, &mut registry).unwrap();
        assert_eq!(model.generation(), Some(3));
        assert_eq!(cell.fate, ProliferativeFate::Differentiated);
        assert!(model.g1_duration().unwrap().is_infinite());
        assert_eq!(registry.count(ProliferativeFate::Transit), 0);
        assert_eq!(registry.count(ProliferativeFate::Differentiated), 1);
    }

    #[test]
    fn stem_parent_stays_at_generation_zero() {
        let mut model = baseline(2);
        let mut cell = TestCell::new(ProliferativeFate::Stem);
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Stem]);
        let mut rng = ScriptedUniform::new(&[]);
        model.reset_for_division(&mut cell, &at(24.0), &mut rng, &mut registry).unwrap();
        assert_eq!(model.generation(), Some(0));
        assert_eq!(cell.fate, ProliferativeFate::Stem);
        assert!((model.g1_duration().unwrap() - 14.0).abs() < 1e-12);
    }

    #[test]
    fn stem_daughter_becomes_generation_one_transit() {
        let mut parent = baseline(2);
        let mut registry =
            CountingRegistry::with_cells(&[ProliferativeFate::Stem, ProliferativeFate::Stem]);
        let mut rng = ScriptedUniform::new(&[]);
        let mut parent_cell = TestCell::new(ProliferativeFate::Stem);
        parent
            .reset_for_division(&mut parent_cell, &at(24.0), &mut rng, &mut registry)
            .unwrap();

        let mut daughter = parent.clone_model();
        let mut daughter_cell = TestCell::new(ProliferativeFate::Stem);
        daughter
            .initialise_daughter(&mut daughter_cell, &mut rng, &mut registry)
            .unwrap();
        assert_eq!(daughter.generation(), Some(1));
        assert_eq!(daughter_cell.fate, ProliferativeFate::Transit);
        assert!((daughter.g1_duration().unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(registry.count(ProliferativeFate::Stem), 1);
        assert_eq!(registry.count(ProliferativeFate::Transit), 1);
    }

    #[test]
    fn stochastic_generation_draws_above_the_fate_mean() {
        let mut model = stochastic_generation(2);
        let mut registry =
            CountingRegistry::with_cells(&[ProliferativeFate::Stem, ProliferativeFate::Transit]);
        let mut rng = ScriptedUniform::new(&[0.5, 0.25]);
        let mut stem = TestCell::new(ProliferativeFate::Stem);
        // 14 + 4 * 0.5
        let g1 = model.sample(&mut stem, &mut rng, &mut registry).unwrap();
        assert_eq!(g1.to_bits(), 16.0_f64.to_bits());
        let mut transit = TestCell::new(ProliferativeFate::Transit);
        // 2 + 2 * 0.25
        let g1 = model.sample(&mut transit, &mut rng, &mut registry).unwrap();
        assert_eq!(g1.to_bits(), 2.5_f64.to_bits());
        assert_eq!(rng.draws(), 2);
        assert!(model.quiescence().is_none());
    }

    #[test]
    fn stochastic_generation_lineage_matches_baseline() {
        let mut model = stochastic_generation(1);
        let mut cell = TestCell::new(ProliferativeFate::Transit);
        cell.volume = 0.0;
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        let mut rng = ScriptedUniform::new(&[0.0, 0.0]);
        model.reset_for_division(&mut cell, &at(12.0), &mut rng, &mut registry).unwrap();
        assert_eq!(model.generation(), Some(1));
        assert_eq!(cell.fate, ProliferativeFate::Transit);
        // Crowding never stalls this policy.
        model.update_phase(&mut cell, &at(13.5), &mut registry).unwrap();
        model.update_phase(&mut cell, &at(13.75), &mut registry).unwrap();
        assert!((model.g1_duration().unwrap() - 2.0).abs() < 1e-12);
        assert!(!cell.labelled);

        model.reset_for_division(&mut cell, &at(24.0), &mut rng, &mut registry).unwrap();
        assert_eq!(cell.fate, ProliferativeFate::Differentiated);
        assert!(model.g1_duration().unwrap().is_infinite());
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn daughter_past_limit_differentiates() {
        let mut model = baseline(2);
        model.set_generation(3).unwrap();
        let mut cell = TestCell::new(ProliferativeFate::Transit);
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        model
            .initialise_daughter(&mut cell, &mut ScriptedUniform::new(&[]), &mut registry)
            .unwrap();
        assert_eq!(cell.fate, ProliferativeFate::Differentiated);
    }

    #[test]
    fn clone_copies_configuration_but_not_history() {
        let mut model = contact_inhibition();
        model.set_birth_time(3.0);
        model.set_generation(2).unwrap();
        let mut cell = TestCell::new(ProliferativeFate::Transit);
        cell.volume = 0.1;
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        model
            .sample(&mut cell, &mut ScriptedUniform::new(&[0.5]), &mut registry)
            .unwrap();
        for now in [4.5, 5.0, 5.5] {
            model.update_phase(&mut cell, &at(now), &mut registry).unwrap();
        }
        assert!(model.quiescence().unwrap().duration() > 0.0);

        let clone = model.clone_model();
        assert_eq!(clone.params(), model.params());
        assert_eq!(clone.generation(), Some(2));
        assert!((clone.birth_time() - 3.0).abs() < 1e-12);
        assert_eq!(clone.current_phase(), CellCyclePhase::M);
        assert_eq!(clone.g1_duration(), None);
        let tracker = clone.quiescence().unwrap();
        assert!((tracker.onset_time() - 3.0).abs() < 1e-12);
        assert!(tracker.duration().abs() < 1e-12);
        assert!((tracker.equilibrium_volume() - 1.0).abs() < 1e-12);
    }

    // -----------------------------------------------------------------------
    // Morphogen policies
    // -----------------------------------------------------------------------

    #[test]
    fn dimension_rules() {
        let mut model = baseline(3);
        assert!(matches!(
            model.set_dimension(2),
            Err(CycleError::DimensionForbidden { .. })
        ));
        let mut model = morphogen_variable();
        assert_eq!(model.dimension(), Ok(2));
        assert_eq!(
            model.set_dimension(4),
            Err(CycleError::InvalidDimension { dimension: 4 })
        );
        assert_eq!(model.clone_model().dimension(), Ok(2));
    }

    #[test]
    fn morphogen_read_without_dimension_fails() {
        let policy = PolicyConfig::MorphogenVariable {
            transit_threshold: 0.5,
        };
        let mut model = CycleModel::new(CycleParams::default(), &policy, 0.0).unwrap();
        let mut cell = TestCell::new(ProliferativeFate::Transit);
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        let result = model.reset_for_division(
            &mut cell,
            &at(1.0),
            &mut ScriptedUniform::new(&[0.5]),
            &mut registry,
        );
        assert_eq!(result, Err(CycleError::DimensionUnset));
    }

    #[test]
    fn division_captures_signal_and_decides_fate() {
        let mut model = morphogen_variable();
        let mut cell = TestCell::new(ProliferativeFate::Transit);
        cell.signal = 0.75;
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        let mut rng = ScriptedUniform::new(&[0.5, 0.5]);
        model.reset_for_division(&mut cell, &at(10.0), &mut rng, &mut registry).unwrap();
        assert_eq!(model.initial_signal_level(), Some(0.75));
        assert!((model.g1_duration().unwrap() - 14.0).abs() < 1e-12);
        assert_eq!(cell.fate, ProliferativeFate::Transit);

        cell.signal = 0.25;
        model.reset_for_division(&mut cell, &at(30.0), &mut rng, &mut registry).unwrap();
        assert_eq!(cell.fate, ProliferativeFate::Differentiated);
        assert_eq!(model.clone_model().initial_signal_level(), Some(DEFAULT_INITIAL_SIGNAL_LEVEL));
    }

    #[test]
    fn differentiated_cells_follow_the_captured_level() {
        let mut model = morphogen_variable();
        let mut cell = TestCell::new(ProliferativeFate::Differentiated);
        cell.signal = 0.9;
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Differentiated]);
        let mut rng = ScriptedUniform::new(&[]);
        model.reset_for_division(&mut cell, &at(1.0), &mut rng, &mut registry).unwrap();
        // G1 was drawn for the differentiated fate before the switch.
        assert!(model.g1_duration().unwrap().is_infinite());
        assert_eq!(rng.draws(), 0);
        assert_eq!(cell.fate, ProliferativeFate::Transit);
        assert_eq!(registry.count(ProliferativeFate::Differentiated), 0);
        assert_eq!(registry.count(ProliferativeFate::Transit), 1);
    }

    #[test]
    fn paneth_cells_are_never_reclassified() {
        let mut model = morphogen_variable();
        let mut cell = TestCell::new(ProliferativeFate::Paneth);
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Paneth]);
        let mut rng = ScriptedUniform::new(&[]);
        for level in [0.0, 0.9] {
            model.set_initial_signal_level(level).unwrap();
            assert!(model.sample(&mut cell, &mut rng, &mut registry).unwrap().is_infinite());
            assert_eq!(cell.fate, ProliferativeFate::Paneth);
        }
        assert_eq!(registry.count(ProliferativeFate::Paneth), 1);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn captured_level_straddling_the_threshold_decides_fate() {
        let policy = PolicyConfig::MorphogenVariable {
            transit_threshold: 0.65,
        };
        let mut model = CycleModel::new(CycleParams::default(), &policy, 0.0).unwrap();
        model.set_dimension(2).unwrap();
        let mut cell = TestCell::new(ProliferativeFate::Transit);
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        let mut rng = ScriptedUniform::new(&[0.5, 0.5]);

        model.set_initial_signal_level(0.649_99).unwrap();
        model.sample(&mut cell, &mut rng, &mut registry).unwrap();
        assert_eq!(cell.fate, ProliferativeFate::Differentiated);
        assert_eq!(registry.count(ProliferativeFate::Transit), 0);
        assert_eq!(registry.count(ProliferativeFate::Differentiated), 1);

        cell.fate = ProliferativeFate::Transit;
        registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        model.set_initial_signal_level(0.650_01).unwrap();
        model.sample(&mut cell, &mut rng, &mut registry).unwrap();
        assert_eq!(cell.fate, ProliferativeFate::Transit);
        assert_eq!(registry.count(ProliferativeFate::Transit), 1);
        assert_eq!(registry.count(ProliferativeFate::Differentiated), 0);
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn paneth_cells_are_pinned_to_g0() {
        let mut model = morphogen_variable();
        let mut cell = TestCell::new(ProliferativeFate::Paneth);
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Paneth]);
        assert_eq!(
            model.update_phase(&mut cell, &at(5.0), &mut registry).unwrap(),
            CellCyclePhase::G0
        );
        assert!(model.g1_duration().unwrap().is_infinite());
    }

    #[test]
    fn uniform_width_gates_on_live_signal() {
        let policy = PolicyConfig::UniformWidth {
            transit_threshold: 0.5,
        };
        let mut model = CycleModel::new(CycleParams::default(), &policy, 0.0).unwrap();
        model.set_dimension(1).unwrap();
        let mut cell = TestCell::new(ProliferativeFate::Transit);
        let mut registry = CountingRegistry::with_cells(&[ProliferativeFate::Transit]);
        model
            .sample(&mut cell, &mut ScriptedUniform::new(&[0.5]), &mut registry)
            .unwrap();
        assert_eq!(
            model.update_phase(&mut cell, &at(2.0), &mut registry).unwrap(),
            CellCyclePhase::G1
        );
        cell.signal = 0.2;
        assert_eq!(
            model.update_phase(&mut cell, &at(2.25), &mut registry).unwrap(),
            CellCyclePhase::G0
        );
        assert_eq!(cell.fate, ProliferativeFate::Differentiated);
    }

    #[test]
    fn signal_override_is_policy_specific() {
        let mut model = morphogen_variable();
        model.set_initial_signal_level(0.6).unwrap();
        assert_eq!(model.initial_signal_level(), Some(0.6));
        let mut other = baseline(3);
        assert!(matches!(
            other.set_initial_signal_level(0.6),
            Err(CycleError::NotApplicable { .. })
        ));
        let policy = PolicyConfig::UniformWidth {
            transit_threshold: 0.5,
        };
        let mut uniform = CycleModel::new(CycleParams::default(), &policy, 0.0).unwrap();
        assert!(uniform.set_generation(1).is_err());
    }
}
