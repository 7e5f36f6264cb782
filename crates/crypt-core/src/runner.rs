//! Whole-run driver for one proliferation model.
//!
//! [`run_model`] builds the clock, random stream, field and seeded crypt
//! for a model kind, steps it to the configured end time and summarises
//! the division log. Each run reseeds the random stream, so every model in
//! a sweep sees the same starting draws.

use std::collections::BTreeMap;

use crypt_cycle::CycleModel;
use crypt_types::{ModelKind, ProliferativeFate};
use serde::Serialize;
use tracing::info;

use crate::clock::SimulationTime;
use crate::config::CryptConfig;
use crate::parameters::ParameterEnvironment;
use crate::population::{CryptGeometry, LinearCrypt, Population, PopulationError, StepReport};
use crate::presets::CryptPreset;
use crate::random::SeededUniform;

/// Summary of one model run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Which model ran.
    pub model: ModelKind,
    /// Seed of the random stream.
    pub seed: u64,
    /// Simulated hours.
    pub end_time: f64,
    /// Timesteps taken.
    pub steps: u32,
    /// Cells alive at the end.
    pub final_cells: usize,
    /// Final per-fate counts.
    pub fate_counts: BTreeMap<ProliferativeFate, u64>,
    /// Divisions over the whole run.
    pub divisions: usize,
    /// Cells sloughed over the whole run.
    pub sloughed: u64,
    /// Mean age of parents at division, if any cell divided.
    pub mean_parent_age: Option<f64>,
    /// Random draws consumed.
    pub draws: u64,
    /// The model's cell-cycle parameters in output order.
    pub parameters: Vec<(&'static str, f64)>,
}

/// Callback invoked after each population step.
pub trait StepCallback {
    /// Called after a step completes successfully.
    fn on_step(&mut self, time: f64, report: &StepReport, population: &Population);
}

/// A no-op step callback.
pub struct NoOpCallback;

impl StepCallback for NoOpCallback {
    fn on_step(&mut self, _time: f64, _report: &StepReport, _population: &Population) {}
}

/// Run `kind` over the crypt described by `env`.
///
/// Returns the run summary together with the final population, whose
/// division log is the run's primary output.
///
/// # Errors
///
/// Returns [`PopulationError`] if the parameters are invalid or any
/// cell-cycle operation fails. The run stops at the first error.
pub fn run_model(
    kind: ModelKind,
    config: &CryptConfig,
    env: &ParameterEnvironment,
    callback: &mut dyn StepCallback,
) -> Result<(RunSummary, Population), PopulationError> {
    let geometry = CryptGeometry::from_parameters(env)?;
    let end_time = env.number("end_time")?;
    let steps_per_hour = crate::population::count(env, "dt_divisor")?;
    let mut clock = SimulationTime::with_end_time(0.0, end_time, steps_per_hour)?;
    let mut rng = SeededUniform::new(config.simulation.seed);

    let preset = CryptPreset::for_kind(kind, &config.cycle);
    let field = LinearCrypt::new(&geometry, config.cycle.equilibrium_volume);
    let parameters =
        CycleModel::new(preset.params.clone(), &preset.policy, 0.0)?.output_parameters();
    let mut population = Population::seed(&preset, geometry, &field, 0.0, &mut rng)?;

    info!(
        model = %kind,
        seed = config.simulation.seed,
        end_time,
        steps = clock.total_steps(),
        cells = population.len(),
        "Model run starting"
    );

    let report_every = steps_per_hour.saturating_mul(config.simulation.report_interval_hours);
    while !clock.is_finished() {
        let step = clock.advance()?;
        let report = population.step(&clock, &field, &mut rng)?;
        callback.on_step(clock.time(), &report, &population);

        if report_every > 0 && step.checked_rem(report_every) == Some(0) {
            info!(
                model = %kind,
                time = clock.time(),
                cells = population.len(),
                divisions = population.divisions().len(),
                labelled = population.labelled(),
                "Crypt progress"
            );
        }
    }

    let summary = summarise(kind, config.simulation.seed, &clock, &population, &rng, parameters);
    info!(
        model = %kind,
        divisions = summary.divisions,
        sloughed = summary.sloughed,
        final_cells = summary.final_cells,
        "Model run complete"
    );
    Ok((summary, population))
}

fn summarise(
    kind: ModelKind,
    seed: u64,
    clock: &SimulationTime,
    population: &Population,
    rng: &SeededUniform,
    parameters: Vec<(&'static str, f64)>,
) -> RunSummary {
    let divisions = population.divisions();
    let mean_parent_age = u32::try_from(divisions.len())
        .ok()
        .filter(|n| *n > 0)
        .map(|n| divisions.iter().map(|d| d.parent_age).sum::<f64>() / f64::from(n));
    RunSummary {
        model: kind,
        seed,
        end_time: clock.time(),
        steps: clock.steps(),
        final_cells: population.len(),
        fate_counts: population.registry().counts().clone(),
        divisions: divisions.len(),
        sloughed: population.sloughed(),
        mean_parent_age,
        draws: rng.draws(),
        parameters,
    }
}
