//! Step callback that traces each crypt step and keeps running peaks.

use crypt_core::population::{Population, StepReport};
use crypt_core::runner::StepCallback;
use serde::Serialize;
use tracing::trace;

/// Peaks observed over one model run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunPeaks {
    /// Largest population seen after any step.
    pub peak_cells: usize,
    /// Most divisions in a single step.
    pub peak_divisions_per_step: u32,
    /// Most cells marked contact inhibited after any step.
    pub peak_labelled: usize,
}

/// Callback that records [`RunPeaks`] and emits a trace event per step.
#[derive(Debug, Default)]
pub struct ProgressCallback {
    peaks: RunPeaks,
}

impl ProgressCallback {
    /// Create a callback with all peaks at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Peaks recorded so far.
    pub const fn peaks(&self) -> RunPeaks {
        self.peaks
    }
}

impl StepCallback for ProgressCallback {
    fn on_step(&mut self, time: f64, report: &StepReport, population: &Population) {
        let labelled = population.labelled();
        self.peaks.peak_cells = self.peaks.peak_cells.max(population.len());
        self.peaks.peak_divisions_per_step =
            self.peaks.peak_divisions_per_step.max(report.divisions);
        self.peaks.peak_labelled = self.peaks.peak_labelled.max(labelled);
        trace!(
            time,
            divisions = report.divisions,
            sloughed = report.sloughed,
            cells = population.len(),
            labelled,
            "Crypt step"
        );
    }
}
