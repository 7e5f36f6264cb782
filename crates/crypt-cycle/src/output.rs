//! Parameter output in the run-log format.

use std::fmt::Write as _;

use crate::model::{CycleModel, PolicyState};

impl CycleModel {
    /// Named parameters in output order.
    ///
    /// The shared phase lengths come first, then the generation limit for
    /// the generation-based policies, then the policy's own parameters.
    /// Signal history (quiescence onset, captured morphogen level) is state
    /// and is not listed.
    pub fn output_parameters(&self) -> Vec<(&'static str, f64)> {
        let mut out = vec![
            ("StemCellG1Duration", self.params.stem_g1_mean),
            ("TransitCellG1Duration", self.params.transit_g1_mean),
            ("SDuration", self.params.s_duration),
            ("G2Duration", self.params.g2_duration),
            ("MDuration", self.params.m_duration),
            ("MinimumGapDuration", self.params.minimum_gap_duration),
        ];
        if let Some(lineage) = self.policy.lineage() {
            out.push((
                "MaxTransitGenerations",
                f64::from(lineage.max_transit_generations),
            ));
        }
        match &self.policy {
            PolicyState::ContactInhibition { quiescence, .. } => {
                out.push((
                    "QuiescentVolumeFraction",
                    quiescence.quiescent_volume_fraction(),
                ));
                out.push(("EquilibriumVolume", quiescence.equilibrium_volume()));
            }
            PolicyState::UniformWidth { transit_threshold }
            | PolicyState::MorphogenVariable {
                transit_threshold, ..
            } => out.push(("TransitThreshold", *transit_threshold)),
            PolicyState::Baseline { .. } | PolicyState::StochasticGeneration { .. } => {}
        }
        out
    }

    /// Append every parameter to `sink` as an indented `<Name>value</Name>`
    /// line.
    pub fn write_parameters(&self, sink: &mut String) -> std::fmt::Result {
        for (name, value) in self.output_parameters() {
            writeln!(sink, "\t\t\t<{name}>{value}</{name}>")?;
        }
        Ok(())
    }
}
