//! In-crate test doubles for the collaborator traits.

use std::collections::BTreeMap;

use crypt_types::{CellId, MutationState, ProliferativeFate};

use crate::collab::{CellContext, Clock, FateRegistry, UniformSource};
use crate::error::CycleError;

/// Replays a fixed list of draws, then returns 0.0.
pub struct ScriptedUniform {
    values: Vec<f64>,
    draws: usize,
}

impl ScriptedUniform {
    pub fn new(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
            draws: 0,
        }
    }

    pub const fn draws(&self) -> usize {
        self.draws
    }
}

impl UniformSource for ScriptedUniform {
    fn next_uniform01(&mut self) -> f64 {
        let value = self.values.get(self.draws).copied().unwrap_or(0.0);
        self.draws = self.draws.saturating_add(1);
        value
    }
}

/// A bare cell with directly settable signals.
pub struct TestCell {
    pub id: CellId,
    pub fate: ProliferativeFate,
    pub mutation: MutationState,
    pub volume: f64,
    pub signal: f64,
    pub labelled: bool,
}

impl TestCell {
    pub fn new(fate: ProliferativeFate) -> Self {
        Self {
            id: CellId::new(),
            fate,
            mutation: MutationState::WildType,
            volume: 1.0,
            signal: 1.0,
            labelled: false,
        }
    }
}

impl CellContext for TestCell {
    fn cell_id(&self) -> CellId {
        self.id
    }

    fn fate(&self) -> ProliferativeFate {
        self.fate
    }

    fn set_fate(&mut self, fate: ProliferativeFate) {
        self.fate = fate;
    }

    fn mutation(&self) -> MutationState {
        self.mutation
    }

    fn occupied_volume(&self) -> f64 {
        self.volume
    }

    fn signal_level(&self) -> f64 {
        self.signal
    }

    fn set_labelled(&mut self, labelled: bool) {
        self.labelled = labelled;
    }
}

/// Fate registry keeping plain per-fate counts.
pub struct CountingRegistry {
    counts: BTreeMap<ProliferativeFate, usize>,
}

impl CountingRegistry {
    /// Every fate registered, with one count per listed cell.
    pub fn with_cells(fates: &[ProliferativeFate]) -> Self {
        let mut counts: BTreeMap<ProliferativeFate, usize> =
            ProliferativeFate::ALL.into_iter().map(|fate| (fate, 0)).collect();
        for fate in fates {
            let count = counts.entry(*fate).or_insert(0);
            *count = count.saturating_add(1);
        }
        Self { counts }
    }

    /// Every fate but `missing` registered, all at zero.
    pub fn without(missing: ProliferativeFate) -> Self {
        let counts = ProliferativeFate::ALL
            .into_iter()
            .filter(|fate| *fate != missing)
            .map(|fate| (fate, 0))
            .collect();
        Self { counts }
    }

    pub fn count(&self, fate: ProliferativeFate) -> usize {
        self.counts.get(&fate).copied().unwrap_or(0)
    }
}

impl FateRegistry for CountingRegistry {
    fn reclassify(
        &mut self,
        cell_id: CellId,
        from: ProliferativeFate,
        to: ProliferativeFate,
    ) -> Result<(), CycleError> {
        if !self.counts.contains_key(&to) {
            return Err(CycleError::FateNotRegistered { fate: to });
        }
        let source = self
            .counts
            .get_mut(&from)
            .ok_or(CycleError::FateNotRegistered { fate: from })?;
        *source = source
            .checked_sub(1)
            .ok_or(CycleError::FateCountUnderflow { cell_id, fate: from })?;
        let target = self.counts.entry(to).or_insert(0);
        *target = target.saturating_add(1);
        Ok(())
    }
}

/// A clock frozen at `now`.
pub struct FixedClock {
    pub now: f64,
    pub dt: f64,
}

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.now
    }

    fn timestep(&self) -> f64 {
        self.dt
    }
}
