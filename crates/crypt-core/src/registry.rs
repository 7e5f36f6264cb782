//! Per-fate population counts.
//!
//! The registry is created by the population before any cell-cycle model
//! runs and is handed to the models explicitly. Lookups never create
//! entries: a fate that was not registered up front is an error.

use std::collections::BTreeMap;

use crypt_cycle::{CycleError, FateRegistry};
use crypt_types::{CellId, ProliferativeFate};

/// Errors raised by registry bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The fate has no registry entry.
    #[error("fate {fate:?} is not registered")]
    NotRegistered {
        /// The missing fate.
        fate: ProliferativeFate,
    },

    /// A count would drop below zero.
    #[error("no {fate:?} cells left to remove (cell {cell_id})")]
    Empty {
        /// The cell being removed or reclassified.
        cell_id: CellId,
        /// The fate whose count is zero.
        fate: ProliferativeFate,
    },
}

impl From<RegistryError> for CycleError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotRegistered { fate } => Self::FateNotRegistered { fate },
            RegistryError::Empty { cell_id, fate } => Self::FateCountUnderflow { cell_id, fate },
        }
    }
}

/// Cell counts per proliferative fate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProliferativeRegistry {
    counts: BTreeMap<ProliferativeFate, u64>,
}

impl ProliferativeRegistry {
    /// An empty registry with no fates registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every fate registered at zero.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for fate in ProliferativeFate::ALL {
            registry.register_fate(fate);
        }
        registry
    }

    /// Register `fate` with a zero count. Already-registered fates keep
    /// their count.
    pub fn register_fate(&mut self, fate: ProliferativeFate) {
        self.counts.entry(fate).or_insert(0);
    }

    /// Count a new cell of `fate`.
    pub fn add_cell(&mut self, fate: ProliferativeFate) -> Result<(), RegistryError> {
        let count = self
            .counts
            .get_mut(&fate)
            .ok_or(RegistryError::NotRegistered { fate })?;
        *count = count.saturating_add(1);
        Ok(())
    }

    /// Remove a cell of `fate`, e.g. when it is sloughed.
    pub fn remove_cell(
        &mut self,
        cell_id: CellId,
        fate: ProliferativeFate,
    ) -> Result<(), RegistryError> {
        let count = self
            .counts
            .get_mut(&fate)
            .ok_or(RegistryError::NotRegistered { fate })?;
        *count = count
            .checked_sub(1)
            .ok_or(RegistryError::Empty { cell_id, fate })?;
        Ok(())
    }

    /// Current count for `fate` (0 if unregistered).
    pub fn count(&self, fate: ProliferativeFate) -> u64 {
        self.counts.get(&fate).copied().unwrap_or(0)
    }

    /// Total cells across all fates.
    pub fn total(&self) -> u64 {
        self.counts.values().fold(0, |acc, n| acc.saturating_add(*n))
    }

    /// All counts in fate order.
    pub const fn counts(&self) -> &BTreeMap<ProliferativeFate, u64> {
        &self.counts
    }
}

impl FateRegistry for ProliferativeRegistry {
    fn reclassify(
        &mut self,
        cell_id: CellId,
        from: ProliferativeFate,
        to: ProliferativeFate,
    ) -> Result<(), CycleError> {
        if !self.counts.contains_key(&to) {
            return Err(RegistryError::NotRegistered { fate: to }.into());
        }
        self.remove_cell(cell_id, from)?;
        self.add_cell(to)?;
        Ok(())
    }
}
