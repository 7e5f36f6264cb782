//! Contact-inhibition bookkeeping.
//!
//! While a cell sits in G1, each update compares its occupied volume with
//! a fraction of the equilibrium volume. A crowded cell is quiescent: the
//! model extends its G1 by one timestep so the phase clock stays a pure
//! function of age while the cell stalls. Re-entering quiescence restarts
//! the duration from the most recent onset; earlier stretches are not
//! accumulated.

use serde::{Deserialize, Serialize};

/// Outcome of one quiescence observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuiescenceState {
    /// The cell has room to grow.
    Active,
    /// The cell is crowded below the quiescent volume threshold.
    Quiescent,
}

/// Quiescence configuration and signal history for one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuiescenceTracker {
    /// Fraction of the equilibrium volume below which a G1 cell is
    /// quiescent.
    quiescent_volume_fraction: f64,

    /// Equilibrium volume of a G1 cell.
    equilibrium_volume: f64,

    /// Time at which the current stretch of quiescence began.
    onset_time: f64,

    /// How long the current stretch of quiescence has lasted.
    duration: f64,
}

impl QuiescenceTracker {
    /// Create a tracker with no quiescence history, anchored at `now`.
    pub const fn new(quiescent_volume_fraction: f64, equilibrium_volume: f64, now: f64) -> Self {
        Self {
            quiescent_volume_fraction,
            equilibrium_volume,
            onset_time: now,
            duration: 0.0,
        }
    }

    /// Copy the configuration into a fresh tracker anchored at `now`.
    pub const fn fresh(&self, now: f64) -> Self {
        Self::new(self.quiescent_volume_fraction, self.equilibrium_volume, now)
    }

    /// Volume below which a cell counts as crowded.
    pub fn threshold(&self) -> f64 {
        self.equilibrium_volume * self.quiescent_volume_fraction
    }

    /// Record one observation of the occupied volume at time `now`.
    pub fn observe(&mut self, occupied_volume: f64, now: f64) -> QuiescenceState {
        if occupied_volume < self.threshold() {
            self.duration = now - self.onset_time;
            QuiescenceState::Quiescent
        } else {
            self.duration = 0.0;
            self.onset_time = now;
            QuiescenceState::Active
        }
    }

    /// Configured quiescent volume fraction.
    pub const fn quiescent_volume_fraction(&self) -> f64 {
        self.quiescent_volume_fraction
    }

    /// Configured equilibrium volume.
    pub const fn equilibrium_volume(&self) -> f64 {
        self.equilibrium_volume
    }

    /// Start of the current quiescent stretch.
    pub const fn onset_time(&self) -> f64 {
        self.onset_time
    }

    /// Length of the current quiescent stretch.
    pub const fn duration(&self) -> f64 {
        self.duration
    }
}
