//! Interfaces to the collaborators the cell-cycle core consumes.
//!
//! The core never reaches for process-wide singletons. The simulation
//! clock, the shared random stream, the owning cell and the fate registry
//! are all passed in explicitly by the outer engine, which keeps every
//! operation hermetic and every rerun under a fixed seed bit-identical.

use crypt_types::{CellId, MutationState, ProliferativeFate};

use crate::error::CycleError;

/// Read access to the shared simulation clock.
pub trait Clock {
    /// Current simulation time, in hours.
    fn now(&self) -> f64;

    /// Width of one simulation timestep, in hours.
    fn timestep(&self) -> f64;
}

/// The shared deterministic random stream.
///
/// Every call consumes exactly one draw. Callers must invoke policies in a
/// stable per-cell order for reruns to reproduce the same draws.
pub trait UniformSource {
    /// Draw a uniform deviate from `[0, 1)`.
    fn next_uniform01(&mut self) -> f64;
}

/// Non-owning handle onto the cell that owns a cell-cycle model.
///
/// The mechanical and morphogen signals are supplied on demand by the
/// spatial collaborators behind this handle.
pub trait CellContext {
    /// Identifier of the owning cell.
    fn cell_id(&self) -> CellId;

    /// Current proliferative fate of the cell.
    fn fate(&self) -> ProliferativeFate;

    /// Replace the cell's fate. Only called after the fate registry has
    /// accepted the reclassification.
    fn set_fate(&mut self, fate: ProliferativeFate);

    /// Mutation carried by the cell.
    fn mutation(&self) -> MutationState;

    /// Volume currently occupied by the cell.
    fn occupied_volume(&self) -> f64;

    /// Morphogen level at the cell's location.
    fn signal_level(&self) -> f64;

    /// Attach or remove the "labelled" marker used to visualise contact
    /// inhibited cells.
    fn set_labelled(&mut self, labelled: bool);
}

/// The externally owned registry of proliferative fates.
///
/// The registry tracks population counts per fate for outer observers. The
/// core only ever looks entries up; it never creates a registry, so an
/// implementation must fail rather than lazily register a missing fate.
pub trait FateRegistry {
    /// Move one cell from `from` to `to`, updating population counts.
    fn reclassify(
        &mut self,
        cell_id: CellId,
        from: ProliferativeFate,
        to: ProliferativeFate,
    ) -> Result<(), CycleError>;
}
