//! Type-safe identifier wrapper around [`Uuid`].
//!
//! Cells are identified by UUID v7 (time-ordered) so that identifiers sort
//! in creation order, which keeps per-cell iteration stable across reruns.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a cell in the tissue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId(pub Uuid);

impl CellId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for CellId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for CellId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CellId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<CellId> for Uuid {
    fn from(id: CellId) -> Self {
        id.0
    }
}
