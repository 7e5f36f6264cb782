//! Shared type definitions for the crypt proliferation models.
//!
//! This crate is the single source of truth for the small vocabulary shared
//! by the cell-cycle core, the orchestration layer, and the engine binary.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for cell identifiers
//! - [`enums`] -- Cell-cycle phases, proliferative fates, mutation states,
//!   and the catalogue of proliferation model kinds

pub mod enums;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use enums::{CellCyclePhase, ModelKind, MutationState, ProliferativeFate};
pub use ids::CellId;
