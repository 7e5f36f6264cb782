//! Orchestration for crypt proliferation runs.
//!
//! This crate supplies the collaborators the cell-cycle core consumes and
//! drives whole populations of cells with them.
//!
//! # Modules
//!
//! - [`clock`] -- Fixed-step simulation clock implementing the core's
//!   `Clock` trait.
//! - [`config`] -- Configuration loading from `crypt-config.yaml` into
//!   strongly-typed structs.
//! - [`parameters`] -- The restricted name/value environment holding crypt
//!   geometry and timing.
//! - [`population`] -- Column-based crypt population, tissue field and
//!   division log.
//! - [`presets`] -- Per-model cell-cycle presets for the crypt study.
//! - [`random`] -- Seeded, replayable uniform stream.
//! - [`registry`] -- Per-fate population counts.
//! - [`runner`] -- [`run_model`](runner::run_model), the whole-run driver.

pub mod clock;
pub mod config;
pub mod parameters;
pub mod population;
pub mod presets;
pub mod random;
pub mod registry;
pub mod runner;
