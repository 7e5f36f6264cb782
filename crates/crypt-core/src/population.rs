//! A column-based crypt population.
//!
//! The crypt wall is unrolled into `cells_across` vertical columns. Each
//! column is a stack of cells held at a fixed row spacing: a division
//! inserts the daughter directly above its parent and pushes the rest of
//! the column up by one row, and cells pushed past the top of the crypt
//! are sloughed off. This stands in for the tissue-mechanics engine; the
//! cell-cycle models only see the morphogen level and occupied volume the
//! [`TissueField`] reports for each cell.
//!
//! Cells are visited in creation order every step, so a run is a pure
//! function of its seed.

use std::collections::BTreeMap;

use crypt_cycle::{CellContext, Clock, CycleError, CycleModel, PolicyConfig, UniformSource};
use crypt_types::{CellId, MutationState, ProliferativeFate};
use serde::Serialize;
use tracing::debug;

use crate::clock::ClockError;
use crate::parameters::{ParameterEnvironment, ParameterError};
use crate::presets::CryptPreset;
use crate::registry::{ProliferativeRegistry, RegistryError};

/// Heights separating the generation bands of a freshly seeded crypt:
/// stem cells at the base, then transit generations 1 to 3, then
/// generation 4 above the last band.
const GENERATION_BANDS: [f64; 4] = [0.0, 3.0, 6.5, 8.0];

/// Row spacing of a hexagonal packing relative to its column spacing.
const HEX_ROW_RATIO: f64 = 0.866_025_403_784_438_6;

/// Errors that can occur while building or stepping a population.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// A cell-cycle operation failed.
    #[error("cell-cycle error: {source}")]
    Cycle {
        /// The underlying cell-cycle error.
        #[from]
        source: CycleError,
    },

    /// Fate registry bookkeeping failed.
    #[error("registry error: {source}")]
    Registry {
        /// The underlying registry error.
        #[from]
        source: RegistryError,
    },

    /// A crypt parameter could not be read.
    #[error("parameter error: {source}")]
    Parameter {
        /// The underlying parameter error.
        #[from]
        source: ParameterError,
    },

    /// The simulation clock could not be built or advanced.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The crypt parameters describe an impossible geometry.
    #[error("invalid crypt geometry: {reason}")]
    InvalidGeometry {
        /// Explanation of what is wrong.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Geometry and field
// ---------------------------------------------------------------------------

/// Crypt dimensions read from the parameter environment.
#[derive(Debug, Clone, PartialEq)]
pub struct CryptGeometry {
    /// Number of cell columns around the crypt.
    pub cells_across: u32,
    /// Number of cell rows in the seeded crypt.
    pub cells_up: u32,
    /// Crypt circumference.
    pub crypt_width: f64,
    /// Height above which cells are sloughed.
    pub crypt_length: f64,
}

impl CryptGeometry {
    /// Read the geometry from the crypt parameters.
    pub fn from_parameters(env: &ParameterEnvironment) -> Result<Self, PopulationError> {
        let geometry = Self {
            cells_across: count(env, "cells_across")?,
            cells_up: count(env, "cells_up")?,
            crypt_width: env.number("crypt_width")?,
            crypt_length: env.number("crypt_length")?,
        };
        for (name, value) in [
            ("crypt_width", geometry.crypt_width),
            ("crypt_length", geometry.crypt_length),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PopulationError::InvalidGeometry {
                    reason: format!("{name} must be finite and positive, got {value}"),
                });
            }
        }
        Ok(geometry)
    }

    /// Horizontal distance between neighbouring columns.
    pub fn column_spacing(&self) -> f64 {
        self.crypt_width / f64::from(self.cells_across)
    }

    /// Vertical distance between neighbouring rows.
    pub fn row_spacing(&self) -> f64 {
        self.column_spacing() * HEX_ROW_RATIO
    }
}

/// Read a positive whole-number parameter.
pub(crate) fn count(env: &ParameterEnvironment, name: &str) -> Result<u32, PopulationError> {
    let value = env.number(name)?;
    if !(value >= 1.0 && value <= f64::from(u32::MAX) && value.fract().abs() < f64::EPSILON) {
        return Err(PopulationError::InvalidGeometry {
            reason: format!("{name} must be a positive whole number, got {value}"),
        });
    }
    // Range and integrality checked above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(value as u32)
}

/// The spatial signals cell-cycle models read.
pub trait TissueField {
    /// Morphogen level at `height` above the crypt base.
    fn signal_level(&self, height: f64) -> f64;

    /// Volume occupied by a cell in a column currently holding
    /// `column_cells` cells.
    fn occupied_volume(&self, column_cells: u32) -> f64;
}

/// Morphogen falling linearly from 1 at the base to 0 at the crypt top,
/// with cell volume shrinking once a column holds more than its seeded
/// row count.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearCrypt {
    crypt_length: f64,
    reference_volume: f64,
    column_capacity: u32,
}

impl LinearCrypt {
    /// Build the field for `geometry`, with uncrowded cells occupying
    /// `reference_volume`.
    pub const fn new(geometry: &CryptGeometry, reference_volume: f64) -> Self {
        Self {
            crypt_length: geometry.crypt_length,
            reference_volume,
            column_capacity: geometry.cells_up,
        }
    }
}

impl TissueField for LinearCrypt {
    fn signal_level(&self, height: f64) -> f64 {
        (1.0 - height / self.crypt_length).clamp(0.0, 1.0)
    }

    fn occupied_volume(&self, column_cells: u32) -> f64 {
        if column_cells <= self.column_capacity {
            self.reference_volume
        } else {
            self.reference_volume * f64::from(self.column_capacity) / f64::from(column_cells)
        }
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// One cell of the population, as seen by its cell-cycle model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellRecord {
    /// Cell identifier.
    pub id: CellId,
    /// Proliferative fate.
    pub fate: ProliferativeFate,
    /// Mutation carried by the cell.
    pub mutation: MutationState,
    /// Column index around the crypt.
    pub column: u32,
    /// Height above the crypt base.
    pub height: f64,
    /// Occupied volume from the last field refresh.
    pub volume: f64,
    /// Morphogen level from the last field refresh.
    pub signal: f64,
    /// Whether the cell is currently marked as contact inhibited.
    pub labelled: bool,
}

impl CellContext for CellRecord {
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

/// A cell paired with the model that drives its cycle.
#[derive(Debug, Clone)]
pub struct Member {
    /// The cell.
    pub cell: CellRecord,
    /// Its cell-cycle model.
    pub model: CycleModel,
}

/// One division event: time, position and the parent's age at division.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DivisionRecord {
    /// Simulation time of the division.
    pub time: f64,
    /// Horizontal position of the parent.
    pub x: f64,
    /// Height of the parent.
    pub y: f64,
    /// Age of the parent when it divided.
    pub parent_age: f64,
}

/// What happened during one population step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Divisions during the step.
    pub divisions: u32,
    /// Cells sloughed off the crypt top.
    pub sloughed: u32,
}

// ---------------------------------------------------------------------------
// Population
// ---------------------------------------------------------------------------

/// The cells of one crypt run plus their fate registry and division log.
#[derive(Debug, Clone)]
pub struct Population {
    geometry: CryptGeometry,
    members: Vec<Member>,
    registry: ProliferativeRegistry,
    divisions: Vec<DivisionRecord>,
    sloughed: u64,
}

impl Population {
    /// Seed a crypt of `cells_across` by `cells_up` cells for `preset`.
    ///
    /// Generation-based models get stem cells on the base row and transit
    /// generations banded by height; morphogen models start every cell as
    /// transit and let the field decide. Birth times are staggered by up to
    /// one typical cycle before `start_time` so the crypt starts
    /// asynchronous.
    pub fn seed(
        preset: &CryptPreset,
        geometry: CryptGeometry,
        field: &dyn TissueField,
        start_time: f64,
        rng: &mut impl UniformSource,
    ) -> Result<Self, PopulationError> {
        let mut population = Self {
            members: Vec::new(),
            registry: ProliferativeRegistry::standard(),
            divisions: Vec::new(),
            sloughed: 0,
            geometry,
        };
        let column_spacing = population.geometry.column_spacing();
        let row_spacing = population.geometry.row_spacing();
        let rows = population.geometry.cells_up;

        for column in 0..population.geometry.cells_across {
            for row in 0..rows {
                let height = f64::from(row) * row_spacing;
                let (fate, generation) = if preset.uses_generations() {
                    banded_generation(height, preset)
                } else {
                    (ProliferativeFate::Transit, None)
                };

                let typical_g1 = if fate == ProliferativeFate::Stem {
                    preset.params.stem_g1_mean
                } else {
                    preset.params.transit_g1_mean
                };
                let typical_cycle = typical_g1 + preset.params.fixed_phase_total();
                let birth_time = start_time - rng.next_uniform01() * typical_cycle;

                let mut cell = CellRecord {
                    id: CellId::new(),
                    fate,
                    mutation: MutationState::WildType,
                    column,
                    height,
                    volume: field.occupied_volume(rows),
                    signal: field.signal_level(height),
                    labelled: false,
                };
                let mut model = CycleModel::new(preset.params.clone(), &preset.policy, birth_time)?;
                if let Some(generation) = generation {
                    model.set_generation(generation)?;
                } else {
                    model.set_dimension(2)?;
                }
                population.registry.add_cell(fate)?;
                model.sample(&mut cell, rng, &mut population.registry)?;
                population.members.push(Member { cell, model });
            }
        }

        debug!(
            model = %preset.kind,
            cells = population.members.len(),
            column_spacing,
            row_spacing,
            "Crypt seeded"
        );
        Ok(population)
    }

    /// Advance every cell by one timestep.
    ///
    /// Refreshes each cell's signals from `field`, then asks each model in
    /// creation order whether its cell divides. Daughters are placed one
    /// row above their parents, the column above is pushed up, and cells
    /// past the crypt top are removed.
    pub fn step(
        &mut self,
        clock: &dyn Clock,
        field: &dyn TissueField,
        rng: &mut impl UniformSource,
    ) -> Result<StepReport, PopulationError> {
        self.refresh(field);

        let now = clock.now();
        let row_spacing = self.geometry.row_spacing();
        let column_spacing = self.geometry.column_spacing();
        let mut born = Vec::new();

        for member in &mut self.members {
            if !member
                .model
                .ready_to_divide(&mut member.cell, clock, &mut self.registry)?
            {
                continue;
            }
            let parent_age = member.model.age(now);
            member
                .model
                .reset_for_division(&mut member.cell, clock, rng, &mut self.registry)?;

            let height = member.cell.height + row_spacing;
            let mut daughter = CellRecord {
                id: CellId::new(),
                height,
                signal: field.signal_level(height),
                labelled: false,
                ..member.cell.clone()
            };
            self.registry.add_cell(daughter.fate)?;
            let mut model = member.model.clone_model();
            model.initialise_daughter(&mut daughter, rng, &mut self.registry)?;

            self.divisions.push(DivisionRecord {
                time: now,
                x: f64::from(member.cell.column) * column_spacing,
                y: member.cell.height,
                parent_age,
            });
            let parent_height = member.cell.height;
            born.push((parent_height, Member { cell: daughter, model }));
        }

        let divisions = u32::try_from(born.len()).unwrap_or(u32::MAX);
        for (parent_height, daughter) in born {
            self.push_column(daughter.cell.column, parent_height, row_spacing);
            self.members.push(daughter);
        }
        let sloughed = self.slough()?;

        debug!(time = now, divisions, sloughed, cells = self.members.len(), "Population stepped");
        Ok(StepReport {
            divisions,
            sloughed,
        })
    }

    fn refresh(&mut self, field: &dyn TissueField) {
        let mut columns: BTreeMap<u32, u32> = BTreeMap::new();
        for member in &self.members {
            let n = columns.entry(member.cell.column).or_insert(0);
            *n = n.saturating_add(1);
        }
        for member in &mut self.members {
            let column_cells = columns.get(&member.cell.column).copied().unwrap_or(0);
            member.cell.volume = field.occupied_volume(column_cells);
            member.cell.signal = field.signal_level(member.cell.height);
        }
    }

    fn push_column(&mut self, column: u32, above: f64, row_spacing: f64) {
        for member in &mut self.members {
            if member.cell.column == column && member.cell.height > above {
                member.cell.height += row_spacing;
            }
        }
    }

    fn slough(&mut self) -> Result<u32, PopulationError> {
        let crypt_length = self.geometry.crypt_length;
        let (kept, gone): (Vec<_>, Vec<_>) = std::mem::take(&mut self.members)
            .into_iter()
            .partition(|member| member.cell.height <= crypt_length);
        self.members = kept;
        for member in &gone {
            self.registry.remove_cell(member.cell.id, member.cell.fate)?;
        }
        let sloughed = u32::try_from(gone.len()).unwrap_or(u32::MAX);
        self.sloughed = self.sloughed.saturating_add(u64::from(sloughed));
        Ok(sloughed)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Cells in creation order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Number of living cells.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the crypt has no cells left.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Per-fate counts.
    pub const fn registry(&self) -> &ProliferativeRegistry {
        &self.registry
    }

    /// Every division so far, in order.
    pub fn divisions(&self) -> &[DivisionRecord] {
        &self.divisions
    }

    /// The division log as rows of `[time, x, y, parent_age]`.
    pub fn division_table(&self) -> Vec<[f64; 4]> {
        self.divisions
            .iter()
            .map(|d| [d.time, d.x, d.y, d.parent_age])
            .collect()
    }

    /// Total cells sloughed so far.
    pub const fn sloughed(&self) -> u64 {
        self.sloughed
    }

    /// Crypt dimensions.
    pub const fn geometry(&self) -> &CryptGeometry {
        &self.geometry
    }

    /// Cells currently marked as contact inhibited.
    pub fn labelled(&self) -> usize {
        self.members.iter().filter(|m| m.cell.labelled).count()
    }
}

/// Fate and generation for a cell seeded at `height`.
fn banded_generation(height: f64, preset: &CryptPreset) -> (ProliferativeFate, Option<u32>) {
    let [stem_top, first, second, third] = GENERATION_BANDS;
    if height <= stem_top {
        return (ProliferativeFate::Stem, Some(0));
    }
    let generation = if height < first {
        1
    } else if height < second {
        2
    } else if height < third {
        3
    } else {
        4
    };
    let max = match preset.policy {
        PolicyConfig::Baseline {
            max_transit_generations,
        }
        | PolicyConfig::StochasticGeneration {
            max_transit_generations,
        }
        | PolicyConfig::ContactInhibition {
            max_transit_generations,
            ..
        } => max_transit_generations,
        PolicyConfig::UniformWidth { .. }
        | PolicyConfig::MorphogenVariable { .. } => u32::MAX,
    };
    if generation > max {
        (ProliferativeFate::Differentiated, Some(generation))
    } else {
        (ProliferativeFate::Transit, Some(generation))
    }
}
