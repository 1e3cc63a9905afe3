//! # Building Data Structures
//!
//! The `Building` struct is the root container handed to the takeoff engine.
//! Buildings serialize to `.qto` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Building
//! ├── meta: BuildingMetadata (schema version, timestamps)
//! ├── id, name
//! └── floors: Vec<Floor>
//!     ├── grid: GridSystem (rows, cols)
//!     ├── specs: SpecCatalog (beams, columns, slabs, footings)
//!     └── assignments: Assignments (flat slot arrays + slab/footing lists)
//! ```
//!
//! The engine only reads these records. The editing helpers on [`Floor`]
//! exist for callers that assemble a floor (the CLI, tests, an editor).
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::building::{Building, Floor};
//! use takeoff_core::grid::GridSystem;
//!
//! let mut building = Building::new("Warehouse");
//! let mut floor = Floor::new("GF", 0, "Ground Floor", GridSystem::uniform(3, 4, 4.0, 5.0));
//! floor.assign_column(0, 0, "C1").unwrap();
//! building.add_floor(floor);
//!
//! let json = serde_json::to_string_pretty(&building).unwrap();
//! assert!(json.contains("Ground Floor"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{BeamSpec, ColumnSpec, FootingSpec, MemberSpec, SlabSpec};
use crate::errors::{CalcError, CalcResult};
use crate::grid::GridSystem;

/// Current schema version for .qto files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root building container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// File metadata (schema version, timestamps)
    #[serde(default)]
    pub meta: BuildingMetadata,

    pub id: String,

    pub name: String,

    /// Floors in display order; each is aggregated independently
    #[serde(default)]
    pub floors: Vec<Floor>,
}

impl Building {
    /// Create a new building with no floors and a fresh UUID.
    pub fn new(name: impl Into<String>) -> Self {
        Building {
            meta: BuildingMetadata::default(),
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            floors: Vec::new(),
        }
    }

    /// Append a floor.
    pub fn add_floor(&mut self, floor: Floor) {
        self.floors.push(floor);
        self.touch();
    }

    pub fn floor(&self, id: &str) -> Option<&Floor> {
        self.floors.iter().find(|f| f.id == id)
    }

    /// Get a mutable floor by id. Marks the building as modified when found.
    pub fn floor_mut(&mut self, id: &str) -> Option<&mut Floor> {
        let index = self.floors.iter().position(|f| f.id == id)?;
        self.touch();
        self.floors.get_mut(index)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

/// Metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

impl Default for BuildingMetadata {
    fn default() -> Self {
        let now = Utc::now();
        BuildingMetadata {
            version: SCHEMA_VERSION.to_string(),
            created: now,
            modified: now,
        }
    }
}

/// Reusable member specifications available on one floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecCatalog {
    #[serde(default)]
    pub beams: Vec<BeamSpec>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub slabs: Vec<SlabSpec>,
    #[serde(default)]
    pub footings: Vec<FootingSpec>,
}

impl SpecCatalog {
    // First entry wins when a catalog holds duplicate ids.
    pub fn beam(&self, id: &str) -> Option<&BeamSpec> {
        self.beams.iter().find(|s| s.id == id)
    }

    pub fn column(&self, id: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|s| s.id == id)
    }

    pub fn slab(&self, id: &str) -> Option<&SlabSpec> {
        self.slabs.iter().find(|s| s.id == id)
    }

    pub fn footing(&self, id: &str) -> Option<&FootingSpec> {
        self.footings.iter().find(|s| s.id == id)
    }

    /// Every spec wrapped as [`MemberSpec`], in catalog order.
    pub fn all(&self) -> Vec<MemberSpec> {
        self.beams
            .iter()
            .cloned()
            .map(MemberSpec::from)
            .chain(self.columns.iter().cloned().map(MemberSpec::from))
            .chain(self.slabs.iter().cloned().map(MemberSpec::from))
            .chain(self.footings.iter().cloned().map(MemberSpec::from))
            .collect()
    }
}

/// A slab spec placed over a rectangular range of grid cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabAssignment {
    pub id: String,
    pub slab_spec_id: String,
    pub start_row: String,
    pub end_row: String,
    pub start_col: String,
    pub end_col: String,
    /// Plan area in m², resolved when the assignment was made
    pub area: f64,
}

impl SlabAssignment {
    /// Range label such as "A1-B3"
    pub fn label(&self) -> String {
        format!("{}{}-{}{}", self.start_row, self.start_col, self.end_row, self.end_col)
    }
}

/// A footing spec placed at a grid intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootingAssignment {
    pub footing_spec_id: String,
    /// Row label followed by column label, e.g. "B2"
    pub grid_position: String,
}

/// Where each spec is used on a floor.
///
/// The three id arrays are flat slot arrays indexed by the formulas on
/// [`GridSystem`]; an empty string marks an unassigned slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignments {
    /// X-direction beams, length `num_rows * (num_cols - 1)`
    #[serde(default)]
    pub col_beam_ids: Vec<String>,
    /// Y-direction beams, length `num_cols * (num_rows - 1)`
    #[serde(default)]
    pub row_beam_ids: Vec<String>,
    /// Columns, length `num_rows * num_cols`
    #[serde(default)]
    pub column_ids: Vec<String>,
    #[serde(default)]
    pub slabs: Vec<SlabAssignment>,
    #[serde(default)]
    pub footings: Vec<FootingAssignment>,
}

impl Assignments {
    /// Empty assignment arrays sized for `grid`.
    pub fn sized_for(grid: &GridSystem) -> Self {
        Assignments {
            col_beam_ids: vec![String::new(); grid.col_beam_slots()],
            row_beam_ids: vec![String::new(); grid.row_beam_slots()],
            column_ids: vec![String::new(); grid.column_slots()],
            slabs: Vec::new(),
            footings: Vec::new(),
        }
    }
}

/// Assigned id in a flat slot array; `None` for empty or missing slots.
pub fn slot_id(ids: &[String], slot: usize) -> Option<&str> {
    ids.get(slot).map(String::as_str).filter(|id| !id.is_empty())
}

/// One storey of the building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: String,
    pub level: i32,
    pub name: String,
    pub grid: GridSystem,
    #[serde(default)]
    pub specs: SpecCatalog,
    #[serde(default)]
    pub assignments: Assignments,
}

impl Floor {
    /// Create a floor with empty catalogs and assignment arrays sized for `grid`.
    pub fn new(id: impl Into<String>, level: i32, name: impl Into<String>, grid: GridSystem) -> Self {
        let assignments = Assignments::sized_for(&grid);
        Floor {
            id: id.into(),
            level,
            name: name.into(),
            grid,
            specs: SpecCatalog::default(),
            assignments,
        }
    }

    /// Look up a spec of any kind by id.
    pub fn find_spec(&self, id: &str) -> CalcResult<MemberSpec> {
        self.specs
            .beam(id)
            .cloned()
            .map(MemberSpec::from)
            .or_else(|| self.specs.column(id).cloned().map(MemberSpec::from))
            .or_else(|| self.specs.slab(id).cloned().map(MemberSpec::from))
            .or_else(|| self.specs.footing(id).cloned().map(MemberSpec::from))
            .ok_or_else(|| CalcError::spec_not_found("Member", id))
    }

    /// Assign a beam to the X-direction span on `row` between columns `col_gap` and `col_gap + 1`.
    pub fn assign_col_beam(&mut self, row: usize, col_gap: usize, beam_id: impl Into<String>) -> CalcResult<()> {
        if row >= self.grid.num_rows() || col_gap >= self.grid.num_cols().saturating_sub(1) {
            return Err(CalcError::invalid_input(
                "col_beam_slot",
                format!("row {row}, gap {col_gap}"),
                "Beam span is outside the grid",
            ));
        }
        let slot = self.grid.col_beam_index(row, col_gap);
        write_slot(&mut self.assignments.col_beam_ids, slot, self.grid.col_beam_slots(), beam_id.into());
        Ok(())
    }

    /// Assign a beam to the Y-direction span on `col` between rows `row_gap` and `row_gap + 1`.
    pub fn assign_row_beam(&mut self, col: usize, row_gap: usize, beam_id: impl Into<String>) -> CalcResult<()> {
        if col >= self.grid.num_cols() || row_gap >= self.grid.num_rows().saturating_sub(1) {
            return Err(CalcError::invalid_input(
                "row_beam_slot",
                format!("col {col}, gap {row_gap}"),
                "Beam span is outside the grid",
            ));
        }
        let slot = self.grid.row_beam_index(col, row_gap);
        write_slot(&mut self.assignments.row_beam_ids, slot, self.grid.row_beam_slots(), beam_id.into());
        Ok(())
    }

    /// Assign a column to the intersection of `row` and `col`.
    pub fn assign_column(&mut self, row: usize, col: usize, column_id: impl Into<String>) -> CalcResult<()> {
        if row >= self.grid.num_rows() || col >= self.grid.num_cols() {
            return Err(CalcError::invalid_input(
                "column_slot",
                format!("row {row}, col {col}"),
                "Intersection is outside the grid",
            ));
        }
        let slot = self.grid.column_index(row, col);
        write_slot(&mut self.assignments.column_ids, slot, self.grid.column_slots(), column_id.into());
        Ok(())
    }

    /// Place a slab over a grid range, resolving its area now.
    ///
    /// # Example
    ///
    /// ```rust
    /// use takeoff_core::building::Floor;
    /// use takeoff_core::grid::GridSystem;
    ///
    /// let mut floor = Floor::new("L1", 1, "Level 1", GridSystem::uniform(3, 3, 4.0, 5.0));
    /// let slab = floor.add_slab("SA-1", "S1", "A", "C", "1", "3").unwrap();
    /// assert_eq!(slab.area, 80.0);
    ///
    /// assert!(floor.add_slab("SA-2", "S1", "C", "A", "1", "1").is_err());
    /// ```
    pub fn add_slab(
        &mut self,
        id: impl Into<String>,
        slab_spec_id: impl Into<String>,
        start_row: &str,
        end_row: &str,
        start_col: &str,
        end_col: &str,
    ) -> CalcResult<&SlabAssignment> {
        let result = self.grid.area(start_row, end_row, start_col, end_col);
        if !result.is_valid {
            return Err(CalcError::invalid_geometry(
                result.error.unwrap_or_else(|| "area could not be resolved".to_string()),
            ));
        }
        let index = self.assignments.slabs.len();
        self.assignments.slabs.push(SlabAssignment {
            id: id.into(),
            slab_spec_id: slab_spec_id.into(),
            start_row: start_row.to_string(),
            end_row: end_row.to_string(),
            start_col: start_col.to_string(),
            end_col: end_col.to_string(),
            area: result.area,
        });
        Ok(&self.assignments.slabs[index])
    }

    /// Place a footing at the intersection of two grid labels.
    pub fn add_footing(&mut self, footing_spec_id: impl Into<String>, row_label: &str, col_label: &str) -> CalcResult<()> {
        if self.grid.row_index(row_label).is_none() || self.grid.col_index(col_label).is_none() {
            return Err(CalcError::invalid_input(
                "grid_position",
                format!("{row_label}{col_label}"),
                "Footing position is not a grid intersection",
            ));
        }
        self.assignments.footings.push(FootingAssignment {
            footing_spec_id: footing_spec_id.into(),
            grid_position: format!("{row_label}{col_label}"),
        });
        Ok(())
    }
}

/// Write `id` into `slot`, first growing a short array to `expected_len`.
fn write_slot(ids: &mut Vec<String>, slot: usize, expected_len: usize, id: String) {
    if ids.len() < expected_len {
        ids.resize(expected_len, String::new());
    }
    ids[slot] = id;
}
