//! # takeoff_core - Reinforced Concrete Quantity Takeoff Engine
//!
//! `takeoff_core` turns a building description (floors, grid lines, member
//! catalogs and their placement on the grid) into concrete volume and
//! reinforcing steel weight, split by steel grade. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: the engine reads a `Building` and returns a new summary
//! - **JSON-First**: every record implements Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use takeoff_core::building::{Building, Floor};
//! use takeoff_core::calculations::ColumnSpec;
//! use takeoff_core::grid::GridSystem;
//! use takeoff_core::compute_building_summary;
//!
//! let mut floor = Floor::new("GF", 0, "Ground", GridSystem::uniform(2, 2, 4.0, 5.0));
//! floor.specs.columns.push(ColumnSpec {
//!     id: "C1".to_string(),
//!     width: 0.4,
//!     depth: 0.4,
//!     height: 3.0,
//!     ..ColumnSpec::default()
//! });
//! floor.assign_column(0, 0, "C1").unwrap();
//!
//! let mut building = Building::new("Demo");
//! building.add_floor(floor);
//!
//! let summary = compute_building_summary(&building).unwrap();
//! assert!((summary.totals.concrete_volume_m3 - 0.48).abs() < 1e-9);
//! ```
//!
//! ## Modules
//!
//! - [`building`] - Building, floors, spec catalogs and assignments
//! - [`grid`] - Grid lines, slot indexing and area resolution
//! - [`calculations`] - Per-unit steel and concrete for each member kind
//! - [`summary`] - Floor and building aggregation
//! - [`advisory`] - Non-fatal design checks and floor consistency reports
//! - [`materials`] - Reinforcing bar table and grade rule
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - File operations with atomic saves and locking

pub mod advisory;
pub mod building;
pub mod calculations;
pub mod errors;
pub mod file_io;
pub mod grid;
pub mod materials;
pub mod summary;
pub mod units;

pub use building::{Building, Floor};
pub use calculations::{unit_quantities, MemberSpec};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_building, save_building, FileLock};
pub use grid::{calculate_grid_area, validate_grid_system, GridLine, GridSystem};
pub use summary::{build_floor_summary, compute_building_summary, BuildingSummary, FloorSummary};
