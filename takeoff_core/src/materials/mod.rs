//! # Materials Database
//!
//! Material property lookups for quantity takeoff. Concrete is measured by
//! volume only, so the reinforcing-bar table is the only database here.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::materials::{unit_weight, grade, SteelGrade};
//!
//! let w = unit_weight(16).unwrap();
//! assert_eq!(w.0, 1.578);
//! assert_eq!(grade(16), SteelGrade::Grade60);
//! ```

pub mod rebar;

pub use rebar::{grade, is_allowed, unit_weight, SteelGrade, ALLOWED_DIAMETERS_MM, GRADE_60_MIN_DIAMETER_MM};
