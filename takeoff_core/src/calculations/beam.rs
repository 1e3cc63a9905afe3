//! # Beam Unit Quantities
//!
//! Steel and concrete per linear meter of a reinforced concrete beam.
//!
//! ## Method
//!
//! - Longitudinal bars (top, web, bottom): each bar runs the full length, so
//!   one meter of beam carries `qty` meters of that bar.
//! - Stirrups: closed loops of perimeter `2 * (width + depth)`; `stirrup_qty`
//!   is a rate (stirrups per meter of beam).
//! - Concrete: `width * depth` m³ per meter.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::calculations::beam::{BeamSpec, unit_weights};
//!
//! let spec = BeamSpec {
//!     id: "B1".to_string(),
//!     width: 0.3,
//!     depth: 0.5,
//!     top_bar_size: Some(16),
//!     top_bar_qty: 2,
//!     bottom_bar_size: Some(20),
//!     bottom_bar_qty: 3,
//!     stirrup_size: Some(10),
//!     stirrup_qty: 7,
//!     ..BeamSpec::default()
//! };
//!
//! let per_meter = unit_weights(&spec).unwrap();
//! assert!(per_meter.grade60_kg > 0.0);
//! assert!(per_meter.grade40_kg > 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::SteelWeights;
use crate::errors::{require_non_negative, CalcResult};
use crate::units::Meters;

/// Beam catalog entry.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "B1",
///   "width": 0.3,
///   "depth": 0.5,
///   "top_bar_size": 16,
///   "top_bar_qty": 2,
///   "web_bar_size": null,
///   "bottom_bar_size": 20,
///   "bottom_bar_qty": 3,
///   "stirrup_size": 10,
///   "stirrup_qty": 7
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeamSpec {
    pub id: String,

    /// Section width in meters
    pub width: f64,

    /// Section depth in meters
    pub depth: f64,

    /// Top bar diameter (mm); `None` means no top bars
    #[serde(default)]
    pub top_bar_size: Option<u32>,
    #[serde(default)]
    pub top_bar_qty: u32,

    /// Web (side face) bar diameter (mm)
    #[serde(default)]
    pub web_bar_size: Option<u32>,
    #[serde(default)]
    pub web_bar_qty: u32,

    /// Bottom bar diameter (mm)
    #[serde(default)]
    pub bottom_bar_size: Option<u32>,
    #[serde(default)]
    pub bottom_bar_qty: u32,

    /// Stirrup diameter (mm)
    #[serde(default)]
    pub stirrup_size: Option<u32>,
    /// Stirrups per meter of beam
    #[serde(default)]
    pub stirrup_qty: u32,
}

impl BeamSpec {
    /// Validate dimensions.
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("width", self.width)?;
        require_non_negative("depth", self.depth)?;
        Ok(())
    }

    /// Closed stirrup perimeter `2 * (width + depth)`
    pub fn stirrup_perimeter(&self) -> Meters {
        Meters(2.0 * (self.width + self.depth))
    }

    /// Longitudinal bar groups as (diameter, count)
    pub fn longitudinal_bars(&self) -> [(Option<u32>, u32); 3] {
        [
            (self.top_bar_size, self.top_bar_qty),
            (self.web_bar_size, self.web_bar_qty),
            (self.bottom_bar_size, self.bottom_bar_qty),
        ]
    }
}

/// Steel per linear meter of beam.
pub fn unit_weights(spec: &BeamSpec) -> CalcResult<SteelWeights> {
    spec.validate()?;

    let mut steel = SteelWeights::default();
    for (size, qty) in spec.longitudinal_bars() {
        if qty > 0 {
            steel.add_bars(size, Meters(f64::from(qty)));
        }
    }

    if spec.stirrup_qty > 0 {
        steel.add_bars(spec.stirrup_size, spec.stirrup_perimeter() * f64::from(spec.stirrup_qty));
    }

    Ok(steel)
}

/// Concrete per linear meter of beam (m³/m).
pub fn unit_volume(spec: &BeamSpec) -> CalcResult<f64> {
    spec.validate()?;
    Ok(spec.width * spec.depth)
}
