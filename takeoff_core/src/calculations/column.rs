//! # Column Unit Quantities
//!
//! Steel and concrete for one column of a given specification.
//!
//! - Main bars: `qty` bars running the full column height.
//! - Ties: `ceil(height / tie_spacing)` closed ties of perimeter
//!   `2 * (width + depth)`.
//! - Concrete: `width * depth * height`.

use serde::{Deserialize, Serialize};

use crate::calculations::SteelWeights;
use crate::errors::{require_non_negative, require_spacing, CalcResult};
use crate::units::Meters;

/// Column catalog entry. Dimensions and tie spacing are in meters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub id: String,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    #[serde(default)]
    pub main_bar_size: Option<u32>,
    #[serde(default)]
    pub main_bar_qty: u32,
    #[serde(default)]
    pub tie_size: Option<u32>,
    /// Center-to-center tie spacing in meters
    #[serde(default)]
    pub tie_spacing: f64,
}

impl ColumnSpec {
    /// Validate dimensions and tie spacing.
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("width", self.width)?;
        require_non_negative("depth", self.depth)?;
        require_non_negative("height", self.height)?;
        require_spacing("tie_spacing", self.tie_size, self.tie_spacing)?;
        Ok(())
    }

    /// Number of ties over the column height.
    ///
    /// Zero when there are no ties; callers must have validated the spacing.
    pub fn number_of_ties(&self) -> u32 {
        match self.tie_size {
            Some(size) if size > 0 && self.tie_spacing > 0.0 => (self.height / self.tie_spacing).ceil() as u32,
            _ => 0,
        }
    }

    pub fn tie_perimeter(&self) -> Meters {
        Meters(2.0 * (self.width + self.depth))
    }
}

/// Steel for one column.
pub fn unit_weights(spec: &ColumnSpec) -> CalcResult<SteelWeights> {
    spec.validate()?;

    let mut steel = SteelWeights::default();
    steel.add_bars(spec.main_bar_size, Meters(spec.height) * f64::from(spec.main_bar_qty));
    steel.add_bars(spec.tie_size, spec.tie_perimeter() * f64::from(spec.number_of_ties()));
    Ok(steel)
}

/// Concrete for one column (m³).
pub fn unit_volume(spec: &ColumnSpec) -> CalcResult<f64> {
    spec.validate()?;
    Ok((Meters(spec.width) * Meters(spec.depth) * Meters(spec.height)).value())
}
