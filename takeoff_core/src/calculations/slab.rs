//! # Slab Unit Quantities
//!
//! Steel and concrete per square meter of slab.
//!
//! Each bar layer contributes `unit_weight * (1000 / spacing_mm)` kg/m²
//! per direction it runs in:
//!
//! | Layer         | One-way | Two-way |
//! |---------------|---------|---------|
//! | Main          | 1       | 2       |
//! | Distribution  | 1       | 2       |
//! | Temperature   | 2       | 2       |
//! | Top (optional)| 1       | 2       |
//!
//! Bucket totals are rounded to two decimals.

use serde::{Deserialize, Serialize};

use crate::calculations::SteelWeights;
use crate::errors::{require_non_negative, require_spacing, CalcResult};
use crate::units::{Meters, Millimeters};

/// Slab spanning behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlabType {
    #[default]
    OneWay,
    TwoWay,
}

impl SlabType {
    /// How many directions the main/distribution/top layers run in
    pub fn directions(&self) -> f64 {
        match self {
            SlabType::OneWay => 1.0,
            SlabType::TwoWay => 2.0,
        }
    }
}

/// Slab catalog entry. Thickness and all spacings are in millimeters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlabSpec {
    pub id: String,
    pub thickness: f64,
    #[serde(rename = "type")]
    pub slab_type: SlabType,
    #[serde(default)]
    pub main_bar_size: Option<u32>,
    #[serde(default)]
    pub main_bar_spacing: f64,
    #[serde(default)]
    pub distribution_bar_size: Option<u32>,
    #[serde(default)]
    pub distribution_bar_spacing: f64,
    #[serde(default)]
    pub temperature_bar_size: Option<u32>,
    #[serde(default)]
    pub temperature_bar_spacing: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_bar_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_bar_spacing: Option<f64>,
}

impl SlabSpec {
    /// Validate thickness and the spacing of every layer that has bars.
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("thickness", self.thickness)?;
        require_spacing("main_bar_spacing", self.main_bar_size, self.main_bar_spacing)?;
        require_spacing(
            "distribution_bar_spacing",
            self.distribution_bar_size,
            self.distribution_bar_spacing,
        )?;
        require_spacing(
            "temperature_bar_spacing",
            self.temperature_bar_size,
            self.temperature_bar_spacing,
        )?;
        if let Some(spacing) = self.top_bar_spacing {
            require_spacing("top_bar_spacing", self.top_bar_size, spacing)?;
        }
        Ok(())
    }

    pub fn thickness_m(&self) -> Meters {
        Millimeters(self.thickness).into()
    }

    /// Layers as (diameter, spacing mm, directions)
    fn layers(&self) -> Vec<(Option<u32>, f64, f64)> {
        let directions = self.slab_type.directions();
        let mut layers = vec![
            (self.main_bar_size, self.main_bar_spacing, directions),
            (self.distribution_bar_size, self.distribution_bar_spacing, directions),
            (self.temperature_bar_size, self.temperature_bar_spacing, 2.0),
        ];
        if let (Some(size), Some(spacing)) = (self.top_bar_size, self.top_bar_spacing) {
            layers.push((Some(size), spacing, directions));
        }
        layers
    }
}

/// Bars crossing one meter of slab at `spacing_mm`
fn bars_per_meter(spacing_mm: f64) -> f64 {
    1000.0 / spacing_mm
}

/// Steel per square meter of slab.
pub fn unit_weights(spec: &SlabSpec) -> CalcResult<SteelWeights> {
    spec.validate()?;

    let mut steel = SteelWeights::default();
    for (size, spacing_mm, directions) in spec.layers() {
        if spacing_mm > 0.0 {
            steel.add_bars(size, Meters(bars_per_meter(spacing_mm) * directions));
        }
    }
    Ok(steel.rounded())
}

/// Concrete per square meter of slab (m³/m²), i.e. the thickness in meters.
pub fn unit_volume(spec: &SlabSpec) -> CalcResult<f64> {
    spec.validate()?;
    Ok(spec.thickness_m().value())
}
