//! # Footing Unit Quantities
//!
//! Steel and concrete for one footing.
//!
//! ## Method
//!
//! Mat layers (main, distribution, optional top) run in both plan directions:
//!
//! ```text
//! bars along X = ceil(length / spacing), each `width` long
//! bars along Y = ceil(width / spacing),  each `length` long
//! ```
//!
//! Stirrups wrap the footprint (perimeter `2 * (width + length)`) and are
//! stacked `ceil(depth / stirrup_spacing)` high. Concrete is
//! `width * length * depth`.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::calculations::footing::{FootingSpec, unit_weights};
//!
//! let spec = FootingSpec {
//!     id: "F1".to_string(),
//!     width: 2.0,
//!     length: 3.0,
//!     depth: 1.5,
//!     main_bar_size: Some(16),
//!     main_bar_spacing: 150.0,
//!     distribution_bar_size: Some(12),
//!     distribution_bar_spacing: 200.0,
//!     stirrup_size: Some(10),
//!     stirrup_spacing: 0.15,
//!     ..FootingSpec::default()
//! };
//!
//! let steel = unit_weights(&spec).unwrap();
//! assert!((steel.grade60_kg - 129.4).abs() < 0.1);
//! assert!((steel.grade40_kg - 114.98).abs() < 0.1);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::SteelWeights;
use crate::errors::{require_non_negative, require_spacing, CalcResult};
use crate::units::{Meters, Millimeters};

/// Footing arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FootingType {
    #[default]
    Isolated,
    Combined,
    Strip,
    Raft,
}

/// Footing catalog entry.
///
/// Plan dimensions, depth and stirrup spacing are in meters; mat bar
/// spacings are in millimeters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FootingSpec {
    pub id: String,
    #[serde(rename = "type", default)]
    pub footing_type: FootingType,
    pub width: f64,
    pub length: f64,
    pub depth: f64,
    #[serde(default)]
    pub main_bar_size: Option<u32>,
    #[serde(default)]
    pub main_bar_spacing: f64,
    #[serde(default)]
    pub distribution_bar_size: Option<u32>,
    #[serde(default)]
    pub distribution_bar_spacing: f64,
    #[serde(default)]
    pub stirrup_size: Option<u32>,
    /// Vertical stirrup spacing in meters
    #[serde(default)]
    pub stirrup_spacing: f64,
    #[serde(default)]
    pub top_bars_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_bar_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_bar_spacing: Option<f64>,
}

impl FootingSpec {
    /// Validate dimensions and the spacing of every layer that has bars.
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("width", self.width)?;
        require_non_negative("length", self.length)?;
        require_non_negative("depth", self.depth)?;
        require_spacing("main_bar_spacing", self.main_bar_size, self.main_bar_spacing)?;
        require_spacing(
            "distribution_bar_spacing",
            self.distribution_bar_size,
            self.distribution_bar_spacing,
        )?;
        require_spacing("stirrup_spacing", self.stirrup_size, self.stirrup_spacing)?;
        if self.top_bars_required {
            if let Some(spacing) = self.top_bar_spacing {
                require_spacing("top_bar_spacing", self.top_bar_size, spacing)?;
            }
        }
        Ok(())
    }

    /// Total bar length of a two-direction mat at `spacing_mm`.
    pub fn mat_bar_length(&self, spacing_mm: f64) -> Meters {
        if spacing_mm <= 0.0 {
            return Meters(0.0);
        }
        let spacing = Meters::from(Millimeters(spacing_mm)).value();
        let along_x = (self.length / spacing).ceil() * self.width;
        let along_y = (self.width / spacing).ceil() * self.length;
        Meters(along_x + along_y)
    }

    pub fn stirrup_perimeter(&self) -> Meters {
        Meters(2.0 * (self.width + self.length))
    }

    pub fn number_of_stirrups(&self) -> u32 {
        match self.stirrup_size {
            Some(size) if size > 0 && self.stirrup_spacing > 0.0 => (self.depth / self.stirrup_spacing).ceil() as u32,
            _ => 0,
        }
    }
}

/// Steel for one footing.
pub fn unit_weights(spec: &FootingSpec) -> CalcResult<SteelWeights> {
    spec.validate()?;

    let mut steel = SteelWeights::default();
    steel.add_bars(spec.main_bar_size, spec.mat_bar_length(spec.main_bar_spacing));
    steel.add_bars(
        spec.distribution_bar_size,
        spec.mat_bar_length(spec.distribution_bar_spacing),
    );
    steel.add_bars(
        spec.stirrup_size,
        spec.stirrup_perimeter() * f64::from(spec.number_of_stirrups()),
    );

    if spec.top_bars_required {
        if let (Some(size), Some(spacing)) = (spec.top_bar_size, spec.top_bar_spacing) {
            steel.add_bars(Some(size), spec.mat_bar_length(spacing));
        }
    }

    Ok(steel)
}

/// Concrete for one footing (m³).
pub fn unit_volume(spec: &FootingSpec) -> CalcResult<f64> {
    spec.validate()?;
    Ok((Meters(spec.width) * Meters(spec.length) * Meters(spec.depth)).value())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_footing() -> FootingSpec {
        FootingSpec {
            id: "F1".to_string(),
            footing_type: FootingType::Isolated,
            width: 2.0,
            length: 3.0,
            depth: 1.5,
            main_bar_size: Some(16),
            main_bar_spacing: 150.0,
            distribution_bar_size: Some(12),
            distribution_bar_spacing: 200.0,
            stirrup_size: Some(10),
            stirrup_spacing: 0.15,
            top_bars_required: false,
            top_bar_size: None,
            top_bar_spacing: None,
        }
    }

    #[test]
    fn test_footing_volume() {
        let spec = FootingSpec {
            length: 2.0,
            ..test_footing()
        };
        assert_eq!(unit_volume(&spec).unwrap(), 6.0);
    }

    #[test]
    fn test_mat_bar_length() {
        // 20 bars x 2.0 + 14 bars x 3.0
        assert!((test_footing().mat_bar_length(150.0).value() - 82.0).abs() < 1e-9);
        // 15 x 2.0 + 10 x 3.0
        assert!((test_footing().mat_bar_length(200.0).value() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_footing_reinforcement() {
        let steel = unit_weights(&test_footing()).unwrap();
        assert!((steel.grade60_kg - 129.4).abs() < 0.1);
        assert!((steel.grade40_kg - 114.98).abs() < 0.1);
        assert!((steel.total_kg - 244.38).abs() < 0.1);
    }

    #[test]
    fn test_top_bars_only_when_required() {
        let listed = FootingSpec {
            top_bar_size: Some(12),
            top_bar_spacing: Some(200.0),
            ..test_footing()
        };
        let base = unit_weights(&test_footing()).unwrap();
        assert_eq!(unit_weights(&listed).unwrap(), base);

        let required = FootingSpec {
            top_bars_required: true,
            ..listed
        };
        let with_top = unit_weights(&required).unwrap();
        // another 60 m of 12 mm bar
        assert!((with_top.grade40_kg - base.grade40_kg - 53.28).abs() < 1e-9);
        assert_eq!(with_top.grade60_kg, base.grade60_kg);
    }

    #[test]
    fn test_negative_stirrup_spacing_fails_fast() {
        let spec = FootingSpec {
            stirrup_spacing: -0.15,
            ..test_footing()
        };
        assert!(unit_weights(&spec).is_err());
    }

    #[test]
    fn test_footing_type_serialization() {
        assert_eq!(serde_json::to_string(&FootingType::Raft).unwrap(), "\"raft\"");
        let spec: FootingSpec =
            serde_json::from_str(r#"{"id":"F2","type":"strip","width":0.8,"length":10.0,"depth":0.4}"#).unwrap();
        assert_eq!(spec.footing_type, FootingType::Strip);
        assert!(!spec.top_bars_required);
    }
}
