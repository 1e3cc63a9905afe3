//! Reinforcing Bar Properties
//!
//! Nominal bar diameters and their linear mass, plus the single grade
//! classification rule every member calculator goes through.
//!
//! | Diameter (mm) | kg/m  | Grade |
//! |---------------|-------|-------|
//! | 8             | 0.395 | 40    |
//! | 10            | 0.617 | 40    |
//! | 12            | 0.888 | 40    |
//! | 16            | 1.578 | 60    |
//! | 20            | 2.466 | 60    |
//! | 25            | 3.853 | 60    |
//! | 32            | 6.313 | 60    |

use serde::{Deserialize, Serialize};

use crate::units::KgPerMeter;

/// Allowed nominal bar diameters in millimeters, ascending
pub const ALLOWED_DIAMETERS_MM: [u32; 7] = [8, 10, 12, 16, 20, 25, 32];

/// Smallest diameter classified as Grade 60
pub const GRADE_60_MIN_DIAMETER_MM: u32 = 16;

/// Steel classification bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SteelGrade {
    #[serde(rename = "40")]
    Grade40,
    #[serde(rename = "60")]
    Grade60,
}

impl SteelGrade {
    /// Classify a nominal diameter. Bars under 16 mm are Grade 40.
    pub fn for_diameter(diameter_mm: u32) -> Self {
        if diameter_mm < GRADE_60_MIN_DIAMETER_MM {
            SteelGrade::Grade40
        } else {
            SteelGrade::Grade60
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SteelGrade::Grade40 => "Grade 40",
            SteelGrade::Grade60 => "Grade 60",
        }
    }
}

impl std::fmt::Display for SteelGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Linear mass of a bar, or `None` for diameters outside [`ALLOWED_DIAMETERS_MM`].
pub fn unit_weight(diameter_mm: u32) -> Option<KgPerMeter> {
    let kg_per_m = match diameter_mm {
        8 => 0.395,
        10 => 0.617,
        12 => 0.888,
        16 => 1.578,
        20 => 2.466,
        25 => 3.853,
        32 => 6.313,
        _ => return None,
    };
    Some(KgPerMeter(kg_per_m))
}

/// Grade bucket for a diameter. See [`SteelGrade::for_diameter`].
pub fn grade(diameter_mm: u32) -> SteelGrade {
    SteelGrade::for_diameter(diameter_mm)
}

/// Whether a diameter is in the fixed allowed set
pub fn is_allowed(diameter_mm: u32) -> bool {
    ALLOWED_DIAMETERS_MM.contains(&diameter_mm)
}
