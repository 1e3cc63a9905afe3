//! # Member Unit Calculators
//!
//! Each member type turns one specification into per-unit quantities:
//!
//! | Member  | Unit            | Module      |
//! |---------|-----------------|-------------|
//! | Beam    | per linear meter| [`beam`]    |
//! | Column  | per member      | [`column`]  |
//! | Slab    | per m²          | [`slab`]    |
//! | Footing | per member      | [`footing`] |
//!
//! Every module follows the same pattern:
//!
//! - `*Spec` - catalog entry (JSON-serializable)
//! - `unit_weights(spec) -> CalcResult<SteelWeights>` - steel per unit
//! - `unit_volume(spec) -> CalcResult<f64>` - concrete per unit
//!
//! All steel is bucketed through [`SteelWeights::add_bars`], which is the
//! only place the Grade 40 / Grade 60 rule is applied.

pub mod beam;
pub mod column;
pub mod footing;
pub mod slab;

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::CalcResult;
use crate::materials::{grade, unit_weight, SteelGrade};
use crate::units::Meters;

// Re-export commonly used types
pub use beam::BeamSpec;
pub use column::ColumnSpec;
pub use footing::{FootingSpec, FootingType};
pub use slab::{SlabSpec, SlabType};

/// Steel weight split by grade, in kilograms (or kg per unit).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SteelWeights {
    pub grade40_kg: f64,
    pub grade60_kg: f64,
    /// Always `grade40_kg + grade60_kg`
    pub total_kg: f64,
}

impl SteelWeights {
    pub fn new(grade40_kg: f64, grade60_kg: f64) -> Self {
        SteelWeights {
            grade40_kg,
            grade60_kg,
            total_kg: grade40_kg + grade60_kg,
        }
    }

    /// Add `length` of bar of the given diameter to its grade bucket.
    ///
    /// A missing or zero diameter adds nothing. A diameter outside the bar
    /// table also adds nothing, with a warning.
    pub fn add_bars(&mut self, diameter_mm: Option<u32>, length: Meters) {
        let Some(diameter) = diameter_mm.filter(|d| *d > 0) else {
            return;
        };
        let Some(weight) = unit_weight(diameter) else {
            warn!(diameter_mm = diameter, "bar diameter not in bar table, contributes nothing");
            return;
        };
        let kg = (weight * length).value();
        match grade(diameter) {
            SteelGrade::Grade40 => self.grade40_kg += kg,
            SteelGrade::Grade60 => self.grade60_kg += kg,
        }
        self.total_kg = self.grade40_kg + self.grade60_kg;
    }

    /// Multiply every bucket by `factor` (length, count or area).
    pub fn scaled(self, factor: f64) -> Self {
        SteelWeights::new(self.grade40_kg * factor, self.grade60_kg * factor)
    }

    /// Round both buckets to two decimals; the total is the sum of the rounded buckets.
    pub fn rounded(self) -> Self {
        let grade40_kg = round2(self.grade40_kg);
        let grade60_kg = round2(self.grade60_kg);
        SteelWeights {
            grade40_kg,
            grade60_kg,
            total_kg: round2(grade40_kg + grade60_kg),
        }
    }
}

impl Add for SteelWeights {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        SteelWeights::new(self.grade40_kg + rhs.grade40_kg, self.grade60_kg + rhs.grade60_kg)
    }
}

impl AddAssign for SteelWeights {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// What one "unit" of a spec's quantities refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitBasis {
    PerMeter,
    PerMember,
    PerSquareMeter,
}

/// Per-unit preview of a specification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitQuantities {
    pub basis: UnitBasis,
    pub concrete_volume_m3: f64,
    pub steel: SteelWeights,
}

/// Enum wrapper for all specification kinds.
///
/// Lets callers (UI cards, the CLI) ask for a per-unit preview without
/// matching on the member type themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MemberSpec {
    Beam(BeamSpec),
    Column(ColumnSpec),
    Slab(SlabSpec),
    Footing(FootingSpec),
}

impl MemberSpec {
    /// Catalog id of the wrapped spec
    pub fn id(&self) -> &str {
        match self {
            MemberSpec::Beam(s) => &s.id,
            MemberSpec::Column(s) => &s.id,
            MemberSpec::Slab(s) => &s.id,
            MemberSpec::Footing(s) => &s.id,
        }
    }

    /// Get the member type as a string
    pub fn kind(&self) -> &'static str {
        match self {
            MemberSpec::Beam(_) => "Beam",
            MemberSpec::Column(_) => "Column",
            MemberSpec::Slab(_) => "Slab",
            MemberSpec::Footing(_) => "Footing",
        }
    }

    /// Concrete and graded steel for one unit of this spec.
    pub fn unit_quantities(&self) -> CalcResult<UnitQuantities> {
        unit_quantities(self)
    }
}

/// Concrete and graded steel for one unit of `spec`.
///
/// # Example
///
/// ```rust
/// use takeoff_core::calculations::{unit_quantities, FootingSpec, MemberSpec, UnitBasis};
///
/// let footing = FootingSpec {
///     id: "F1".to_string(),
///     width: 2.0,
///     length: 2.0,
///     depth: 1.5,
///     ..FootingSpec::default()
/// };
/// let q = unit_quantities(&MemberSpec::Footing(footing)).unwrap();
/// assert_eq!(q.basis, UnitBasis::PerMember);
/// assert_eq!(q.concrete_volume_m3, 6.0);
/// ```
pub fn unit_quantities(spec: &MemberSpec) -> CalcResult<UnitQuantities> {
    let (basis, concrete_volume_m3, steel) = match spec {
        MemberSpec::Beam(s) => (UnitBasis::PerMeter, beam::unit_volume(s)?, beam::unit_weights(s)?),
        MemberSpec::Column(s) => (UnitBasis::PerMember, column::unit_volume(s)?, column::unit_weights(s)?),
        MemberSpec::Slab(s) => (UnitBasis::PerSquareMeter, slab::unit_volume(s)?, slab::unit_weights(s)?),
        MemberSpec::Footing(s) => (UnitBasis::PerMember, footing::unit_volume(s)?, footing::unit_weights(s)?),
    };
    Ok(UnitQuantities {
        basis,
        concrete_volume_m3,
        steel,
    })
}

impl From<BeamSpec> for MemberSpec {
    fn from(spec: BeamSpec) -> Self {
        MemberSpec::Beam(spec)
    }
}

impl From<ColumnSpec> for MemberSpec {
    fn from(spec: ColumnSpec) -> Self {
        MemberSpec::Column(spec)
    }
}

impl From<SlabSpec> for MemberSpec {
    fn from(spec: SlabSpec) -> Self {
        MemberSpec::Slab(spec)
    }
}

impl From<FootingSpec> for MemberSpec {
    fn from(spec: FootingSpec) -> Self {
        MemberSpec::Footing(spec)
    }
}
