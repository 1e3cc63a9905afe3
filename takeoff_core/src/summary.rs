//! # Takeoff Aggregation
//!
//! Walks every floor's assignments, groups them by specification and rolls
//! the per-unit quantities up into floor and building totals.
//!
//! ## Grouping
//!
//! | Member  | Grouped from                          | Scaled by          |
//! |---------|---------------------------------------|--------------------|
//! | Beam    | X and Y segments with an assigned id  | total length (m)   |
//! | Column  | non-empty `column_ids` slots          | count              |
//! | Slab    | `slabs` by `slab_spec_id`             | total area (m²)    |
//! | Footing | `footings` by `footing_spec_id`       | count              |
//!
//! Groups are listed in the order their id is first met. An id with no
//! matching spec on the floor is skipped: it appears in no breakdown and
//! adds nothing to any total.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::building::Building;
//! use takeoff_core::summary::compute_building_summary;
//!
//! let summary = compute_building_summary(&Building::new("Empty")).unwrap();
//! assert!(summary.floors.is_empty());
//! assert_eq!(summary.totals.concrete_volume_m3, 0.0);
//! ```

use std::collections::HashMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::building::{slot_id, Building, Floor};
use crate::calculations::{beam, column, footing, slab, SteelWeights};
use crate::errors::{require_non_negative, CalcResult};
use crate::grid::GridSegment;
use crate::units::SquareMeters;

/// Concrete volume and graded steel weight.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuantityTotals {
    pub concrete_volume_m3: f64,
    pub grade40_steel_kg: f64,
    pub grade60_steel_kg: f64,
}

impl QuantityTotals {
    pub fn new(concrete_volume_m3: f64, steel: SteelWeights) -> Self {
        QuantityTotals {
            concrete_volume_m3,
            grade40_steel_kg: steel.grade40_kg,
            grade60_steel_kg: steel.grade60_kg,
        }
    }

    pub fn total_steel_kg(&self) -> f64 {
        self.grade40_steel_kg + self.grade60_steel_kg
    }
}

impl Add for QuantityTotals {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        QuantityTotals {
            concrete_volume_m3: self.concrete_volume_m3 + rhs.concrete_volume_m3,
            grade40_steel_kg: self.grade40_steel_kg + rhs.grade40_steel_kg,
            grade60_steel_kg: self.grade60_steel_kg + rhs.grade60_steel_kg,
        }
    }
}

impl AddAssign for QuantityTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for QuantityTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(QuantityTotals::default(), Add::add)
    }
}

/// One beam spec's share of a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamBreakdown {
    pub spec_id: String,
    /// Segment labels such as "A1-A2"
    pub segments: Vec<String>,
    pub total_length_m: f64,
    pub totals: QuantityTotals,
}

/// One column spec's share of a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBreakdown {
    pub spec_id: String,
    /// Intersection labels such as "B3"
    pub locations: Vec<String>,
    pub count: usize,
    pub totals: QuantityTotals,
}

/// One slab spec's share of a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabBreakdown {
    pub spec_id: String,
    /// Range labels such as "A1-B3"
    pub ranges: Vec<String>,
    pub total_area_m2: f64,
    pub totals: QuantityTotals,
}

/// One footing spec's share of a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootingBreakdown {
    pub spec_id: String,
    pub locations: Vec<String>,
    pub count: usize,
    pub totals: QuantityTotals,
}

/// Quantities for one floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorSummary {
    pub floor_id: String,
    pub level: i32,
    pub name: String,
    pub totals: QuantityTotals,
    pub beams: Vec<BeamBreakdown>,
    pub columns: Vec<ColumnBreakdown>,
    pub slabs: Vec<SlabBreakdown>,
    pub footings: Vec<FootingBreakdown>,
}

/// Quantities for a whole building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSummary {
    pub building_id: String,
    pub name: String,
    pub totals: QuantityTotals,
    pub floors: Vec<FloorSummary>,
}

/// Group `(key, item)` pairs, keeping groups in first-seen key order.
fn group_first_seen<'a, T>(pairs: impl IntoIterator<Item = (&'a str, T)>) -> Vec<(&'a str, Vec<T>)> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(&'a str, Vec<T>)> = Vec::new();
    for (key, item) in pairs {
        match index.get(key) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(key, groups.len());
                groups.push((key, vec![item]));
            }
        }
    }
    groups
}

fn beam_breakdowns(floor: &Floor) -> CalcResult<Vec<BeamBreakdown>> {
    let assignments = &floor.assignments;
    let x = floor
        .grid
        .x_segments()
        .into_iter()
        .filter_map(|s| slot_id(&assignments.col_beam_ids, s.slot).map(|id| (id, s)));
    let y = floor
        .grid
        .y_segments()
        .into_iter()
        .filter_map(|s| slot_id(&assignments.row_beam_ids, s.slot).map(|id| (id, s)));

    let mut breakdowns = Vec::new();
    for (id, segments) in group_first_seen(x.chain(y)) {
        let Some(spec) = floor.specs.beam(id) else {
            debug!(floor = %floor.id, beam_id = id, "no beam spec for assigned id, skipping");
            continue;
        };
        let total_length_m: f64 = segments.iter().map(|s| s.length_m).sum();
        let steel = beam::unit_weights(spec)?.scaled(total_length_m);
        let volume = total_length_m * spec.width * spec.depth;
        breakdowns.push(BeamBreakdown {
            spec_id: id.to_string(),
            segments: segments.into_iter().map(|s: GridSegment| s.label).collect(),
            total_length_m,
            totals: QuantityTotals::new(volume, steel),
        });
    }
    Ok(breakdowns)
}

fn column_breakdowns(floor: &Floor) -> CalcResult<Vec<ColumnBreakdown>> {
    let grid = &floor.grid;
    let placed = floor
        .assignments
        .column_ids
        .iter()
        .enumerate()
        .filter(|(_, id)| !id.is_empty())
        .filter_map(|(index, id)| {
            let label = grid
                .cell_of(index)
                .and_then(|(row, col)| grid.position_label(row, col));
            if label.is_none() {
                debug!(floor = %floor.id, slot = index, column_id = %id, "column slot outside grid, skipping");
            }
            label.map(|label| (id.as_str(), label))
        });

    let mut breakdowns = Vec::new();
    for (id, locations) in group_first_seen(placed) {
        let Some(spec) = floor.specs.column(id) else {
            debug!(floor = %floor.id, column_id = id, "no column spec for assigned id, skipping");
            continue;
        };
        let count = locations.len();
        let steel = column::unit_weights(spec)?.scaled(count as f64);
        let volume = column::unit_volume(spec)? * count as f64;
        breakdowns.push(ColumnBreakdown {
            spec_id: id.to_string(),
            locations,
            count,
            totals: QuantityTotals::new(volume, steel),
        });
    }
    Ok(breakdowns)
}

fn slab_breakdowns(floor: &Floor) -> CalcResult<Vec<SlabBreakdown>> {
    let placed = floor
        .assignments
        .slabs
        .iter()
        .map(|a| (a.slab_spec_id.as_str(), a));

    let mut breakdowns = Vec::new();
    for (id, slabs) in group_first_seen(placed) {
        let Some(spec) = floor.specs.slab(id) else {
            debug!(floor = %floor.id, slab_spec_id = id, "no slab spec for assigned id, skipping");
            continue;
        };
        for a in &slabs {
            require_non_negative(&format!("slab assignment {} area", a.id), a.area)?;
        }
        let total_area_m2: f64 = slabs.iter().map(|a| a.area).sum();
        let steel = slab::unit_weights(spec)?.scaled(total_area_m2);
        let volume = (SquareMeters(total_area_m2) * spec.thickness_m()).value();
        breakdowns.push(SlabBreakdown {
            spec_id: id.to_string(),
            ranges: slabs.iter().map(|a| a.label()).collect(),
            total_area_m2,
            totals: QuantityTotals::new(volume, steel),
        });
    }
    Ok(breakdowns)
}

fn footing_breakdowns(floor: &Floor) -> CalcResult<Vec<FootingBreakdown>> {
    let placed = floor
        .assignments
        .footings
        .iter()
        .map(|a| (a.footing_spec_id.as_str(), a.grid_position.clone()));

    let mut breakdowns = Vec::new();
    for (id, locations) in group_first_seen(placed) {
        let Some(spec) = floor.specs.footing(id) else {
            debug!(floor = %floor.id, footing_spec_id = id, "no footing spec for assigned id, skipping");
            continue;
        };
        let count = locations.len();
        let steel = footing::unit_weights(spec)?.scaled(count as f64);
        let volume = footing::unit_volume(spec)? * count as f64;
        breakdowns.push(FootingBreakdown {
            spec_id: id.to_string(),
            locations,
            count,
            totals: QuantityTotals::new(volume, steel),
        });
    }
    Ok(breakdowns)
}

/// Aggregate one floor.
///
/// Fails only when a referenced spec carries invalid numbers (see
/// [`CalcError::InvalidInput`](crate::errors::CalcError::InvalidInput)).
pub fn build_floor_summary(floor: &Floor) -> CalcResult<FloorSummary> {
    let beams = beam_breakdowns(floor)?;
    let columns = column_breakdowns(floor)?;
    let slabs = slab_breakdowns(floor)?;
    let footings = footing_breakdowns(floor)?;

    let totals = beams.iter().map(|b| b.totals).sum::<QuantityTotals>()
        + columns.iter().map(|c| c.totals).sum::<QuantityTotals>()
        + slabs.iter().map(|s| s.totals).sum::<QuantityTotals>()
        + footings.iter().map(|f| f.totals).sum::<QuantityTotals>();

    debug!(
        floor = %floor.id,
        concrete_m3 = totals.concrete_volume_m3,
        grade40_kg = totals.grade40_steel_kg,
        grade60_kg = totals.grade60_steel_kg,
        "floor summary computed"
    );

    Ok(FloorSummary {
        floor_id: floor.id.clone(),
        level: floor.level,
        name: floor.name.clone(),
        totals,
        beams,
        columns,
        slabs,
        footings,
    })
}

/// Aggregate every floor and sum the floor totals.
///
/// Pure: the building is only read, and the same input always gives the
/// same summary. An empty building yields zero totals.
pub fn compute_building_summary(building: &Building) -> CalcResult<BuildingSummary> {
    let floors = building
        .floors
        .iter()
        .map(build_floor_summary)
        .collect::<CalcResult<Vec<_>>>()?;
    let totals: QuantityTotals = floors.iter().map(|f| f.totals).sum();

    debug!(building = %building.id, floors = floors.len(), "building summary computed");

    Ok(BuildingSummary {
        building_id: building.id.clone(),
        name: building.name.clone(),
        totals,
        floors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{BeamSpec, ColumnSpec, FootingSpec, SlabSpec, SlabType};
    use crate::building::SlabAssignment;
    use crate::grid::GridSystem;

    fn test_floor() -> Floor {
        let mut floor = Floor::new("L1", 1, "Level 1", GridSystem::uniform(3, 4, 4.0, 5.0));
        floor.specs.beams.push(BeamSpec {
            id: "B1".to_string(),
            width: 0.3,
            depth: 0.5,
            bottom_bar_size: Some(16),
            bottom_bar_qty: 3,
            stirrup_size: Some(10),
            stirrup_qty: 5,
            ..BeamSpec::default()
        });
        floor.specs.columns.push(ColumnSpec {
            id: "C1".to_string(),
            width: 0.4,
            depth: 0.4,
            height: 3.0,
            main_bar_size: Some(20),
            main_bar_qty: 8,
            tie_size: Some(10),
            tie_spacing: 0.25,
        });
        floor.specs.slabs.push(SlabSpec {
            id: "S1".to_string(),
            thickness: 150.0,
            slab_type: SlabType::TwoWay,
            main_bar_size: Some(12),
            main_bar_spacing: 200.0,
            ..SlabSpec::default()
        });
        floor.specs.footings.push(FootingSpec {
            id: "F1".to_string(),
            width: 2.0,
            length: 2.0,
            depth: 1.5,
            ..FootingSpec::default()
        });
        floor
    }

    #[test]
    fn test_group_first_seen_keeps_order() {
        let groups = group_first_seen(vec![("b", 1), ("a", 2), ("b", 3)]);
        assert_eq!(groups, vec![("b", vec![1, 3]), ("a", vec![2])]);
    }

    #[test]
    fn test_beam_groups_across_directions() {
        let mut floor = test_floor();
        floor.assign_col_beam(0, 0, "B1").unwrap(); // A1-A2, 5 m
        floor.assign_col_beam(0, 1, "B1").unwrap(); // A2-A3, 5 m
        floor.assign_row_beam(0, 0, "B1").unwrap(); // A1-B1, 4 m

        let summary = build_floor_summary(&floor).unwrap();
        assert_eq!(summary.beams.len(), 1);
        let b = &summary.beams[0];
        assert_eq!(b.segments, vec!["A1-A2", "A2-A3", "A1-B1"]);
        assert!((b.total_length_m - 14.0).abs() < 1e-12);
        assert!((b.totals.concrete_volume_m3 - 14.0 * 0.15).abs() < 1e-9);

        let per_meter = beam::unit_weights(&floor.specs.beams[0]).unwrap();
        assert!((b.totals.grade60_steel_kg - per_meter.grade60_kg * 14.0).abs() < 1e-9);
        assert!((b.totals.grade40_steel_kg - per_meter.grade40_kg * 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_columns_grouped_with_locations() {
        let mut floor = test_floor();
        floor.assign_column(0, 0, "C1").unwrap();
        floor.assign_column(2, 3, "C1").unwrap();

        let summary = build_floor_summary(&floor).unwrap();
        let c = &summary.columns[0];
        assert_eq!(c.count, 2);
        assert_eq!(c.locations, vec!["A1", "C4"]);
        assert!((c.totals.concrete_volume_m3 - 0.96).abs() < 1e-9);
    }

    #[test]
    fn test_slab_scaled_by_total_area() {
        let mut floor = test_floor();
        floor.add_slab("SA1", "S1", "A", "A", "1", "1").unwrap(); // 20 m²
        floor.add_slab("SA2", "S1", "A", "C", "1", "2").unwrap(); // 40 m²

        let summary = build_floor_summary(&floor).unwrap();
        let s = &summary.slabs[0];
        assert_eq!(s.ranges, vec!["A1-A1", "A1-C2"]);
        assert!((s.total_area_m2 - 60.0).abs() < 1e-12);
        assert!((s.totals.concrete_volume_m3 - 9.0).abs() < 1e-9);
        // 0.888 x 5 x 2 = 8.88 kg/m²
        assert!((s.totals.grade40_steel_kg - 8.88 * 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_footings_counted() {
        let mut floor = test_floor();
        floor.add_footing("F1", "A", "1").unwrap();
        floor.add_footing("F1", "C", "4").unwrap();

        let summary = build_floor_summary(&floor).unwrap();
        let f = &summary.footings[0];
        assert_eq!(f.count, 2);
        assert_eq!(f.locations, vec!["A1", "C4"]);
        assert!((f.totals.concrete_volume_m3 - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_ids_skipped() {
        let mut floor = test_floor();
        floor.assign_col_beam(1, 1, "B-missing").unwrap();
        floor.assign_column(1, 1, "C-missing").unwrap();
        floor.add_slab("SA1", "S-missing", "A", "A", "1", "1").unwrap();
        floor.add_footing("F-missing", "A", "1").unwrap();

        let summary = build_floor_summary(&floor).unwrap();
        assert!(summary.beams.is_empty());
        assert!(summary.columns.is_empty());
        assert!(summary.slabs.is_empty());
        assert!(summary.footings.is_empty());
        assert_eq!(summary.totals, QuantityTotals::default());
    }

    #[test]
    fn test_column_slots_beyond_grid_skipped() {
        let mut floor = test_floor();
        floor.assignments.column_ids.push("C1".to_string());
        let summary = build_floor_summary(&floor).unwrap();
        assert!(summary.columns.is_empty());
    }

    #[test]
    fn test_short_assignment_arrays_are_tolerated() {
        let mut floor = test_floor();
        floor.assignments.col_beam_ids = vec!["B1".to_string()];
        floor.assignments.row_beam_ids.clear();
        let summary = build_floor_summary(&floor).unwrap();
        assert_eq!(summary.beams[0].segments, vec!["A1-A2"]);
    }

    #[test]
    fn test_invalid_spec_propagates() {
        let mut floor = test_floor();
        floor.specs.columns[0].tie_spacing = -1.0;
        floor.assign_column(0, 0, "C1").unwrap();
        assert!(build_floor_summary(&floor).is_err());
    }

    #[test]
    fn test_stored_slab_area_must_be_finite_and_non_negative() {
        for area in [-20.0, f64::NAN, f64::INFINITY] {
            let mut floor = test_floor();
            floor.assignments.slabs.push(SlabAssignment {
                id: "SA-BAD".to_string(),
                slab_spec_id: "S1".to_string(),
                start_row: "A".to_string(),
                end_row: "B".to_string(),
                start_col: "1".to_string(),
                end_col: "2".to_string(),
                area,
            });
            let err = build_floor_summary(&floor).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT");
        }
    }

    #[test]
    fn test_floor_totals_sum_categories() {
        let mut floor = test_floor();
        floor.assign_col_beam(0, 0, "B1").unwrap();
        floor.assign_column(0, 0, "C1").unwrap();
        floor.add_slab("SA1", "S1", "A", "A", "1", "1").unwrap();
        floor.add_footing("F1", "A", "1").unwrap();

        let s = build_floor_summary(&floor).unwrap();
        let expected = s.beams[0].totals + s.columns[0].totals + s.slabs[0].totals + s.footings[0].totals;
        assert!((s.totals.concrete_volume_m3 - expected.concrete_volume_m3).abs() < 1e-9);
        assert!((s.totals.grade40_steel_kg - expected.grade40_steel_kg).abs() < 1e-9);
        assert!((s.totals.grade60_steel_kg - expected.grade60_steel_kg).abs() < 1e-9);
    }

    #[test]
    fn test_empty_building() {
        let summary = compute_building_summary(&Building::new("Nothing")).unwrap();
        assert!(summary.floors.is_empty());
        assert_eq!(summary.totals, QuantityTotals::default());
        assert_eq!(summary.totals.total_steel_kg(), 0.0);
    }
}
