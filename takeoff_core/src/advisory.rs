//! # Advisories
//!
//! Non-blocking detailing hints and floor integrity checks. Nothing here is
//! a code-compliance check, and nothing here stops
//! [`compute_building_summary`](crate::summary::compute_building_summary)
//! from running.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::building::{slot_id, Floor};
use crate::calculations::{BeamSpec, ColumnSpec, FootingSpec, MemberSpec, SlabSpec};
use crate::grid::GridValidation;
use crate::materials::is_allowed;

/// Minimum main bars in a tied rectangular column
pub const MIN_COLUMN_MAIN_BARS: u32 = 4;

/// Tie spacing limit in main-bar diameters
pub const MAX_TIE_SPACING_BAR_DIAMETERS: f64 = 16.0;

/// Thinnest slab that does not raise an advisory (mm)
pub const MIN_SLAB_THICKNESS_MM: f64 = 100.0;

/// Largest mat bar spacing that does not raise an advisory (mm)
pub const MAX_BAR_SPACING_MM: f64 = 450.0;

/// Shallowest footing that does not raise an advisory (m)
pub const MIN_FOOTING_DEPTH_M: f64 = 0.25;

/// A detailing hint about one specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub spec_id: String,
    pub kind: String,
    pub message: String,
}

fn advisory(spec: &MemberSpec, message: impl Into<String>) -> Advisory {
    Advisory {
        spec_id: spec.id().to_string(),
        kind: spec.kind().to_string(),
        message: message.into(),
    }
}

fn unknown_sizes(sizes: &[Option<u32>]) -> Vec<String> {
    sizes
        .iter()
        .flatten()
        .filter(|d| **d > 0 && !is_allowed(**d))
        .map(|d| format!("Bar diameter {d} mm is not a standard size and is ignored"))
        .collect()
}

fn beam_messages(spec: &BeamSpec) -> Vec<String> {
    let mut messages = Vec::new();
    if spec.bottom_bar_size.is_none() || spec.bottom_bar_qty == 0 {
        messages.push("No bottom reinforcement".to_string());
    }
    if spec.stirrup_size.is_none() || spec.stirrup_qty == 0 {
        messages.push("No stirrups".to_string());
    }
    if spec.depth < spec.width {
        messages.push(format!(
            "Depth {} m is less than width {} m",
            spec.depth, spec.width
        ));
    }
    messages.extend(unknown_sizes(&[
        spec.top_bar_size,
        spec.web_bar_size,
        spec.bottom_bar_size,
        spec.stirrup_size,
    ]));
    messages
}

fn column_messages(spec: &ColumnSpec) -> Vec<String> {
    let mut messages = Vec::new();
    if spec.main_bar_qty < MIN_COLUMN_MAIN_BARS {
        messages.push(format!(
            "{} main bars; tied columns usually need at least {MIN_COLUMN_MAIN_BARS}",
            spec.main_bar_qty
        ));
    }
    if spec.tie_size.is_some() && spec.tie_spacing > 0.0 {
        if let Some(main) = spec.main_bar_size {
            let limit_m = MAX_TIE_SPACING_BAR_DIAMETERS * f64::from(main) / 1000.0;
            if spec.tie_spacing > limit_m {
                messages.push(format!(
                    "Tie spacing {} m exceeds 16 main-bar diameters ({limit_m:.3} m)",
                    spec.tie_spacing
                ));
            }
        }
        let least = spec.width.min(spec.depth);
        if spec.tie_spacing > least {
            messages.push(format!(
                "Tie spacing {} m exceeds least column dimension {least} m",
                spec.tie_spacing
            ));
        }
    }
    messages.extend(unknown_sizes(&[spec.main_bar_size, spec.tie_size]));
    messages
}

fn slab_messages(spec: &SlabSpec) -> Vec<String> {
    let mut messages = Vec::new();
    if spec.thickness < MIN_SLAB_THICKNESS_MM {
        messages.push(format!(
            "Thickness {} mm is below {MIN_SLAB_THICKNESS_MM} mm",
            spec.thickness
        ));
    }
    if spec.main_bar_size.is_some() {
        let limit = (3.0 * spec.thickness).min(MAX_BAR_SPACING_MM);
        if spec.main_bar_spacing > limit {
            messages.push(format!(
                "Main bar spacing {} mm exceeds {limit} mm",
                spec.main_bar_spacing
            ));
        }
    }
    messages.extend(unknown_sizes(&[
        spec.main_bar_size,
        spec.distribution_bar_size,
        spec.temperature_bar_size,
        spec.top_bar_size,
    ]));
    messages
}

fn footing_messages(spec: &FootingSpec) -> Vec<String> {
    let mut messages = Vec::new();
    if spec.depth < MIN_FOOTING_DEPTH_M {
        messages.push(format!(
            "Depth {} m is below {MIN_FOOTING_DEPTH_M} m",
            spec.depth
        ));
    }
    if spec.main_bar_size.is_some() && spec.main_bar_spacing > MAX_BAR_SPACING_MM {
        messages.push(format!(
            "Main bar spacing {} mm exceeds {MAX_BAR_SPACING_MM} mm",
            spec.main_bar_spacing
        ));
    }
    if spec.top_bars_required && (spec.top_bar_size.is_none() || spec.top_bar_spacing.is_none()) {
        messages.push("Top bars required but size or spacing missing".to_string());
    }
    messages.extend(unknown_sizes(&[
        spec.main_bar_size,
        spec.distribution_bar_size,
        spec.stirrup_size,
        spec.top_bar_size,
    ]));
    messages
}

/// Detailing hints for one specification.
///
/// # Example
///
/// ```rust
/// use takeoff_core::advisory::check_spec;
/// use takeoff_core::calculations::{ColumnSpec, MemberSpec};
///
/// let spec = MemberSpec::Column(ColumnSpec {
///     id: "C1".to_string(),
///     width: 0.3,
///     depth: 0.3,
///     height: 3.0,
///     main_bar_size: Some(16),
///     main_bar_qty: 2,
///     ..ColumnSpec::default()
/// });
/// assert_eq!(check_spec(&spec).len(), 1);
/// ```
pub fn check_spec(spec: &MemberSpec) -> Vec<Advisory> {
    let messages = match spec {
        MemberSpec::Beam(s) => beam_messages(s),
        MemberSpec::Column(s) => column_messages(s),
        MemberSpec::Slab(s) => slab_messages(s),
        MemberSpec::Footing(s) => footing_messages(s),
    };
    messages.into_iter().map(|m| advisory(spec, m)).collect()
}

/// Integrity and detailing report for one floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorReport {
    pub floor_id: String,
    pub grid: GridValidation,
    /// Assignment problems: array lengths, dangling ids, off-grid positions
    pub assignment_errors: Vec<String>,
    pub advisories: Vec<Advisory>,
}

impl FloorReport {
    /// True when neither the grid nor the assignments have integrity errors.
    pub fn is_clean(&self) -> bool {
        self.grid.is_valid && self.assignment_errors.is_empty()
    }
}

fn check_length(errors: &mut Vec<String>, name: &str, actual: usize, expected: usize) {
    if actual != expected {
        errors.push(format!("{name} has {actual} slots, expected {expected}"));
    }
}

fn check_duplicates<'a>(errors: &mut Vec<String>, kind: &str, ids: impl Iterator<Item = &'a str>) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(format!("Duplicate {kind} spec id \"{id}\"; the first one is used"));
        }
    }
}

fn check_references<'a>(errors: &mut Vec<String>, kind: &str, ids: impl Iterator<Item = &'a str>, exists: impl Fn(&str) -> bool) {
    let mut reported = HashSet::new();
    for id in ids {
        if !exists(id) && reported.insert(id) {
            errors.push(format!("{kind} spec \"{id}\" is assigned but not defined; it is left out of the takeoff"));
        }
    }
}

/// Check a floor's grid, assignment arrays and spec references.
pub fn check_floor(floor: &Floor) -> FloorReport {
    let grid = &floor.grid;
    let a = &floor.assignments;
    let specs = &floor.specs;
    let mut errors = Vec::new();

    check_length(&mut errors, "col_beam_ids", a.col_beam_ids.len(), grid.col_beam_slots());
    check_length(&mut errors, "row_beam_ids", a.row_beam_ids.len(), grid.row_beam_slots());
    check_length(&mut errors, "column_ids", a.column_ids.len(), grid.column_slots());

    check_duplicates(&mut errors, "beam", specs.beams.iter().map(|s| s.id.as_str()));
    check_duplicates(&mut errors, "column", specs.columns.iter().map(|s| s.id.as_str()));
    check_duplicates(&mut errors, "slab", specs.slabs.iter().map(|s| s.id.as_str()));
    check_duplicates(&mut errors, "footing", specs.footings.iter().map(|s| s.id.as_str()));

    let beam_ids = (0..a.col_beam_ids.len())
        .filter_map(|i| slot_id(&a.col_beam_ids, i))
        .chain((0..a.row_beam_ids.len()).filter_map(|i| slot_id(&a.row_beam_ids, i)));
    check_references(&mut errors, "Beam", beam_ids, |id| specs.beam(id).is_some());

    let column_ids = (0..a.column_ids.len()).filter_map(|i| slot_id(&a.column_ids, i));
    check_references(&mut errors, "Column", column_ids, |id| specs.column(id).is_some());

    check_references(
        &mut errors,
        "Slab",
        a.slabs.iter().map(|s| s.slab_spec_id.as_str()),
        |id| specs.slab(id).is_some(),
    );
    check_references(
        &mut errors,
        "Footing",
        a.footings.iter().map(|f| f.footing_spec_id.as_str()),
        |id| specs.footing(id).is_some(),
    );

    let positions: HashSet<String> = (0..grid.num_rows())
        .flat_map(|r| (0..grid.num_cols()).filter_map(move |c| grid.position_label(r, c)))
        .collect();
    for footing in &a.footings {
        if !positions.contains(&footing.grid_position) {
            errors.push(format!(
                "Footing position \"{}\" is not a grid intersection",
                footing.grid_position
            ));
        }
    }

    let advisories = specs.all().iter().flat_map(check_spec).collect();

    FloorReport {
        floor_id: floor.id.clone(),
        grid: grid.validate(),
        assignment_errors: errors,
        advisories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::SlabType;
    use crate::grid::GridSystem;

    fn good_beam() -> BeamSpec {
        BeamSpec {
            id: "B1".to_string(),
            width: 0.3,
            depth: 0.5,
            bottom_bar_size: Some(16),
            bottom_bar_qty: 3,
            stirrup_size: Some(10),
            stirrup_qty: 5,
            ..BeamSpec::default()
        }
    }

    #[test]
    fn test_clean_beam_has_no_advisories() {
        assert!(check_spec(&MemberSpec::Beam(good_beam())).is_empty());
    }

    #[test]
    fn test_beam_advisories() {
        let spec = BeamSpec {
            width: 0.6,
            bottom_bar_qty: 0,
            stirrup_size: Some(14),
            ..good_beam()
        };
        let advisories = check_spec(&MemberSpec::Beam(spec));
        let messages: Vec<_> = advisories.iter().map(|a| a.message.as_str()).collect();
        assert!(messages.contains(&"No bottom reinforcement"));
        assert!(messages.iter().any(|m| m.starts_with("Depth")));
        assert!(messages.iter().any(|m| m.contains("14 mm")));
        assert!(advisories.iter().all(|a| a.kind == "Beam" && a.spec_id == "B1"));
    }

    #[test]
    fn test_column_tie_spacing_advisories() {
        let spec = ColumnSpec {
            id: "C1".to_string(),
            width: 0.3,
            depth: 0.3,
            height: 3.0,
            main_bar_size: Some(16),
            main_bar_qty: 4,
            tie_size: Some(10),
            tie_spacing: 0.35,
        };
        // 16 x 16 mm = 0.256 m, least dimension 0.3 m
        assert_eq!(check_spec(&MemberSpec::Column(spec)).len(), 2);
    }

    #[test]
    fn test_slab_advisories() {
        let spec = SlabSpec {
            id: "S1".to_string(),
            thickness: 90.0,
            slab_type: SlabType::OneWay,
            main_bar_size: Some(10),
            main_bar_spacing: 300.0,
            ..SlabSpec::default()
        };
        // thin, and 300 > 3 x 90
        assert_eq!(check_spec(&MemberSpec::Slab(spec)).len(), 2);
    }

    #[test]
    fn test_footing_top_bars_missing() {
        let spec = FootingSpec {
            id: "F1".to_string(),
            width: 2.0,
            length: 2.0,
            depth: 0.6,
            top_bars_required: true,
            ..FootingSpec::default()
        };
        let advisories = check_spec(&MemberSpec::Footing(spec));
        assert_eq!(advisories.len(), 1);
        assert!(advisories[0].message.contains("Top bars"));
    }

    #[test]
    fn test_floor_report() {
        let mut floor = Floor::new("L1", 1, "Level 1", GridSystem::uniform(2, 2, 4.0, 5.0));
        floor.specs.beams.push(good_beam());
        floor.specs.beams.push(good_beam());
        floor.assign_col_beam(0, 0, "B1").unwrap();
        floor.assign_col_beam(1, 0, "B7").unwrap();
        floor.assign_row_beam(0, 0, "B7").unwrap();
        floor.assignments.column_ids.push(String::new());
        floor.assignments.footings.push(crate::building::FootingAssignment {
            footing_spec_id: "F1".to_string(),
            grid_position: "Z9".to_string(),
        });

        let report = check_floor(&floor);
        assert!(!report.is_clean());
        assert!(report.grid.is_valid);

        let errors = &report.assignment_errors;
        assert!(errors.iter().any(|e| e == "column_ids has 5 slots, expected 4"));
        assert!(errors.iter().any(|e| e.starts_with("Duplicate beam spec id \"B1\"")));
        assert_eq!(errors.iter().filter(|e| e.contains("\"B7\"")).count(), 1);
        assert!(errors.iter().any(|e| e.starts_with("Footing spec \"F1\"")));
        assert!(errors.iter().any(|e| e.contains("\"Z9\" is not a grid intersection")));
    }

    #[test]
    fn test_clean_floor() {
        let floor = Floor::new("L1", 1, "Level 1", GridSystem::uniform(3, 3, 4.0, 5.0));
        let report = check_floor(&floor);
        assert!(report.is_clean());
        assert!(report.advisories.is_empty());
    }
}
