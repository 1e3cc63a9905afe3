//! Whole-building behaviour of the takeoff engine.

use takeoff_core::building::{Building, Floor};
use takeoff_core::calculations::{BeamSpec, ColumnSpec, FootingSpec, SlabSpec, SlabType};
use takeoff_core::grid::{GridLine, GridSystem};
use takeoff_core::summary::QuantityTotals;
use takeoff_core::{calculate_grid_area, compute_building_summary};

const TOL: f64 = 1e-9;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6 * (1.0 + a.abs().max(b.abs()))
}

fn assert_totals_close(a: &QuantityTotals, b: &QuantityTotals) {
    assert!(close(a.concrete_volume_m3, b.concrete_volume_m3), "{a:?} vs {b:?}");
    assert!(close(a.grade40_steel_kg, b.grade40_steel_kg), "{a:?} vs {b:?}");
    assert!(close(a.grade60_steel_kg, b.grade60_steel_kg), "{a:?} vs {b:?}");
}

fn beam() -> BeamSpec {
    BeamSpec {
        id: "B1".to_string(),
        width: 0.3,
        depth: 0.5,
        top_bar_size: Some(16),
        top_bar_qty: 2,
        bottom_bar_size: Some(20),
        bottom_bar_qty: 3,
        stirrup_size: Some(10),
        stirrup_qty: 5,
        ..BeamSpec::default()
    }
}

fn column() -> ColumnSpec {
    ColumnSpec {
        id: "C1".to_string(),
        width: 0.4,
        depth: 0.4,
        height: 3.0,
        main_bar_size: Some(20),
        main_bar_qty: 8,
        tie_size: Some(10),
        tie_spacing: 0.2,
    }
}

fn slab() -> SlabSpec {
    SlabSpec {
        id: "S1".to_string(),
        thickness: 150.0,
        slab_type: SlabType::TwoWay,
        main_bar_size: Some(12),
        main_bar_spacing: 200.0,
        distribution_bar_size: Some(10),
        distribution_bar_spacing: 250.0,
        temperature_bar_size: Some(8),
        temperature_bar_spacing: 250.0,
        ..SlabSpec::default()
    }
}

fn footing() -> FootingSpec {
    FootingSpec {
        id: "F1".to_string(),
        width: 2.0,
        length: 3.0,
        depth: 1.5,
        main_bar_size: Some(16),
        main_bar_spacing: 150.0,
        distribution_bar_size: Some(12),
        distribution_bar_spacing: 200.0,
        stirrup_size: Some(10),
        stirrup_spacing: 0.15,
        ..FootingSpec::default()
    }
}

fn framed_floor(id: &str, level: i32) -> Floor {
    let mut floor = Floor::new(id, level, format!("Level {level}"), GridSystem::uniform(3, 4, 4.0, 5.0));
    floor.specs.beams.push(beam());
    floor.specs.columns.push(column());
    floor.specs.slabs.push(slab());
    floor.specs.footings.push(footing());

    for row in 0..3 {
        for gap in 0..3 {
            floor.assign_col_beam(row, gap, "B1").unwrap();
        }
        for col in 0..4 {
            floor.assign_column(row, col, "C1").unwrap();
        }
    }
    for col in 0..4 {
        floor.assign_row_beam(col, 0, "B1").unwrap();
    }
    floor.add_slab("SA-1", "S1", "A", "B", "1", "3").unwrap();
    floor.add_slab("SA-2", "S1", "C", "C", "4", "4").unwrap();
    floor.add_footing("F1", "A", "1").unwrap();
    floor.add_footing("F1", "C", "4").unwrap();
    floor
}

fn sample_building() -> Building {
    let mut building = Building::new("Sample");
    building.add_floor(framed_floor("GF", 0));
    building.add_floor(framed_floor("L1", 1));
    building
}

#[test]
fn test_summary_is_idempotent() {
    let building = sample_building();
    let first = compute_building_summary(&building).unwrap();
    let second = compute_building_summary(&building).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_building_totals_are_sum_of_floor_totals() {
    let summary = compute_building_summary(&sample_building()).unwrap();
    let floor_sum: QuantityTotals = summary.floors.iter().map(|f| f.totals).sum();
    assert_totals_close(&summary.totals, &floor_sum);
}

#[test]
fn test_floor_totals_are_sum_of_categories() {
    let summary = compute_building_summary(&sample_building()).unwrap();
    for floor in &summary.floors {
        let categories = floor.beams.iter().map(|b| b.totals).sum::<QuantityTotals>()
            + floor.columns.iter().map(|c| c.totals).sum::<QuantityTotals>()
            + floor.slabs.iter().map(|s| s.totals).sum::<QuantityTotals>()
            + floor.footings.iter().map(|f| f.totals).sum::<QuantityTotals>();
        assert_totals_close(&floor.totals, &categories);
    }
}

#[test]
fn test_unknown_references_do_not_change_totals() {
    let baseline = compute_building_summary(&sample_building()).unwrap();

    let mut building = sample_building();
    let floor = building.floor_mut("GF").unwrap();
    floor.assign_row_beam(0, 1, "B-MISSING").unwrap();
    floor.add_slab("SA-X", "S-MISSING", "A", "C", "1", "4").unwrap();
    floor.add_footing("F-MISSING", "B", "2").unwrap();

    let summary = compute_building_summary(&building).unwrap();
    assert_totals_close(&summary.totals, &baseline.totals);
    assert_eq!(summary.floors[0].beams.len(), 1);
}

#[test]
fn test_empty_building_has_zero_totals() {
    let summary = compute_building_summary(&Building::new("Empty")).unwrap();
    assert!(summary.floors.is_empty());
    assert_eq!(summary.totals, QuantityTotals::default());

    let mut building = Building::new("Bare floor");
    building.add_floor(Floor::new("GF", 0, "Ground", GridSystem::uniform(2, 2, 4.0, 5.0)));
    let summary = compute_building_summary(&building).unwrap();
    assert_eq!(summary.totals, QuantityTotals::default());
    assert!(summary.floors[0].beams.is_empty());
}

#[test]
fn test_concurrent_callers_agree() {
    let building = sample_building();
    let expected = compute_building_summary(&building).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| compute_building_summary(&building).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_footing_quantities_in_summary() {
    let mut floor = Floor::new("FDN", -1, "Foundation", GridSystem::uniform(2, 2, 4.0, 5.0));
    floor.specs.footings.push(FootingSpec {
        length: 2.0,
        ..footing()
    });
    floor.add_footing("F1", "A", "1").unwrap();
    let mut building = Building::new("Footing only");
    building.add_floor(floor);

    let summary = compute_building_summary(&building).unwrap();
    assert!((summary.totals.concrete_volume_m3 - 6.0).abs() < TOL);
    assert_eq!(summary.floors[0].footings[0].count, 1);
}

#[test]
fn test_grade_partition_by_diameter() {
    // Only 16 mm and larger bars
    let mut floor = Floor::new("GF", 0, "Ground", GridSystem::uniform(2, 2, 4.0, 5.0));
    floor.specs.columns.push(ColumnSpec {
        id: "C-HEAVY".to_string(),
        width: 0.5,
        depth: 0.5,
        height: 3.0,
        main_bar_size: Some(25),
        main_bar_qty: 4,
        tie_size: Some(16),
        tie_spacing: 0.3,
    });
    floor.assign_column(1, 1, "C-HEAVY").unwrap();
    let mut building = Building::new("Heavy");
    building.add_floor(floor);

    let totals = compute_building_summary(&building).unwrap().totals;
    assert_eq!(totals.grade40_steel_kg, 0.0);
    // 4 x 3.0 x 3.853 + 10 ties x 2.0 x 1.578
    assert!((totals.grade60_steel_kg - (46.236 + 31.56)).abs() < 1e-6);
}

#[test]
fn test_last_cell_reuses_previous_pitch() {
    let rows = vec![GridLine::new("A", 0.0), GridLine::new("B", 4.0), GridLine::new("C", 8.0)];
    let cols = vec![
        GridLine::new("1", 0.0),
        GridLine::new("2", 5.0),
        GridLine::new("3", 10.0),
        GridLine::new("4", 15.0),
    ];
    let result = calculate_grid_area("C", "C", "4", "4", &rows, &cols);
    assert!(result.is_valid);
    assert!((result.area - 20.0).abs() < TOL);
}

#[test]
fn test_summary_survives_file_roundtrip() {
    let path = std::env::temp_dir().join("takeoff_it_roundtrip.qto");
    let building = sample_building();
    takeoff_core::save_building(&building, &path).unwrap();
    let loaded = takeoff_core::load_building(&path).unwrap();

    assert_totals_close(
        &compute_building_summary(&loaded).unwrap().totals,
        &compute_building_summary(&building).unwrap().totals,
    );
    let _ = std::fs::remove_file(&path);
}
