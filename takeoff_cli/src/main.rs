//! # Takeoff CLI
//!
//! Command-line front end for the quantity takeoff engine.
//!
//! ## Commands
//!
//! - `init`: write a new building file with one empty floor
//! - `summary`: concrete and steel totals per floor and for the building
//! - `validate`: grid, assignment and detailing checks
//! - `area`: resolve the plan area of a grid range
//! - `unit`: per-unit quantities of one catalog spec

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use takeoff_core::advisory::check_floor;
use takeoff_core::building::{Building, Floor};
use takeoff_core::file_io::{load_building_with_lock_check, save_building, FileLock};
use takeoff_core::grid::{GridSystem, DEFAULT_COL_SPACING_M, DEFAULT_ROW_SPACING_M};
use takeoff_core::summary::{compute_building_summary, BuildingSummary, QuantityTotals};
use takeoff_core::{load_building, unit_quantities};

#[derive(Parser)]
#[command(name = "takeoff")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reinforced concrete quantity takeoff", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new building file with one empty floor
    Init {
        /// Building file to create (.qto)
        file: PathBuf,

        /// Building name
        #[arg(short, long, default_value = "Untitled Building")]
        name: String,

        /// Number of row grid lines (A, B, C...)
        #[arg(long, default_value = "3")]
        rows: usize,

        /// Number of column grid lines (1, 2, 3...)
        #[arg(long, default_value = "3")]
        cols: usize,

        /// Distance between row lines in meters
        #[arg(long, default_value_t = DEFAULT_ROW_SPACING_M)]
        row_spacing: f64,

        /// Distance between column lines in meters
        #[arg(long, default_value_t = DEFAULT_COL_SPACING_M)]
        col_spacing: f64,

        /// Lock owner recorded while the file is written
        #[arg(long, env = "TAKEOFF_USER", default_value = "takeoff")]
        user: String,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print concrete and steel totals
    Summary {
        file: PathBuf,

        /// Print the full summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check grids, assignments and spec detailing on every floor
    Validate { file: PathBuf },

    /// Resolve the plan area of a grid range
    Area {
        file: PathBuf,

        /// Floor id
        #[arg(short, long)]
        floor: String,

        #[arg(long)]
        start_row: String,

        #[arg(long)]
        end_row: String,

        #[arg(long)]
        start_col: String,

        #[arg(long)]
        end_col: String,
    },

    /// Per-unit quantities of one spec (per meter, per member or per m²)
    Unit {
        file: PathBuf,

        /// Floor id
        #[arg(short, long)]
        floor: String,

        /// Spec id in the floor's catalog
        #[arg(short, long)]
        spec: String,
    },
}

fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    init_tracing(cli.json_logs, level);

    match cli.command {
        Commands::Init {
            file,
            name,
            rows,
            cols,
            row_spacing,
            col_spacing,
            user,
            force,
        } => cmd_init(&file, &name, GridSystem::uniform(rows, cols, row_spacing, col_spacing), &user, force),
        Commands::Summary { file, json } => cmd_summary(&file, json),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Area {
            file,
            floor,
            start_row,
            end_row,
            start_col,
            end_col,
        } => cmd_area(&file, &floor, [&start_row, &end_row, &start_col, &end_col].map(String::as_str)),
        Commands::Unit { file, floor, spec } => cmd_unit(&file, &floor, &spec),
    }
}

fn open_building(path: &Path) -> Result<Building> {
    load_building(path).with_context(|| format!("Failed to load building from {}", path.display()))
}

fn find_floor<'a>(building: &'a Building, floor_id: &str) -> Result<&'a Floor> {
    building
        .floor(floor_id)
        .with_context(|| format!("Floor \"{}\" not found in \"{}\"", floor_id, building.name))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_init(path: &Path, name: &str, grid: GridSystem, user: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to replace it)", path.display());
    }
    let validation = grid.validate();
    if !validation.is_valid {
        bail!("Invalid grid: {}", validation.errors.join("; "));
    }

    let mut building = Building::new(name);
    building.add_floor(Floor::new("GF", 0, "Ground Floor", grid));

    let _lock = FileLock::acquire(path, user).context("Failed to lock building file")?;
    save_building(&building, path).context("Failed to save building")?;
    info!(path = %path.display(), id = %building.id, "created building");

    println!("Created \"{}\" at {}", building.name, path.display());
    println!("Building id: {}", building.id);
    Ok(())
}

fn print_totals(indent: &str, totals: &QuantityTotals) {
    println!("{indent}Concrete:       {:>12.3} m³", totals.concrete_volume_m3);
    println!("{indent}Grade 40 steel: {:>12.2} kg", totals.grade40_steel_kg);
    println!("{indent}Grade 60 steel: {:>12.2} kg", totals.grade60_steel_kg);
    println!("{indent}Total steel:    {:>12.2} kg", totals.total_steel_kg());
}

fn print_summary(summary: &BuildingSummary) {
    println!("═══════════════════════════════════════");
    println!("  QUANTITY TAKEOFF: {}", summary.name);
    println!("═══════════════════════════════════════");

    for floor in &summary.floors {
        println!();
        println!("{} (level {}, id {})", floor.name, floor.level, floor.floor_id);
        println!("───────────────────────────────────────");
        for beam in &floor.beams {
            println!(
                "  Beam {:<10} {:>3} spans  {:>9.2} m   {:>8.3} m³  {:>10.2} kg",
                beam.spec_id,
                beam.segments.len(),
                beam.total_length_m,
                beam.totals.concrete_volume_m3,
                beam.totals.total_steel_kg()
            );
        }
        for column in &floor.columns {
            println!(
                "  Column {:<8} {:>3} pcs                {:>8.3} m³  {:>10.2} kg",
                column.spec_id,
                column.count,
                column.totals.concrete_volume_m3,
                column.totals.total_steel_kg()
            );
        }
        for slab in &floor.slabs {
            println!(
                "  Slab {:<10} {:>3} areas  {:>9.2} m²  {:>8.3} m³  {:>10.2} kg",
                slab.spec_id,
                slab.ranges.len(),
                slab.total_area_m2,
                slab.totals.concrete_volume_m3,
                slab.totals.total_steel_kg()
            );
        }
        for footing in &floor.footings {
            println!(
                "  Footing {:<7} {:>3} pcs                {:>8.3} m³  {:>10.2} kg",
                footing.spec_id,
                footing.count,
                footing.totals.concrete_volume_m3,
                footing.totals.total_steel_kg()
            );
        }
        println!();
        print_totals("  ", &floor.totals);
    }

    println!();
    println!("═══════════════════════════════════════");
    println!("  BUILDING TOTAL");
    println!("═══════════════════════════════════════");
    print_totals("  ", &summary.totals);
}

fn cmd_summary(path: &Path, json: bool) -> Result<()> {
    let building = open_building(path)?;
    let summary = compute_building_summary(&building)
        .with_context(|| format!("Failed to compute takeoff for \"{}\"", building.name))?;

    if json {
        print_json(&summary)
    } else {
        print_summary(&summary);
        Ok(())
    }
}

fn cmd_validate(path: &Path) -> Result<()> {
    let (building, lock) = load_building_with_lock_check(path)
        .with_context(|| format!("Failed to load building from {}", path.display()))?;

    if let Some(lock) = lock {
        println!("Locked by {} since {}", lock.holder(), lock.locked_at.to_rfc3339());
    }

    let mut dirty_floors = 0;
    for floor in &building.floors {
        let report = check_floor(floor);
        debug!(floor = %report.floor_id, clean = report.is_clean(), "floor checked");

        println!();
        println!("Floor {} ({})", floor.id, floor.name);
        for error in report.grid.errors.iter().chain(&report.assignment_errors) {
            println!("  ERROR    {error}");
        }
        for advisory in &report.advisories {
            println!("  ADVISORY [{}] {}: {}", advisory.kind, advisory.spec_id, advisory.message);
        }
        if report.is_clean() && report.advisories.is_empty() {
            println!("  OK");
        }
        if !report.is_clean() {
            dirty_floors += 1;
        }
    }

    if dirty_floors > 0 {
        bail!("{dirty_floors} floor(s) have integrity errors");
    }
    Ok(())
}

fn cmd_area(path: &Path, floor_id: &str, [start_row, end_row, start_col, end_col]: [&str; 4]) -> Result<()> {
    let building = open_building(path)?;
    let floor = find_floor(&building, floor_id)?;
    let result = floor.grid.area(start_row, end_row, start_col, end_col);
    print_json(&result)
}

fn cmd_unit(path: &Path, floor_id: &str, spec_id: &str) -> Result<()> {
    let building = open_building(path)?;
    let floor = find_floor(&building, floor_id)?;
    let spec = floor.find_spec(spec_id)?;
    let quantities =
        unit_quantities(&spec).with_context(|| format!("Invalid {} spec \"{}\"", spec.kind(), spec.id()))?;
    print_json(&quantities)
}
