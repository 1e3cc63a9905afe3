//! # Grid Geometry
//!
//! A floor is laid out on two ordered sequences of labelled grid lines:
//! `rows` (positions along Y, labelled `A, B, C…`) and `cols` (positions
//! along X, labelled `1, 2, 3…`). This module turns those lines into beam
//! segment lengths and slab areas, and checks grid integrity.
//!
//! ## Flat Slot Encoding
//!
//! Assignments are stored in flat arrays whose positions are fixed by these
//! formulas (the editing layer depends on them positionally):
//!
//! ```text
//! X-direction beams (along a row):    row * (num_cols - 1) + col_gap
//! Y-direction beams (along a column): col * (num_rows - 1) + row_gap
//! Columns (grid intersections):       row * num_cols + col
//! ```
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::grid::GridSystem;
//!
//! let grid = GridSystem::uniform(3, 4, 4.0, 5.0);
//! let area = grid.area("C", "C", "4", "4");
//! assert!(area.is_valid);
//! assert_eq!(area.area, 20.0);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Cell pitch used along the row direction when a floor has a single row line
pub const DEFAULT_ROW_SPACING_M: f64 = 4.0;

/// Cell pitch used along the column direction when a floor has a single column line
pub const DEFAULT_COL_SPACING_M: f64 = 5.0;

/// A labelled coordinate line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    /// Display label ("A", "B" for rows; "1", "2" for columns)
    pub label: String,
    /// Position along the axis in meters
    pub position: f64,
}

impl GridLine {
    pub fn new(label: impl Into<String>, position: f64) -> Self {
        GridLine {
            label: label.into(),
            position,
        }
    }
}

/// Distance between two grid lines in meters.
pub fn segment_length(a: &GridLine, b: &GridLine) -> f64 {
    (b.position - a.position).abs()
}

/// Beam run direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeamDirection {
    /// Along a row, spanning between adjacent columns
    X,
    /// Along a column, spanning between adjacent rows
    Y,
}

/// One beam span between two adjacent grid lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSegment {
    pub direction: BeamDirection,
    /// Index into `col_beam_ids` (X) or `row_beam_ids` (Y)
    pub slot: usize,
    /// e.g. "A1-A2" (X) or "A1-B1" (Y)
    pub label: String,
    pub length_m: f64,
}

/// Row and column lines of one floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSystem {
    pub rows: Vec<GridLine>,
    pub cols: Vec<GridLine>,
}

impl GridSystem {
    pub fn new(rows: Vec<GridLine>, cols: Vec<GridLine>) -> Self {
        GridSystem { rows, cols }
    }

    /// Evenly spaced grid starting at position 0.
    ///
    /// Rows are labelled `A…Z, AA, AB…`; columns `1, 2, 3…`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use takeoff_core::grid::GridSystem;
    ///
    /// let grid = GridSystem::uniform(2, 3, 4.0, 6.0);
    /// assert_eq!(grid.rows[1].label, "B");
    /// assert_eq!(grid.cols[2].position, 12.0);
    /// ```
    pub fn uniform(num_rows: usize, num_cols: usize, row_spacing_m: f64, col_spacing_m: f64) -> Self {
        let rows = (0..num_rows)
            .map(|i| GridLine::new(row_label(i), i as f64 * row_spacing_m))
            .collect();
        let cols = (0..num_cols)
            .map(|i| GridLine::new((i + 1).to_string(), i as f64 * col_spacing_m))
            .collect();
        GridSystem { rows, cols }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    /// Expected length of `col_beam_ids`: `num_rows * (num_cols - 1)`
    pub fn col_beam_slots(&self) -> usize {
        self.num_rows() * self.num_cols().saturating_sub(1)
    }

    /// Expected length of `row_beam_ids`: `num_cols * (num_rows - 1)`
    pub fn row_beam_slots(&self) -> usize {
        self.num_cols() * self.num_rows().saturating_sub(1)
    }

    /// Expected length of `column_ids`: `num_rows * num_cols`
    pub fn column_slots(&self) -> usize {
        self.num_rows() * self.num_cols()
    }

    /// Slot of the X-direction beam on `row` between columns `col_gap` and `col_gap + 1`.
    pub fn col_beam_index(&self, row: usize, col_gap: usize) -> usize {
        row * self.num_cols().saturating_sub(1) + col_gap
    }

    /// Slot of the Y-direction beam on `col` between rows `row_gap` and `row_gap + 1`.
    pub fn row_beam_index(&self, col: usize, row_gap: usize) -> usize {
        col * self.num_rows().saturating_sub(1) + row_gap
    }

    /// Slot of the column at the intersection of `row` and `col`.
    pub fn column_index(&self, row: usize, col: usize) -> usize {
        row * self.num_cols() + col
    }

    /// Inverse of [`column_index`](Self::column_index). `None` if the slot lies outside the grid.
    pub fn cell_of(&self, index: usize) -> Option<(usize, usize)> {
        let num_cols = self.num_cols();
        if num_cols == 0 {
            return None;
        }
        let (row, col) = (index / num_cols, index % num_cols);
        (row < self.num_rows()).then_some((row, col))
    }

    /// Intersection label such as "B3".
    pub fn position_label(&self, row: usize, col: usize) -> Option<String> {
        let row_line = self.rows.get(row)?;
        let col_line = self.cols.get(col)?;
        Some(format!("{}{}", row_line.label, col_line.label))
    }

    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.rows.iter().position(|l| l.label == label)
    }

    pub fn col_index(&self, label: &str) -> Option<usize> {
        self.cols.iter().position(|l| l.label == label)
    }

    /// X-direction segments, row by row, in slot order.
    pub fn x_segments(&self) -> Vec<GridSegment> {
        let mut segments = Vec::with_capacity(self.col_beam_slots());
        for (r, row) in self.rows.iter().enumerate() {
            for (c, pair) in self.cols.windows(2).enumerate() {
                segments.push(GridSegment {
                    direction: BeamDirection::X,
                    slot: self.col_beam_index(r, c),
                    label: format!("{}{}-{}{}", row.label, pair[0].label, row.label, pair[1].label),
                    length_m: segment_length(&pair[0], &pair[1]),
                });
            }
        }
        segments
    }

    /// Y-direction segments, column by column, in slot order.
    pub fn y_segments(&self) -> Vec<GridSegment> {
        let mut segments = Vec::with_capacity(self.row_beam_slots());
        for (c, col) in self.cols.iter().enumerate() {
            for (r, pair) in self.rows.windows(2).enumerate() {
                segments.push(GridSegment {
                    direction: BeamDirection::Y,
                    slot: self.row_beam_index(c, r),
                    label: format!("{}{}-{}{}", pair[0].label, col.label, pair[1].label, col.label),
                    length_m: segment_length(&pair[0], &pair[1]),
                });
            }
        }
        segments
    }

    /// Area of a cell or span. See [`calculate_grid_area`].
    pub fn area(&self, start_row: &str, end_row: &str, start_col: &str, end_col: &str) -> AreaResult {
        calculate_grid_area(start_row, end_row, start_col, end_col, &self.rows, &self.cols)
    }

    /// Integrity check. See [`validate_grid_system`].
    pub fn validate(&self) -> GridValidation {
        validate_grid_system(&self.rows, &self.cols)
    }
}

/// Spreadsheet-style row label: 0 → "A", 25 → "Z", 26 → "AA".
fn row_label(mut index: usize) -> String {
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

/// Result of an area query. Never an `Err`: callers display `error` inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaResult {
    /// width * length (m²)
    pub area: f64,
    /// Extent along the row direction (m)
    pub width: f64,
    /// Extent along the column direction (m)
    pub length: f64,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AreaResult {
    fn invalid(error: impl Into<String>) -> Self {
        AreaResult {
            area: 0.0,
            width: 0.0,
            length: 0.0,
            is_valid: false,
            error: Some(error.into()),
        }
    }
}

/// Pitch of the single cell starting at `index`.
///
/// Uses the gap to the next line; the last line reuses the gap before it,
/// and a lone line falls back to `fallback`.
fn cell_pitch(lines: &[GridLine], index: usize, fallback: f64) -> f64 {
    match (lines.get(index), lines.get(index + 1)) {
        (Some(line), Some(next)) => next.position - line.position,
        (Some(line), None) if index > 0 => line.position - lines[index - 1].position,
        _ => fallback,
    }
}

/// Resolve a rectangular selection of grid labels into physical dimensions.
///
/// A single cell (`start == end` on both axes) takes its size from the
/// spacing to the next grid line; a cell on the last line inherits the
/// previous spacing. A span uses the distance between its bounding lines.
///
/// # Example
///
/// ```rust
/// use takeoff_core::grid::{calculate_grid_area, GridLine};
///
/// let rows = vec![GridLine::new("A", 0.0), GridLine::new("B", 4.0)];
/// let cols = vec![GridLine::new("1", 0.0), GridLine::new("2", 5.0), GridLine::new("3", 10.0)];
///
/// let span = calculate_grid_area("A", "B", "1", "3", &rows, &cols);
/// assert_eq!(span.area, 40.0);
///
/// let missing = calculate_grid_area("A", "Z", "1", "2", &rows, &cols);
/// assert!(!missing.is_valid);
/// ```
pub fn calculate_grid_area(
    start_row: &str,
    end_row: &str,
    start_col: &str,
    end_col: &str,
    rows: &[GridLine],
    cols: &[GridLine],
) -> AreaResult {
    if rows.is_empty() || cols.is_empty() {
        return AreaResult::invalid("Grid is incomplete: rows or columns are empty");
    }

    let find = |lines: &[GridLine], label: &str| lines.iter().position(|l| l.label == label);
    let lookups = [
        ("start row", start_row, find(rows, start_row)),
        ("end row", end_row, find(rows, end_row)),
        ("start column", start_col, find(cols, start_col)),
        ("end column", end_col, find(cols, end_col)),
    ];

    let missing: Vec<String> = lookups
        .iter()
        .filter(|(_, _, index)| index.is_none())
        .map(|(what, label, _)| format!("{what} \"{label}\""))
        .collect();
    let (Some(sr), Some(er), Some(sc), Some(ec)) = (lookups[0].2, lookups[1].2, lookups[2].2, lookups[3].2) else {
        return AreaResult::invalid(format!("Grid labels not found: {}", missing.join(", ")));
    };

    if sr > er || sc > ec {
        return AreaResult::invalid("Invalid range: start position must be before end position");
    }

    let (width, length) = if sr == er && sc == ec {
        (
            cell_pitch(rows, sr, DEFAULT_ROW_SPACING_M),
            cell_pitch(cols, sc, DEFAULT_COL_SPACING_M),
        )
    } else {
        (
            (rows[er].position - rows[sr].position).abs(),
            (cols[ec].position - cols[sc].position).abs(),
        )
    };

    if width <= 0.0 || length <= 0.0 {
        return AreaResult {
            area: 0.0,
            width,
            length,
            is_valid: false,
            error: Some(format!("Invalid dimensions: width={width}, length={length}")),
        };
    }

    AreaResult {
        area: width * length,
        width,
        length,
        is_valid: true,
        error: None,
    }
}

/// Advisory grid integrity report. An empty `errors` list means valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

fn duplicate_labels(lines: &[GridLine]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for line in lines {
        if !seen.insert(line.label.as_str()) && !duplicates.contains(&line.label.as_str()) {
            duplicates.push(line.label.as_str());
        }
    }
    duplicates
}

fn out_of_order(lines: &[GridLine]) -> Vec<String> {
    lines
        .windows(2)
        .filter(|pair| pair[1].position <= pair[0].position)
        .map(|pair| {
            format!(
                "{} ({}) after {} ({})",
                pair[1].label, pair[1].position, pair[0].label, pair[0].position
            )
        })
        .collect()
}

/// Check rows and columns for emptiness, duplicate labels and ordering.
///
/// Advisory only: nothing in the engine refuses to run on a grid that
/// fails these checks.
pub fn validate_grid_system(rows: &[GridLine], cols: &[GridLine]) -> GridValidation {
    let mut errors = Vec::new();

    if rows.is_empty() {
        errors.push("Rows are empty".to_string());
    }
    if cols.is_empty() {
        errors.push("Columns are empty".to_string());
    }

    let dup_rows = duplicate_labels(rows);
    if !dup_rows.is_empty() {
        errors.push(format!("Duplicate row labels: {}", dup_rows.join(", ")));
    }
    let dup_cols = duplicate_labels(cols);
    if !dup_cols.is_empty() {
        errors.push(format!("Duplicate column labels: {}", dup_cols.join(", ")));
    }

    let bad_rows = out_of_order(rows);
    if !bad_rows.is_empty() {
        errors.push(format!(
            "Row positions must be strictly ascending: {}",
            bad_rows.join("; ")
        ));
    }
    let bad_cols = out_of_order(cols);
    if !bad_cols.is_empty() {
        errors.push(format!(
            "Column positions must be strictly ascending: {}",
            bad_cols.join("; ")
        ));
    }

    GridValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}
