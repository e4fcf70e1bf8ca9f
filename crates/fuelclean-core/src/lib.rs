//! # fuelclean-core
//!
//! Core table model and shared types for the fuelclean pipeline.
//!
//! This crate provides:
//! - Spreadsheet-shaped types: `Table`, `Cell`, `Value`, `Style`, `MergeSpan`
//! - Canonical intervention categories with their fills and display order
//! - Pipeline configuration, progress reporting, and error types
//!
//! ## Example
//!
//! ```rust
//! use fuelclean_core::{Cell, Table, Value};
//!
//! let mut table = Table::new("Total Distribution");
//! table.push_row(vec![Cell::text("INTERVENTION"), Cell::text("AGENCY")]);
//! table.push_row(vec![Cell::text("HEALTH"), Cell::text("Acme")]);
//! assert_eq!(table.height(), 2);
//! assert_eq!(table.value(1, 0), &Value::Text("HEALTH".into()));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod category;
pub mod columns;
pub mod config;
pub mod progress;

pub use category::Category;
pub use config::{CleanConfig, SourceSpec};
pub use progress::{CollectingProgress, NullProgress, ProgressSink};

// ============================================================================
// Type Aliases
// ============================================================================

/// 24-bit RGB color, `0xRRGGBB`
pub type Rgb = u32;

// ============================================================================
// Value
// ============================================================================

/// The logical content of a cell.
///
/// `Formula` survives only until the freeze stage; every later stage sees
/// numbers, text, or empties.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    /// A formula expression whose computed value lives in the cached view
    Formula(String),
}

static EMPTY_VALUE: Value = Value::Empty;

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, Value::Formula(_))
    }

    /// Empty, or text that trims to nothing
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view with spreadsheet coercion: text is trimmed and
    /// de-comma'd before parsing, anything unparseable counts as zero.
    pub fn to_number_lossy(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Text(s) => {
                let s = s.trim().replace(',', "");
                if s.is_empty() {
                    0.0
                } else {
                    s.parse::<f64>().unwrap_or(0.0)
                }
            }
            _ => 0.0,
        }
    }

    /// Text rendering used when concatenating description keys.
    ///
    /// Integral numbers render without a decimal point so that `10` and `10.0`
    /// produce the same key.
    pub fn as_key_text(&self) -> String {
        match self {
            Value::Empty => String::new(),
            Value::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            Value::Number(n) => format!("{n}"),
            Value::Text(s) => s.clone(),
            Value::Formula(f) => f.clone(),
        }
    }
}

// ============================================================================
// Style
// ============================================================================

/// Font attributes carried with a cell
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub bold: bool,
    pub italic: bool,
    pub size: Option<f64>,
    pub color: Option<Rgb>,
}

/// Border weight applied uniformly to all four edges
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderKind {
    #[default]
    None,
    Thin,
    Medium,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalAlign {
    #[default]
    General,
    Left,
    Center,
    Right,
}

/// Per-cell presentation.
///
/// Opaque to the pipeline except at two points: the colorizer overwrites
/// `fill`, and the synthesizer copies whole styles from a policy-named source
/// column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub font: Font,
    pub fill: Option<Rgb>,
    pub border: BorderKind,
    pub align: HorizontalAlign,
    pub num_format: Option<String>,
    pub locked: bool,
}

// ============================================================================
// Cell
// ============================================================================

/// A (value, presentation) pair
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub value: Value,
    pub style: Style,
}

impl Cell {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self {
            value: Value::Text(s.into()),
            style: Style::default(),
        }
    }

    pub fn number(n: f64) -> Self {
        Self {
            value: Value::Number(n),
            style: Style::default(),
        }
    }

    pub fn formula(expr: impl Into<String>) -> Self {
        Self {
            value: Value::Formula(expr.into()),
            style: Style::default(),
        }
    }

    /// Attach a style (builder pattern)
    pub fn styled(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

// ============================================================================
// MergeSpan
// ============================================================================

/// An inclusive rectangular merged region
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSpan {
    pub first_row: usize,
    pub last_row: usize,
    pub first_col: usize,
    pub last_col: usize,
}

impl MergeSpan {
    pub fn new(first_row: usize, last_row: usize, first_col: usize, last_col: usize) -> Self {
        Self {
            first_row,
            last_row,
            first_col,
            last_col,
        }
    }

    /// Does the column span intersect the inclusive range `[lo, hi]`?
    pub fn intersects_cols(&self, lo: usize, hi: usize) -> bool {
        !(self.last_col < lo || self.first_col > hi)
    }
}

// ============================================================================
// Table
// ============================================================================

/// An in-memory sheet: ordered rows of cells at shared column positions plus
/// the merged regions laid over them.
///
/// Rows are padded to a common width on insertion, so column position is the
/// sole addressing mechanism. Pipeline stages treat `merges` as presentation
/// metadata: transforms run on flattened tables and merges are reconstructed
/// in a final pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    rows: Vec<Vec<Cell>>,
    pub merges: Vec<MergeSpan>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            merges: Vec::new(),
        }
    }

    /// Build a table from finished rows (pads them to a shared width)
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut table = Self::new(name);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (shared across all rows)
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Append a row, padding it (and, if wider, every existing row) so all
    /// rows share one width
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        let width = self.width().max(row.len());
        row.resize(width, Cell::empty());
        for existing in &mut self.rows {
            existing.resize(width, Cell::empty());
        }
        self.rows.push(row);
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        &self.rows[row]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Value at a coordinate; out-of-range reads as `Empty`
    pub fn value(&self, row: usize, col: usize) -> &Value {
        self.cell(row, col).map_or(&EMPTY_VALUE, |c| &c.value)
    }

    /// Style at a coordinate; out-of-range reads as the default style
    pub fn style(&self, row: usize, col: usize) -> Style {
        self.cell(row, col).map(|c| c.style.clone()).unwrap_or_default()
    }

    /// Write a cell, growing the table as needed
    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        let width = self.width().max(col + 1);
        while self.rows.len() <= row {
            self.rows.push(vec![Cell::empty(); width]);
        }
        for existing in &mut self.rows {
            existing.resize(width, Cell::empty());
        }
        self.rows[row][col] = cell;
    }

    /// Locate a header column in row 0 by normalized name
    pub fn find_header(&self, name: &str) -> Option<usize> {
        let sought = normalize_label(name);
        self.rows.first().and_then(|header| {
            header.iter().position(|cell| match &cell.value {
                Value::Text(s) => normalize_label(s) == sought,
                _ => false,
            })
        })
    }

    /// A copy with an empty column inserted at `at`. Merges do not survive
    /// structural edits.
    pub fn with_column_inserted(&self, at: usize) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.insert(at.min(row.len()), Cell::empty());
                row
            })
            .collect();
        Table::from_rows(self.name.clone(), rows)
    }

    /// A copy with the inclusive column range `[lo, hi]` removed
    pub fn with_columns_removed(&self, lo: usize, hi: usize) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(c, _)| *c < lo || *c > hi)
                    .map(|(_, cell)| cell.clone())
                    .collect()
            })
            .collect();
        Table::from_rows(self.name.clone(), rows)
    }

    /// A copy keeping only rows the predicate accepts (index, row)
    pub fn with_rows_retained(&self, mut keep: impl FnMut(usize, &[Cell]) -> bool) -> Table {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(i, row)| keep(*i, row))
            .map(|(_, row)| row.clone())
            .collect();
        Table::from_rows(self.name.clone(), rows)
    }
}

/// Normalize a header or sheet label: trim, collapse internal whitespace,
/// uppercase
pub fn normalize_label(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

// ============================================================================
// Errors
// ============================================================================

/// Fatal pipeline error, reported to the caller as a message
#[derive(Debug, Error)]
pub enum CleanError {
    /// No configured source matched any sheet in any input
    #[error("no usable source sheet found; sheets present: [{}]", found.join(", "))]
    SheetNotFound { found: Vec<String> },

    /// A required header column is absent after combination
    #[error("required header column \"{0}\" not found")]
    MissingHeader(String),
}

/// Output rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
