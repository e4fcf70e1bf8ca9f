//! # fuelclean-import
//!
//! Workbook reading for the fuelclean pipeline.
//!
//! Each sheet is captured twice, mirroring the double-read the pipeline
//! expects:
//! - a **live** view, where formula-bearing cells keep their expression as
//!   `Value::Formula`
//! - a **cached** view holding the last value the spreadsheet application
//!   computed for the same coordinates
//!
//! Merged regions are captured as [`MergeSpan`]s on the live table. Cell
//! formats are not part of what the container reader exposes, so imported
//! styles start at their defaults; the pipeline treats presentation as opaque
//! either way.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fuelclean_import::load_workbook;
//!
//! let source = load_workbook("distribution.xlsx").unwrap();
//! for name in &source.sheet_names {
//!     println!("sheet: {name}");
//! }
//! ```

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use thiserror::Error;
use tracing::debug;

use fuelclean_core::{Cell, MergeSpan, Table, Value};

/// Workbook reading error
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to open workbook {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("failed to read sheet \"{sheet}\": {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::XlsxError,
    },
}

/// One sheet in both views
#[derive(Clone, Debug)]
pub struct SheetSource {
    /// Formulas preserved as `Value::Formula`, merges captured
    pub live: Table,
    /// Last-computed values at the same coordinates
    pub cached: Table,
}

/// A fully loaded workbook
#[derive(Clone, Debug, Default)]
pub struct WorkbookSource {
    /// Sheet names in workbook order
    pub sheet_names: Vec<String>,
    sheets: Vec<SheetSource>,
}

impl WorkbookSource {
    /// Assemble a source from already-built sheets, for callers that
    /// synthesize input in memory (notably tests)
    pub fn from_sheets(sheets: Vec<(String, SheetSource)>) -> Self {
        let (sheet_names, sheets) = sheets.into_iter().unzip();
        Self {
            sheet_names,
            sheets,
        }
    }

    /// Look up a sheet by exact name
    pub fn sheet(&self, name: &str) -> Option<&SheetSource> {
        self.sheet_names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.sheets[i])
    }
}

/// Read a workbook eagerly into live + cached table views.
///
/// Unreadable individual sheets fail the whole load; callers treat an
/// unreadable *container* as a per-source skip.
pub fn load_workbook(path: impl AsRef<Path>) -> Result<WorkbookSource, ImportError> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|source| ImportError::Open {
        path: path.display().to_string(),
        source,
    })?;

    // Merge metadata is not parsed by default
    workbook
        .load_merged_regions()
        .map_err(|source| ImportError::Open {
            path: path.display().to_string(),
            source,
        })?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in &sheet_names {
        let values = workbook
            .worksheet_range(name)
            .map_err(|source| ImportError::Sheet {
                sheet: name.clone(),
                source,
            })?;
        let formulas = workbook
            .worksheet_formula(name)
            .map_err(|source| ImportError::Sheet {
                sheet: name.clone(),
                source,
            })?;

        let cached = values_to_table(name, &values);
        let mut live = overlay_formulas(cached.clone(), &formulas);
        live.merges = workbook
            .merged_regions_by_sheet(name)
            .iter()
            .map(|(_, _, dims)| {
                MergeSpan::new(
                    dims.start.0 as usize,
                    dims.end.0 as usize,
                    dims.start.1 as usize,
                    dims.end.1 as usize,
                )
            })
            .collect();

        debug!(
            sheet = %name,
            rows = live.height(),
            merges = live.merges.len(),
            "loaded sheet"
        );
        sheets.push(SheetSource { live, cached });
    }

    Ok(WorkbookSource {
        sheet_names,
        sheets,
    })
}

/// Build a table from a calamine value range, honoring the range's offset so
/// coordinates stay absolute (row 0 is always the sheet's first row).
fn values_to_table(name: &str, range: &calamine::Range<Data>) -> Table {
    let mut table = Table::new(name);
    let Some((row_off, col_off)) = range.start() else {
        return table;
    };
    for (r, row) in range.rows().enumerate() {
        for (c, data) in row.iter().enumerate() {
            let value = data_to_value(data);
            if !value.is_empty() {
                table.set_cell(
                    row_off as usize + r,
                    col_off as usize + c,
                    Cell {
                        value,
                        style: Default::default(),
                    },
                );
            }
        }
    }
    table
}

/// Replace cached values with `Value::Formula` wherever the formula range has
/// an expression
fn overlay_formulas(mut table: Table, formulas: &calamine::Range<String>) -> Table {
    let Some((row_off, col_off)) = formulas.start() else {
        return table;
    };
    for (r, row) in formulas.rows().enumerate() {
        for (c, expr) in row.iter().enumerate() {
            if expr.is_empty() {
                continue;
            }
            let row_abs = row_off as usize + r;
            let col_abs = col_off as usize + c;
            let style = table.style(row_abs, col_abs);
            table.set_cell(
                row_abs,
                col_abs,
                Cell {
                    value: Value::Formula(expr.clone()),
                    style,
                },
            );
        }
    }
    table
}

/// Map a calamine cell into the pipeline's value model.
///
/// Error cells degrade to empty; booleans and ISO datetimes become text.
fn data_to_value(data: &Data) -> Value {
    match data {
        Data::Empty | Data::Error(_) => Value::Empty,
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) => Value::Number(*f),
        Data::String(s) => Value::Text(s.clone()),
        Data::Bool(b) => Value::Text(if *b { "TRUE".into() } else { "FALSE".into() }),
        Data::DateTime(dt) => Value::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn data_mapping() {
        assert_eq!(data_to_value(&Data::Empty), Value::Empty);
        assert_eq!(data_to_value(&Data::Int(3)), Value::Number(3.0));
        assert_eq!(data_to_value(&Data::Float(1.5)), Value::Number(1.5));
        assert_eq!(
            data_to_value(&Data::String("x".into())),
            Value::Text("x".into())
        );
        assert_eq!(data_to_value(&Data::Bool(true)), Value::Text("TRUE".into()));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = load_workbook("/nonexistent/path/workbook.xlsx").unwrap_err();
        assert!(matches!(err, ImportError::Open { .. }));
        assert!(err.to_string().contains("workbook.xlsx"));
    }
}
