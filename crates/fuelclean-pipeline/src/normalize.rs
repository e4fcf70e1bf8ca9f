//! Merge-region normalization and formula freezing
//!
//! Both transforms exist so downstream per-cell logic never special-cases
//! merged regions or live formulas: after this pair runs over a column range,
//! every covered cell holds a plain value and its own copy of the style.

use fuelclean_core::{Cell, Table, Value};

/// Dissolve every merged region intersecting columns `[lo, hi]`, writing the
/// region's top-left value and style into every cell it covered.
///
/// Idempotent: a second call finds no regions left in range. Regions outside
/// the range are kept untouched.
pub fn flatten_merges(table: &mut Table, lo: usize, hi: usize) {
    let (dissolved, kept): (Vec<_>, Vec<_>) = table
        .merges
        .iter()
        .copied()
        .partition(|span| span.intersects_cols(lo, hi));

    for span in &dissolved {
        let value = table.value(span.first_row, span.first_col).clone();
        let style = table.style(span.first_row, span.first_col);
        for row in span.first_row..=span.last_row {
            for col in span.first_col..=span.last_col {
                table.set_cell(
                    row,
                    col,
                    Cell {
                        value: value.clone(),
                        style: style.clone(),
                    },
                );
            }
        }
    }

    table.merges = kept;
}

/// Replace every formula-bearing cell with the parallel cached table's value
/// at the same coordinates.
///
/// A formula with no cached counterpart degrades to `Empty`; the caller
/// accepts this as a documented limitation of the double-read input, not an
/// error.
pub fn freeze_formulas(table: &mut Table, cached: &Table) {
    for row in 0..table.height() {
        for col in 0..table.width() {
            if table.value(row, col).is_formula() {
                let frozen = cached.value(row, col).clone();
                let frozen = if frozen.is_formula() { Value::Empty } else { frozen };
                let style = table.style(row, col);
                table.set_cell(
                    row,
                    col,
                    Cell {
                        value: frozen,
                        style,
                    },
                );
            }
        }
    }
}
