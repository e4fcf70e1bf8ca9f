//! Row filtering
//!
//! Every filter rebuilds the table from the surviving rows rather than
//! deleting in place, so no stage ever reasons about shifting indices.

use fuelclean_core::{Table, Value};

/// Drop the second header row, collapsing the two-row input header to one
pub fn strip_second_header_row(table: &Table) -> Table {
    table.with_rows_retained(|row, _| row != 1)
}

/// Drop every data row whose first three columns contain the token TOTAL
/// (case-insensitive substring). The header row is never considered.
pub fn strip_total_rows(table: &Table) -> Table {
    table.with_rows_retained(|row, cells| {
        if row == 0 {
            return true;
        }
        !cells.iter().take(3).any(|cell| match &cell.value {
            Value::Text(s) => s.to_uppercase().contains("TOTAL"),
            _ => false,
        })
    })
}

/// Drop every data row whose cell in `fuel_col` is blank or reads as zero
pub fn strip_zero_fuel_rows(table: &Table, fuel_col: usize) -> Table {
    table.with_rows_retained(|row, cells| {
        if row == 0 {
            return true;
        }
        let value = cells.get(fuel_col).map_or(&Value::Empty, |c| &c.value);
        !(value.is_blank() || value.to_number_lossy() == 0.0)
    })
}
