//! Row coloring by category
//!
//! Genuine members of a canonical category get that category's fill across
//! the leading column span. Folded records stay unfilled so they read apart
//! from genuine members of the fallback category, as do records with no
//! recognizable category.

use fuelclean_core::{columns, Category, Cell, Table};

use crate::categorize::FoldMap;

/// Apply the category fills in place
pub fn colorize(table: &mut Table, folds: &FoldMap) {
    for row in 1..table.height() {
        let key = table
            .value(row, columns::DESCRIPTION)
            .as_key_text()
            .trim()
            .to_string();
        let Some(state) = folds.get(&key) else {
            continue;
        };
        if state.folded {
            continue;
        }
        let Some(category) = Category::parse(&state.category) else {
            continue;
        };

        let fill = category.fill();
        for col in 0..=columns::COLOR_SPAN_END {
            let value = table.value(row, col).clone();
            let mut style = table.style(row, col);
            style.fill = Some(fill);
            table.set_cell(row, col, Cell { value, style });
        }
    }
}
