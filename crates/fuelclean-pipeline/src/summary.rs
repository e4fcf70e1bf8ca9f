//! Summary projection
//!
//! One row per canonical category in a fixed display order, each carrying the
//! category's aggregate unified-fuel total, its share of the displayed total,
//! and presentation copied from a representative data record. The renderer
//! turns this into the summary sheet and its pie chart.

use std::collections::HashMap;

use fuelclean_core::{columns, Category, Style, Table};
use serde::Serialize;

use crate::categorize::FoldMap;

/// One summary line
#[derive(Clone, Debug, Serialize)]
pub struct SummaryRow {
    pub category: Category,
    pub label: String,
    pub total: f64,
    /// Fraction of the displayed grand total, 0.0 when nothing was displayed
    pub share: f64,
    /// Style for the label cell, from the representative record's category field
    #[serde(skip)]
    pub label_style: Style,
    /// Style for the value cell, from the representative record's unified-fuel field
    #[serde(skip)]
    pub value_style: Style,
}

/// The projected summary, in display order
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
    pub grand_total: f64,
}

/// Aggregate the cleaned table into the fixed-order summary
pub fn project_summary(table: &Table, folds: &FoldMap) -> Summary {
    let mut totals: HashMap<Category, f64> = HashMap::new();
    let mut representatives: HashMap<Category, (Style, Style)> = HashMap::new();

    for row in 1..table.height() {
        let key = table
            .value(row, columns::DESCRIPTION)
            .as_key_text()
            .trim()
            .to_string();
        let category_text = folds
            .get(&key)
            .map(|s| s.category.clone())
            .unwrap_or_else(|| {
                table
                    .value(row, columns::INTERVENTION)
                    .as_key_text()
                    .trim()
                    .to_string()
            });
        let Some(category) = Category::parse(&category_text) else {
            continue;
        };

        let unified = table.value(row, columns::UNIFIED_FUEL).to_number_lossy();
        *totals.entry(category).or_insert(0.0) += unified;
        representatives.entry(category).or_insert_with(|| {
            (
                table.style(row, columns::INTERVENTION),
                table.style(row, columns::UNIFIED_FUEL),
            )
        });
    }

    let grand_total: f64 = Category::DISPLAY_ORDER
        .iter()
        .map(|c| totals.get(c).copied().unwrap_or(0.0))
        .sum();

    let rows = Category::DISPLAY_ORDER
        .iter()
        .map(|&category| {
            let total = totals.get(&category).copied().unwrap_or(0.0);
            let (label_style, value_style) =
                representatives.get(&category).cloned().unwrap_or_default();
            SummaryRow {
                category,
                label: category.display_label().to_string(),
                total,
                share: if grand_total > 0.0 { total / grand_total } else { 0.0 },
                label_style,
                value_style,
            }
        })
        .collect();

    Summary { rows, grand_total }
}
