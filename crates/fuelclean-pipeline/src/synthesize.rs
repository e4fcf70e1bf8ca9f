//! Derived-column synthesis
//!
//! Four columns are synthesized over the pipeline's life: the per-row fuel
//! sum, the description key, the group-unified fuel, and the per-category
//! total. Each new cell is written "in the style of" a fixed source column
//! named once in [`style_source`]; nothing is inferred from whatever cell
//! happens to sit nearby.

use std::collections::HashMap;

use fuelclean_core::{columns, Cell, Table, Value};

/// Style-provenance policy: for each synthesized column (and the provenance
/// stamp), the fixed column its style is copied from.
pub mod style_source {
    use fuelclean_core::columns;

    /// Provenance stamp copies the pre-insert leading column (post-insert: 1)
    pub const LABEL_STAMP: usize = 1;
    /// Fuel sum copies the first raw fuel column
    pub const FUEL_SUM: usize = columns::RAW_FUEL_A;
    /// Description key copies the intervention column
    pub const DESCRIPTION: usize = columns::INTERVENTION;
    /// Unified fuel copies the (collapsed) fuel sum column
    pub const UNIFIED_FUEL: usize = columns::FUEL_SUM;
    /// Category total copies the unified fuel column
    pub const CATEGORY_TOTAL: usize = columns::UNIFIED_FUEL;
}

fn header_cell(table: &Table, text: &str, style_col: usize) -> Cell {
    Cell::text(text).styled(table.style(0, style_col))
}

/// Write `Fuel sum` into the staged column: the two raw fuel quantities
/// added, with unparseable operands coerced to zero. Rows where both
/// operands are empty stay empty so the zero-row filter can drop them.
pub fn build_fuel_sum(table: &Table) -> Table {
    let mut out = table.clone();
    out.set_cell(
        0,
        columns::FUEL_SUM_STAGED,
        header_cell(table, columns::HEADER_FUEL_SUM, style_source::FUEL_SUM),
    );

    for row in 1..table.height() {
        let a = table.value(row, columns::RAW_FUEL_A);
        let b = table.value(row, columns::RAW_FUEL_B);
        let value = if a.is_empty() && b.is_empty() {
            Value::Empty
        } else {
            Value::Number(a.to_number_lossy() + b.to_number_lossy())
        };
        let style = table.style(row, style_source::FUEL_SUM);
        out.set_cell(row, columns::FUEL_SUM_STAGED, Cell { value, style });
    }
    out
}

/// Drop the two raw fuel columns; the staged fuel sum slides into their place
pub fn collapse_raw_fuel(table: &Table) -> Table {
    table.with_columns_removed(columns::RAW_FUEL_A, columns::RAW_FUEL_B)
}

/// Insert the description-key column: the first three fields joined with
/// commas. This key is the record's identity from here on.
pub fn build_description_keys(table: &Table) -> Table {
    let mut out = table.with_column_inserted(columns::DESCRIPTION);
    out.set_cell(
        0,
        columns::DESCRIPTION,
        header_cell(table, columns::HEADER_DESCRIPTION, style_source::DESCRIPTION),
    );

    for row in 1..table.height() {
        let key = format!(
            "{},{},{}",
            table.value(row, columns::INTERVENTION).as_key_text(),
            table.value(row, columns::AGENCY).as_key_text(),
            table.value(row, columns::SITE).as_key_text(),
        );
        let style = table.style(row, style_source::DESCRIPTION);
        out.set_cell(
            row,
            columns::DESCRIPTION,
            Cell {
                value: Value::Text(key),
                style,
            },
        );
    }
    out
}

/// Insert the group-unified fuel column: for every row, the sum of the fuel
/// sums across all rows sharing its description key. Two passes: accumulate
/// the key totals, then look each row's total up.
pub fn build_unified_fuel(table: &Table) -> Table {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for row in 1..table.height() {
        let key = table.value(row, columns::DESCRIPTION).as_key_text();
        let fuel = table.value(row, columns::FUEL_SUM).to_number_lossy();
        *totals.entry(key).or_insert(0.0) += fuel;
    }

    let mut out = table.with_column_inserted(columns::UNIFIED_FUEL);
    out.set_cell(
        0,
        columns::UNIFIED_FUEL,
        header_cell(table, columns::HEADER_UNIFIED_FUEL, style_source::UNIFIED_FUEL),
    );
    for row in 1..table.height() {
        let key = table.value(row, columns::DESCRIPTION).as_key_text();
        let style = table.style(row, style_source::UNIFIED_FUEL);
        out.set_cell(
            row,
            columns::UNIFIED_FUEL,
            Cell {
                value: Value::Number(totals.get(&key).copied().unwrap_or(0.0)),
                style,
            },
        );
    }
    out
}

/// Insert the per-category total column: for every row, the sum of unified
/// fuel across all rows sharing its (final, possibly folded) category.
pub fn build_category_totals(table: &Table) -> Table {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for row in 1..table.height() {
        let category = table.value(row, columns::INTERVENTION).as_key_text().trim().to_string();
        let fuel = table.value(row, columns::UNIFIED_FUEL).to_number_lossy();
        *totals.entry(category).or_insert(0.0) += fuel;
    }

    let mut out = table.with_column_inserted(columns::CATEGORY_TOTAL);
    out.set_cell(
        0,
        columns::CATEGORY_TOTAL,
        header_cell(
            table,
            columns::HEADER_CATEGORY_TOTAL,
            style_source::CATEGORY_TOTAL,
        ),
    );
    for row in 1..table.height() {
        let category = table.value(row, columns::INTERVENTION).as_key_text().trim().to_string();
        let style = table.style(row, style_source::CATEGORY_TOTAL);
        out.set_cell(
            row,
            columns::CATEGORY_TOTAL,
            Cell {
                value: Value::Number(totals.get(&category).copied().unwrap_or(0.0)),
                style,
            },
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelclean_core::Style;
    use pretty_assertions::assert_eq;

    fn base_table() -> Table {
        Table::from_rows(
            "t",
            vec![
                vec![
                    Cell::text("INTERVENTION"),
                    Cell::text("AGENCY"),
                    Cell::text("SITE"),
                    Cell::text("BENZENE"),
                    Cell::text("DIESEL"),
                ],
                vec![
                    Cell::text("HEALTH"),
                    Cell::text("Acme"),
                    Cell::text("North"),
                    Cell::number(10.0),
                    Cell::number(5.0),
                ],
                vec![
                    Cell::text("WASH"),
                    Cell::text("Beta"),
                    Cell::text("South"),
                    Cell::empty(),
                    Cell::empty(),
                ],
                vec![
                    Cell::text("WASH"),
                    Cell::text("Beta"),
                    Cell::text("South"),
                    Cell::text("bad"),
                    Cell::number(2.0),
                ],
            ],
        )
    }

    #[test]
    fn fuel_sum_adds_with_lossy_coercion() {
        let out = build_fuel_sum(&base_table());
        assert_eq!(out.value(0, 5), &Value::Text("Fuel sum".into()));
        assert_eq!(out.value(1, 5), &Value::Number(15.0));
        // Both operands empty stays empty
        assert_eq!(out.value(2, 5), &Value::Empty);
        // Unparseable operand counts as zero
        assert_eq!(out.value(3, 5), &Value::Number(2.0));
    }

    #[test]
    fn fuel_sum_copies_policy_style() {
        let mut t = base_table();
        t.set_cell(
            1,
            3,
            Cell::number(10.0).styled(Style {
                num_format: Some("#,##0.0".into()),
                ..Style::default()
            }),
        );
        let out = build_fuel_sum(&t);
        assert_eq!(out.style(1, 5).num_format.as_deref(), Some("#,##0.0"));
    }

    #[test]
    fn collapse_moves_fuel_sum_into_place() {
        let out = collapse_raw_fuel(&build_fuel_sum(&base_table()));
        assert_eq!(out.width(), 4);
        assert_eq!(out.value(0, columns::FUEL_SUM), &Value::Text("Fuel sum".into()));
        assert_eq!(out.value(1, columns::FUEL_SUM), &Value::Number(15.0));
    }

    #[test]
    fn description_key_concatenates_first_three_fields() {
        let out = build_description_keys(&collapse_raw_fuel(&build_fuel_sum(&base_table())));
        assert_eq!(
            out.value(1, columns::DESCRIPTION),
            &Value::Text("HEALTH,Acme,North".into())
        );
        assert_eq!(
            out.value(2, columns::DESCRIPTION),
            &Value::Text("WASH,Beta,South".into())
        );
    }

    #[test]
    fn unified_fuel_sums_across_shared_keys() {
        let out = build_unified_fuel(&build_description_keys(&collapse_raw_fuel(&build_fuel_sum(
            &base_table(),
        ))));
        // HEALTH row alone in its group
        assert_eq!(out.value(1, columns::UNIFIED_FUEL), &Value::Number(15.0));
        // Two WASH,Beta,South rows share a key: 0 (empty) + 2 = 2 each
        assert_eq!(out.value(2, columns::UNIFIED_FUEL), &Value::Number(2.0));
        assert_eq!(out.value(3, columns::UNIFIED_FUEL), &Value::Number(2.0));
    }

    #[test]
    fn category_totals_group_by_category_text() {
        let synthesized = build_unified_fuel(&build_description_keys(&collapse_raw_fuel(
            &build_fuel_sum(&base_table()),
        )));
        let out = build_category_totals(&synthesized);
        assert_eq!(
            out.value(0, columns::CATEGORY_TOTAL),
            &Value::Text("Total Sum Per Category".into())
        );
        assert_eq!(out.value(1, columns::CATEGORY_TOTAL), &Value::Number(15.0));
        // WASH total: 2 + 2 (both rows carry the group-unified value)
        assert_eq!(out.value(2, columns::CATEGORY_TOTAL), &Value::Number(4.0));
    }
}
