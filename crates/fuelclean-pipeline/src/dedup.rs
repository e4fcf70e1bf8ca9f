//! Deduplication by description key
//!
//! One pass, top to bottom, over the already-sorted rows: the first
//! occurrence of each trimmed description key wins. Must run strictly after
//! the sort, which is what makes "first" meaningful.

use std::collections::HashSet;

use fuelclean_core::{columns, Table};

/// Rebuild the table keeping only the first row for each description key.
/// A blank key participates as the empty string, so at most one blank-keyed
/// row survives.
pub fn dedup_rows(table: &Table) -> Table {
    let mut seen: HashSet<String> = HashSet::new();
    table.with_rows_retained(|row, cells| {
        if row == 0 {
            return true;
        }
        let key = cells
            .get(columns::DESCRIPTION)
            .map(|c| c.value.as_key_text())
            .unwrap_or_default()
            .trim()
            .to_string();
        seen.insert(key)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelclean_core::{Cell, Value};
    use pretty_assertions::assert_eq;

    fn row(key: &str, fuel: f64) -> Vec<Cell> {
        vec![
            Cell::text("HEALTH"),
            Cell::text("agency"),
            Cell::text("site"),
            Cell::number(fuel),
            Cell::text(key),
            Cell::number(fuel),
        ]
    }

    fn table(rows: Vec<Vec<Cell>>) -> Table {
        let mut all = vec![vec![
            Cell::text("INTERVENTION"),
            Cell::text("AGENCY"),
            Cell::text("SITE"),
            Cell::text("Fuel sum"),
            Cell::text("Description Sum"),
            Cell::text("Unified Fuel"),
        ]];
        all.extend(rows);
        Table::from_rows("t", all)
    }

    #[test]
    fn first_occurrence_wins() {
        let t = table(vec![row("A,B,C", 20.0), row("A,B,C", 15.0), row("X,Y,Z", 1.0)]);
        let out = dedup_rows(&t);
        assert_eq!(out.height(), 3);
        assert_eq!(out.value(1, 3), &Value::Number(20.0));
        assert_eq!(out.value(2, 4), &Value::Text("X,Y,Z".into()));
    }

    #[test]
    fn keys_are_trimmed_before_comparison() {
        let t = table(vec![row("A,B,C", 1.0), row("  A,B,C  ", 2.0)]);
        let out = dedup_rows(&t);
        assert_eq!(out.height(), 2);
    }

    #[test]
    fn blank_keys_collapse_to_one_row() {
        let t = table(vec![row("", 1.0), row("   ", 2.0), row("", 3.0)]);
        let out = dedup_rows(&t);
        assert_eq!(out.height(), 2);
        assert_eq!(out.value(1, 3), &Value::Number(1.0));
    }

    #[test]
    fn dedup_is_idempotent() {
        let t = table(vec![row("A", 1.0), row("A", 2.0), row("B", 3.0)]);
        let once = dedup_rows(&t);
        let twice = dedup_rows(&once);
        assert_eq!(once, twice);
    }
}
