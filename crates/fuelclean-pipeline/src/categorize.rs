//! Category folding
//!
//! Records whose category is not one of the canonical interventions are
//! folded: the original category value relocates into the agency field as a
//! disambiguating prefix and the category cell is rewritten to the fallback
//! category. The fold state is keyed by description key so sort, dedup, and
//! the colorizer can consult it after rows have moved or vanished.

use std::collections::HashMap;

use fuelclean_core::{columns, Category, Cell, CleanError, Table};
use tracing::debug;

/// Final category and fold flag for one record, reachable by its description
/// key
#[derive(Clone, Debug, PartialEq)]
pub struct FoldState {
    pub category: String,
    pub folded: bool,
}

/// Fold map produced by [`categorize`]
pub type FoldMap = HashMap<String, FoldState>;

/// Apply the category-folding rules in original row order.
///
/// Fails when the AGENCY header cannot be located; the INTERVENTION header
/// falls back to the first column.
pub fn categorize(table: &mut Table) -> Result<FoldMap, CleanError> {
    let agency_col = table
        .find_header(columns::HEADER_AGENCY)
        .ok_or_else(|| CleanError::MissingHeader(columns::HEADER_AGENCY.into()))?;
    let intervention_col = table
        .find_header(columns::HEADER_INTERVENTION)
        .unwrap_or(columns::INTERVENTION);

    let mut folds = FoldMap::new();
    let mut folded_count = 0usize;

    for row in 1..table.height() {
        let key = table
            .value(row, columns::DESCRIPTION)
            .as_key_text()
            .trim()
            .to_string();
        let raw = table.value(row, intervention_col).as_key_text();
        let raw = raw.trim();

        let state = if raw.is_empty() {
            FoldState {
                category: String::new(),
                folded: false,
            }
        } else if let Some(category) = Category::parse(raw) {
            // The legacy alias is rewritten to its canonical spelling; other
            // genuine members keep their cell text as-is
            if !raw.eq_ignore_ascii_case(category.as_str()) {
                let style = table.style(row, intervention_col);
                table.set_cell(
                    row,
                    intervention_col,
                    Cell::text(category.as_str()).styled(style),
                );
            }
            FoldState {
                category: table.value(row, intervention_col).as_key_text().trim().to_string(),
                folded: false,
            }
        } else {
            fold_row(table, row, intervention_col, agency_col, raw);
            folded_count += 1;
            FoldState {
                category: Category::FALLBACK.as_str().to_string(),
                folded: true,
            }
        };

        folds.entry(key).or_insert(state);
    }

    debug!(folded = folded_count, "category folding complete");
    Ok(folds)
}

/// Relocate a non-canonical category into the agency field and rewrite the
/// category cell to the fallback
fn fold_row(table: &mut Table, row: usize, intervention_col: usize, agency_col: usize, original: &str) {
    let agency = table.value(row, agency_col).as_key_text();
    let agency = agency.trim();
    let prefix = format!("{original} - ");

    let relocated = if agency.is_empty() {
        format!("{original} -")
    } else if agency.starts_with(&prefix) {
        agency.to_string()
    } else {
        format!("{prefix}{agency}")
    };

    let agency_style = table.style(row, agency_col);
    table.set_cell(row, agency_col, Cell::text(relocated).styled(agency_style));

    let category_style = table.style(row, intervention_col);
    table.set_cell(
        row,
        intervention_col,
        Cell::text(Category::FALLBACK.as_str()).styled(category_style),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelclean_core::Value;
    use pretty_assertions::assert_eq;

    fn table_with(rows: Vec<Vec<Cell>>) -> Table {
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

    fn row(category: &str, agency: &str, key: &str) -> Vec<Cell> {
        vec![
            Cell::text(category),
            Cell::text(agency),
            Cell::text("North"),
            Cell::number(1.0),
            Cell::text(key),
            Cell::number(1.0),
        ]
    }

    #[test]
    fn canonical_categories_pass_through() {
        let mut t = table_with(vec![row("HEALTH", "Acme", "HEALTH,Acme,North")]);
        let folds = categorize(&mut t).unwrap();
        let state = &folds["HEALTH,Acme,North"];
        assert_eq!(state.category, "HEALTH");
        assert!(!state.folded);
        assert_eq!(t.value(1, 1), &Value::Text("Acme".into()));
    }

    #[test]
    fn non_canonical_category_is_folded() {
        let mut t = table_with(vec![row("FOO", "Acme", "FOO,Acme,North")]);
        let folds = categorize(&mut t).unwrap();
        let state = &folds["FOO,Acme,North"];
        assert!(state.folded);
        assert_eq!(state.category, "INGOs");
        assert_eq!(t.value(1, 0), &Value::Text("INGOs".into()));
        assert_eq!(t.value(1, 1), &Value::Text("FOO - Acme".into()));
    }

    #[test]
    fn fold_with_empty_agency_uses_bare_prefix() {
        let mut t = table_with(vec![row("FOO", "", "FOO,,North")]);
        categorize(&mut t).unwrap();
        assert_eq!(t.value(1, 1), &Value::Text("FOO -".into()));
    }

    #[test]
    fn fold_does_not_double_prefix() {
        let mut t = table_with(vec![row("FOO", "FOO - Acme", "FOO,FOO - Acme,North")]);
        categorize(&mut t).unwrap();
        assert_eq!(t.value(1, 1), &Value::Text("FOO - Acme".into()));
    }

    #[test]
    fn legacy_alias_rewritten_without_folding() {
        let mut t = table_with(vec![row("NGOs", "Acme", "NGOs,Acme,North")]);
        let folds = categorize(&mut t).unwrap();
        let state = &folds["NGOs,Acme,North"];
        assert!(!state.folded);
        assert_eq!(state.category, "INGOs");
        assert_eq!(t.value(1, 0), &Value::Text("INGOs".into()));
        // Agency untouched: an alias is not a fold
        assert_eq!(t.value(1, 1), &Value::Text("Acme".into()));
    }

    #[test]
    fn empty_category_is_left_alone() {
        let mut t = table_with(vec![row("", "Acme", ",Acme,North")]);
        let folds = categorize(&mut t).unwrap();
        let state = &folds[",Acme,North"];
        assert!(!state.folded);
        assert_eq!(state.category, "");
        assert_eq!(t.value(1, 1), &Value::Text("Acme".into()));
    }

    #[test]
    fn missing_agency_header_is_fatal() {
        let mut t = Table::from_rows(
            "t",
            vec![
                vec![Cell::text("INTERVENTION"), Cell::text("ORG")],
                vec![Cell::text("HEALTH"), Cell::text("Acme")],
            ],
        );
        let err = categorize(&mut t).unwrap_err();
        assert!(matches!(err, CleanError::MissingHeader(name) if name == "AGENCY"));
    }

    #[test]
    fn fold_invariant_holds() {
        let mut t = table_with(vec![
            row("HEALTH", "A", "k1"),
            row("FOO", "B", "k2"),
            row("", "C", "k3"),
            row("wash", "D", "k4"),
        ]);
        let folds = categorize(&mut t).unwrap();
        for state in folds.values() {
            if state.folded {
                assert_eq!(state.category, "INGOs");
            } else {
                assert!(state.category.is_empty() || Category::parse(&state.category).is_some());
            }
        }
    }
}
