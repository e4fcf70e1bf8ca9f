//! Sort & group engine
//!
//! Total ordering over records:
//! 1. final category, case-insensitive, ascending
//! 2. folded rank: genuine members before folded ones
//! 3. group-unified fuel, descending
//! 4. original pre-sort row index, ascending
//!
//! The last key makes the ordering total, so the result is deterministic and
//! re-sorting sorted output is the identity. After reordering, the
//! category-total column is re-merged over contiguous category runs.

use fuelclean_core::{columns, normalize_label, Cell, MergeSpan, Table};

use crate::categorize::FoldMap;
use crate::merges::equal_runs;

struct SortRecord {
    category_lower: String,
    folded_rank: u8,
    unified: f64,
    original_index: usize,
    row: Vec<Cell>,
}

/// Rebuild the table with data rows in composite-key order
pub fn sort_rows(table: &Table, folds: &FoldMap) -> Table {
    if table.height() <= 1 {
        return table.clone();
    }

    let mut records: Vec<SortRecord> = (1..table.height())
        .map(|row| {
            let key = table
                .value(row, columns::DESCRIPTION)
                .as_key_text()
                .trim()
                .to_string();
            let (category, folded) = folds
                .get(&key)
                .map(|s| (s.category.clone(), s.folded))
                .unwrap_or_else(|| {
                    (
                        table
                            .value(row, columns::INTERVENTION)
                            .as_key_text()
                            .trim()
                            .to_string(),
                        false,
                    )
                });
            SortRecord {
                category_lower: category.to_lowercase(),
                folded_rank: u8::from(folded),
                unified: table.value(row, columns::UNIFIED_FUEL).to_number_lossy(),
                original_index: row,
                row: table.row(row).to_vec(),
            }
        })
        .collect();

    records.sort_by(|a, b| {
        a.category_lower
            .cmp(&b.category_lower)
            .then_with(|| a.folded_rank.cmp(&b.folded_rank))
            .then_with(|| b.unified.total_cmp(&a.unified))
            .then_with(|| a.original_index.cmp(&b.original_index))
    });

    let mut rows = vec![table.row(0).to_vec()];
    rows.extend(records.into_iter().map(|r| r.row));
    Table::from_rows(table.name.clone(), rows)
}

/// Merge the category-total column over maximal runs (>= 2) of adjacent equal
/// final-category values. Each merged region shows its top row's value and
/// style; singleton groups stay unmerged.
pub fn remerge_category_totals(table: &mut Table) {
    let texts: Vec<String> = (1..table.height())
        .map(|row| normalize_label(&table.value(row, columns::INTERVENTION).as_key_text()))
        .collect();
    for (start, end) in equal_runs(&texts, 2) {
        table.merges.push(MergeSpan::new(
            1 + start,
            1 + end,
            columns::CATEGORY_TOTAL,
            columns::CATEGORY_TOTAL,
        ));
    }
}
