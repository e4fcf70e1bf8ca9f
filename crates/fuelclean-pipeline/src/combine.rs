//! Multi-source combination
//!
//! Reads every configured source, tags stamped sources with their provenance
//! label, and concatenates data rows into one destination table (header taken
//! once, from the first usable source). Presentation merges on the leading
//! columns are re-derived from the finalized values at the end; the
//! normalizer dissolves them again immediately, so they matter only when the
//! combined sheet is inspected on its own.

use fuelclean_core::{
    columns, normalize_label, Cell, CleanConfig, CleanError, MergeSpan, SourceSpec, Table, Value,
};
use fuelclean_import::{SheetSource, WorkbookSource};
use tracing::{debug, warn};

use crate::merges::{blank_fill_runs, equal_runs};
use crate::normalize::{flatten_merges, freeze_formulas};
use crate::synthesize::style_source;

/// Combined live and cached views, still coordinate-parallel
#[derive(Clone, Debug)]
pub struct Combined {
    pub live: Table,
    pub cached: Table,
}

/// Combine all matched sources into one table pair.
///
/// Sources that match no sheet or hold no data rows are skipped with a
/// warning; the run fails only when nothing at all was usable.
pub fn combine(inputs: &[WorkbookSource], config: &CleanConfig) -> Result<Combined, CleanError> {
    let data_start = config.data_start();
    let mut live_dest = Table::new(config.output_sheet.clone());
    let mut cached_dest = Table::new(config.output_sheet.clone());
    let mut header_copied = false;
    let mut appended_rows = 0usize;

    for spec in &config.sources {
        let Some(sheet) = find_sheet(inputs, spec) else {
            warn!(label = %spec.label, sheet = %spec.sheet, "source sheet not found, skipping");
            continue;
        };

        let mut live = sheet.live.clone();
        let mut cached = sheet.cached.clone();

        // Merges contained in the copied block are preserved by value: the
        // source is flattened here (top-left value and style written across
        // each region) and the visual blocks are re-derived from the filled
        // values once every source has been appended
        let full_width = live.width().saturating_sub(1);
        flatten_merges(&mut live, 0, full_width);

        if data_bounds(&live, data_start).is_none() {
            warn!(label = %spec.label, "source has no usable data rows, skipping");
            continue;
        }

        // Stamped sources arrive without the category column the primary
        // source has; give them one and tag every data row
        if spec.insert_label_column {
            live = live.with_column_inserted(0);
            cached = cached.with_column_inserted(0);
            let (first, last) = data_bounds(&live, data_start).unwrap_or((data_start, data_start));
            for row in first..=last {
                let style = live.style(row, style_source::LABEL_STAMP);
                live.set_cell(row, 0, Cell::text(spec.label.clone()).styled(style));
                cached.set_cell(row, 0, Cell::text(spec.label.clone()));
            }
        }

        // Structural edits move the bounds; recompute before appending
        let Some((first, mut last)) = data_bounds(&live, data_start) else {
            continue;
        };
        if is_stray_trailer(live.row(last)) {
            debug!(label = %spec.label, row = last, "dropping stray trailing row");
            if last == first {
                warn!(label = %spec.label, "source holds only a stray trailer, skipping");
                continue;
            }
            last -= 1;
        }

        // Appended values must never carry live formulas
        freeze_formulas(&mut live, &cached);

        if !header_copied {
            for row in 0..data_start.min(live.height()) {
                live_dest.push_row(live.row(row).to_vec());
                cached_dest.push_row(row_or_empty(&cached, row));
            }
            header_copied = true;
        }

        for row in first..=last {
            live_dest.push_row(live.row(row).to_vec());
            cached_dest.push_row(row_or_empty(&cached, row));
        }
        appended_rows += last - first + 1;
        debug!(label = %spec.label, rows = last - first + 1, "appended source");
    }

    if appended_rows == 0 {
        return Err(CleanError::SheetNotFound {
            found: all_sheet_names(inputs),
        });
    }

    // Auxiliary columns go before merges are derived, so spans are computed
    // over the final column layout
    if let Some((lo, hi)) = config.drop_columns {
        live_dest = live_dest.with_columns_removed(lo, hi);
        cached_dest = cached_dest.with_columns_removed(lo, hi);
    }

    derive_presentation_merges(&mut live_dest, data_start);

    Ok(Combined {
        live: live_dest,
        cached: cached_dest,
    })
}

/// Locate a spec's sheet: exact normalized name first across every input,
/// then the token-containment fallback
fn find_sheet<'a>(inputs: &'a [WorkbookSource], spec: &SourceSpec) -> Option<&'a SheetSource> {
    let sought = normalize_label(&spec.sheet);
    for workbook in inputs {
        for name in &workbook.sheet_names {
            if normalize_label(name) == sought {
                return workbook.sheet(name);
            }
        }
    }

    if spec.tokens.is_empty() {
        return None;
    }
    let tokens: Vec<String> = spec.tokens.iter().map(|t| normalize_label(t)).collect();
    for workbook in inputs {
        for name in &workbook.sheet_names {
            let normalized = normalize_label(name);
            if tokens.iter().all(|t| normalized.contains(t.as_str())) {
                return workbook.sheet(name);
            }
        }
    }
    None
}

/// The cached view can be narrower than the live one; missing rows append as
/// empty (padded by the destination)
fn row_or_empty(table: &Table, row: usize) -> Vec<Cell> {
    if row < table.height() {
        table.row(row).to_vec()
    } else {
        Vec::new()
    }
}

fn all_sheet_names(inputs: &[WorkbookSource]) -> Vec<String> {
    inputs
        .iter()
        .flat_map(|w| w.sheet_names.iter().cloned())
        .collect()
}

/// First and last row holding any non-blank cell, scanning from `start`
fn data_bounds(table: &Table, start: usize) -> Option<(usize, usize)> {
    let mut first = None;
    let mut last = None;
    for row in start..table.height() {
        if table.row(row).iter().any(|c| !c.value.is_blank()) {
            first.get_or_insert(row);
            last = Some(row);
        }
    }
    first.zip(last)
}

/// A trailing row is stray when it carries a TOTAL token or is a lone text
/// remark confined to the first column
fn is_stray_trailer(row: &[Cell]) -> bool {
    let has_total = row.iter().any(|cell| match &cell.value {
        Value::Text(s) => s.to_uppercase().contains("TOTAL"),
        _ => false,
    });
    if has_total {
        return true;
    }
    let non_blank: Vec<usize> = row
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.value.is_blank())
        .map(|(i, _)| i)
        .collect();
    non_blank == [0] && matches!(&row[0].value, Value::Text(_))
}

/// Label-column runs plus merge-down-through-blanks on the two columns after
/// it, computed over the finalized data rows
fn derive_presentation_merges(table: &mut Table, data_start: usize) {
    if table.height() <= data_start {
        return;
    }

    let column_texts = |col: usize| -> Vec<String> {
        (data_start..table.height())
            .map(|row| table.value(row, col).as_key_text())
            .collect()
    };

    let mut spans = Vec::new();
    for (start, end) in equal_runs(&column_texts(columns::INTERVENTION), 2) {
        spans.push(MergeSpan::new(
            data_start + start,
            data_start + end,
            columns::INTERVENTION,
            columns::INTERVENTION,
        ));
    }
    for col in [columns::AGENCY, columns::SITE] {
        for (start, end) in blank_fill_runs(&column_texts(col)) {
            spans.push(MergeSpan::new(data_start + start, data_start + end, col, col));
        }
    }
    table.merges = spans;
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelclean_core::Style;
    use pretty_assertions::assert_eq;

    fn sheet_from(live: Table) -> SheetSource {
        SheetSource {
            cached: live.clone(),
            live,
        }
    }

    fn primary_table() -> Table {
        Table::from_rows(
            "UNOPS Total Distribution",
            vec![
                vec![
                    Cell::text("INTERVENTION"),
                    Cell::text("AGENCY"),
                    Cell::text("SITE"),
                    Cell::text("BENZENE"),
                    Cell::text("DIESEL"),
                ],
                vec![
                    Cell::text("category"),
                    Cell::text("name"),
                    Cell::text("location"),
                    Cell::text("liters"),
                    Cell::text("liters"),
                ],
                vec![
                    Cell::text("HEALTH"),
                    Cell::text("Acme"),
                    Cell::text("North"),
                    Cell::number(10.0),
                    Cell::number(5.0),
                ],
                vec![
                    Cell::text("HEALTH"),
                    Cell::text("Beta"),
                    Cell::text("South"),
                    Cell::number(3.0),
                    Cell::number(0.0),
                ],
            ],
        )
    }

    fn secondary_table() -> Table {
        // No category column: agency leads
        Table::from_rows(
            "UNHCR Total Distribution",
            vec![
                vec![
                    Cell::text("AGENCY"),
                    Cell::text("SITE"),
                    Cell::text("BENZENE"),
                    Cell::text("DIESEL"),
                ],
                vec![
                    Cell::text("name"),
                    Cell::text("location"),
                    Cell::text("liters"),
                    Cell::text("liters"),
                ],
                vec![
                    Cell::text("Gamma"),
                    Cell::text("East"),
                    Cell::number(7.0),
                    Cell::number(1.0),
                ],
                vec![Cell::text("GRAND TOTAL"), Cell::empty(), Cell::number(8.0), Cell::empty()],
            ],
        )
    }

    fn config() -> CleanConfig {
        CleanConfig::default()
    }

    #[test]
    fn combines_two_sources_with_label_stamp() {
        let inputs = vec![WorkbookSource::from_sheets(vec![
            (
                "UNOPS Total Distribution".into(),
                sheet_from(primary_table()),
            ),
            (
                "UNHCR Total Distribution".into(),
                sheet_from(secondary_table()),
            ),
        ])];

        let combined = combine(&inputs, &config()).unwrap();

        // Header once, two primary rows, one secondary row (trailer dropped)
        assert_eq!(combined.live.height(), 5);
        assert_eq!(
            combined.live.value(0, 0),
            &Value::Text("INTERVENTION".into())
        );
        assert_eq!(combined.live.value(2, 0), &Value::Text("HEALTH".into()));
        // Stamped provenance label in the inserted leading column
        assert_eq!(combined.live.value(4, 0), &Value::Text("UNHCR".into()));
        assert_eq!(combined.live.value(4, 1), &Value::Text("Gamma".into()));
        assert_eq!(combined.live.value(4, 3), &Value::Number(7.0));
    }

    #[test]
    fn label_stamp_copies_policy_style() {
        let mut secondary = secondary_table();
        let style = Style {
            fill: Some(0x112233),
            ..Style::default()
        };
        // Style the agency cell the stamp copies from
        secondary.set_cell(2, 0, Cell::text("Gamma").styled(style.clone()));

        let inputs = vec![WorkbookSource::from_sheets(vec![(
            "UNHCR Total Distribution".into(),
            sheet_from(secondary),
        )])];
        let mut cfg = config();
        cfg.sources.remove(0);

        let combined = combine(&inputs, &cfg).unwrap();
        assert_eq!(combined.live.value(2, 0), &Value::Text("UNHCR".into()));
        assert_eq!(combined.live.style(2, 0).fill, Some(0x112233));
    }

    #[test]
    fn missing_all_sources_is_fatal_with_found_names() {
        let inputs = vec![WorkbookSource::from_sheets(vec![(
            "Notes".into(),
            sheet_from(Table::new("Notes")),
        )])];

        let err = combine(&inputs, &config()).unwrap_err();
        match err {
            CleanError::SheetNotFound { found } => assert_eq!(found, vec!["Notes".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn token_fallback_matches_renamed_sheet() {
        let inputs = vec![WorkbookSource::from_sheets(vec![(
            "Copy of UNOPS fuel distribution".into(),
            sheet_from(primary_table()),
        )])];
        let mut cfg = config();
        cfg.sources.truncate(1);

        let combined = combine(&inputs, &cfg).unwrap();
        assert_eq!(combined.live.height(), 4);
    }

    #[test]
    fn empty_source_skipped_not_fatal_when_another_usable() {
        let inputs = vec![WorkbookSource::from_sheets(vec![
            (
                "UNOPS Total Distribution".into(),
                sheet_from(primary_table()),
            ),
            (
                "UNHCR Total Distribution".into(),
                sheet_from(Table::new("UNHCR Total Distribution")),
            ),
        ])];

        let combined = combine(&inputs, &config()).unwrap();
        assert_eq!(combined.live.height(), 4);
    }

    #[test]
    fn merged_input_regions_fill_down_before_append() {
        let mut primary = primary_table();
        // Row 3's category arrives only through the merged region above it
        primary.set_cell(3, 0, Cell::empty());
        primary.merges.push(MergeSpan::new(2, 3, 0, 0));

        let inputs = vec![WorkbookSource::from_sheets(vec![(
            "UNOPS Total Distribution".into(),
            sheet_from(primary),
        )])];
        let mut cfg = config();
        cfg.sources.truncate(1);

        let combined = combine(&inputs, &cfg).unwrap();
        assert_eq!(combined.live.value(3, 0), &Value::Text("HEALTH".into()));
    }

    #[test]
    fn aux_columns_dropped_after_combination() {
        let inputs = vec![WorkbookSource::from_sheets(vec![(
            "UNOPS Total Distribution".into(),
            sheet_from(primary_table()),
        )])];
        let mut cfg = config();
        cfg.sources.truncate(1);
        cfg.drop_columns = Some((3, 4));

        let combined = combine(&inputs, &cfg).unwrap();
        assert_eq!(combined.live.width(), 3);
        assert_eq!(combined.cached.width(), 3);
    }

    #[test]
    fn label_runs_merge_in_the_combined_view() {
        let mut primary = primary_table();
        primary.push_row(vec![
            Cell::text("HEALTH"),
            Cell::text("Delta"),
            Cell::text("West"),
            Cell::number(1.0),
            Cell::number(1.0),
        ]);
        let inputs = vec![WorkbookSource::from_sheets(vec![(
            "UNOPS Total Distribution".into(),
            sheet_from(primary),
        )])];
        let mut cfg = config();
        cfg.sources.truncate(1);

        let combined = combine(&inputs, &cfg).unwrap();
        // Three adjacent HEALTH rows merge in the label column
        assert!(combined
            .live
            .merges
            .contains(&MergeSpan::new(2, 4, 0, 0)));
    }
}
