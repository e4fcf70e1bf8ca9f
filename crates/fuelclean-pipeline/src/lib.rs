//! # fuelclean-pipeline
//!
//! The record normalization and categorization pipeline: takes heterogeneous,
//! merged-cell, formula-bearing source sheets and produces a flat,
//! deduplicated, sorted, aggregated, color-categorized table plus a
//! per-category summary.
//!
//! Stages run strictly in order, each to completion, on in-memory tables.
//! Structural changes always build a new table from the old one; nothing is
//! deleted in place. Merges exist only at the edges: captured on input,
//! dissolved before the transforms, and reconstructed once at the end as a
//! presentation pass.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fuelclean_core::{CleanConfig, NullProgress};
//! use fuelclean_import::load_workbook;
//! use fuelclean_pipeline::clean;
//!
//! let workbook = load_workbook("distribution.xlsx").unwrap();
//! let config = CleanConfig::default();
//! let output = clean(&[workbook], &config, &mut NullProgress).unwrap();
//! println!("{} cleaned rows", output.data.height() - 1);
//! ```

use fuelclean_core::{columns, CleanConfig, CleanError, ProgressSink, Table};
use fuelclean_import::WorkbookSource;
use tracing::debug;

pub mod categorize;
pub mod color;
pub mod combine;
pub mod dedup;
pub mod filter;
pub mod merges;
pub mod normalize;
pub mod sort;
pub mod summary;
pub mod synthesize;

pub use categorize::{FoldMap, FoldState};
pub use combine::Combined;
pub use summary::{Summary, SummaryRow};

/// Result of a full pipeline run
#[derive(Clone, Debug)]
pub struct CleanOutput {
    /// The cleaned, enriched, colorized data table
    pub data: Table,
    /// The derived per-category summary
    pub summary: Summary,
}

/// Run the whole pipeline over the loaded inputs.
///
/// The single synchronous entry point: combine, normalize, freeze, filter,
/// synthesize, categorize, sort, dedup, total, re-merge, colorize, and
/// project the summary. Fatal errors ([`CleanError`]) abort the run; source
/// skips and cell-level degradations are absorbed along the way.
pub fn clean(
    inputs: &[WorkbookSource],
    config: &CleanConfig,
    progress: &mut dyn ProgressSink,
) -> Result<CleanOutput, CleanError> {
    progress.report(10, "Combining source sheets");
    let Combined { mut live, cached } = combine::combine(inputs, config)?;

    progress.report(22, "Unmerging leading columns");
    normalize::flatten_merges(&mut live, columns::INTERVENTION, columns::SITE);

    progress.report(30, "Freezing formulas into values");
    normalize::freeze_formulas(&mut live, &cached);

    progress.report(38, "Removing header and TOTAL rows");
    let table = filter::strip_second_header_row(&live);
    let mut table = filter::strip_total_rows(&table);

    progress.report(48, "Building fuel sum");
    normalize::flatten_merges(&mut table, columns::RAW_FUEL_A, columns::FUEL_SUM_STAGED);
    let table = synthesize::build_fuel_sum(&table);

    progress.report(55, "Removing empty and zero fuel rows");
    let table = filter::strip_zero_fuel_rows(&table, columns::FUEL_SUM_STAGED);

    progress.report(65, "Building description keys");
    let table = synthesize::collapse_raw_fuel(&table);
    let table = synthesize::build_description_keys(&table);

    progress.report(75, "Building unified fuel");
    let mut table = synthesize::build_unified_fuel(&table);

    progress.report(78, "Folding categories");
    let folds = categorize::categorize(&mut table)?;

    progress.report(82, "Sorting records");
    let table = sort::sort_rows(&table, &folds);

    progress.report(88, "Removing duplicate records");
    let table = dedup::dedup_rows(&table);

    progress.report(94, "Building category totals");
    let mut table = synthesize::build_category_totals(&table);
    sort::remerge_category_totals(&mut table);

    progress.report(97, "Applying category colours");
    color::colorize(&mut table, &folds);
    let summary = summary::project_summary(&table, &folds);

    debug!(
        rows = table.height().saturating_sub(1),
        grand_total = summary.grand_total,
        "pipeline complete"
    );
    progress.report(100, "Done");

    Ok(CleanOutput {
        data: table,
        summary,
    })
}
