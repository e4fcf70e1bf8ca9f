//! Fixed column geometry of the combined sheet
//!
//! Header geometry and column semantics are fixed by position. Constants are
//! 0-based; the letters in comments refer to the spreadsheet view.
//!
//! The layout shifts once mid-pipeline: after the fuel sum is built the two
//! raw fuel columns are dropped, so the sum moves from F to D and the derived
//! columns slot in after it.

/// Provenance / category column (A)
pub const INTERVENTION: usize = 0;

/// Agency column (B)
pub const AGENCY: usize = 1;

/// Third descriptive field (C); together with A and B it forms the
/// description key
pub const SITE: usize = 2;

/// First raw fuel quantity (D), before the collapse
pub const RAW_FUEL_A: usize = 3;

/// Second raw fuel quantity (E), before the collapse
pub const RAW_FUEL_B: usize = 4;

/// Fuel sum as first written (F), before the collapse
pub const FUEL_SUM_STAGED: usize = 5;

/// Fuel sum after the raw columns are dropped (D)
pub const FUEL_SUM: usize = 3;

/// Description key column (E)
pub const DESCRIPTION: usize = 4;

/// Group-unified fuel column (F)
pub const UNIFIED_FUEL: usize = 5;

/// Per-category total column (G)
pub const CATEGORY_TOTAL: usize = 6;

/// Last column covered by the row fill (A..=G)
pub const COLOR_SPAN_END: usize = 6;

/// Synthesized header texts
pub const HEADER_FUEL_SUM: &str = "Fuel sum";
pub const HEADER_DESCRIPTION: &str = "Description Sum";
pub const HEADER_UNIFIED_FUEL: &str = "Unified Fuel";
pub const HEADER_CATEGORY_TOTAL: &str = "Total Sum Per Category";

/// Required header names located by normalized match
pub const HEADER_AGENCY: &str = "AGENCY";
pub const HEADER_INTERVENTION: &str = "INTERVENTION";
