//! Pipeline configuration
//!
//! Loaded from TOML by the CLI or built from `Default`. The defaults describe
//! the standard two-source distribution workbook; deployments with different
//! sheet names override them in `fuelclean.toml`:
//!
//! ```toml
//! output_sheet = "Total Distribution"
//!
//! [[sources]]
//! label = "UNOPS"
//! sheet = "UNOPS Total Distribution"
//! tokens = ["UNOPS", "DISTRIBUTION"]
//!
//! [[sources]]
//! label = "UNHCR"
//! sheet = "UNHCR Total Distribution"
//! tokens = ["UNHCR", "DISTRIBUTION"]
//! insert_label_column = true
//! ```

use serde::Deserialize;

/// One input source: a sheet to locate plus how to tag its rows
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SourceSpec {
    /// Provenance label stamped onto rows when `insert_label_column` is set
    pub label: String,
    /// Sheet name, matched after trimming / whitespace collapsing, case-insensitive
    pub sheet: String,
    /// Fallback match: the sheet name must contain every token (normally two)
    pub tokens: Vec<String>,
    /// Insert a leading column and stamp `label` into every data row.
    /// Set for sources that lack the category column the primary source has.
    pub insert_label_column: bool,
}

impl Default for SourceSpec {
    fn default() -> Self {
        Self {
            label: String::new(),
            sheet: String::new(),
            tokens: Vec::new(),
            insert_label_column: false,
        }
    }
}

impl SourceSpec {
    pub fn new(label: impl Into<String>, sheet: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sheet: sheet.into(),
            ..Self::default()
        }
    }

    pub fn tokens(mut self, tokens: &[&str]) -> Self {
        self.tokens = tokens.iter().map(|t| (*t).to_string()).collect();
        self
    }

    pub fn stamped(mut self) -> Self {
        self.insert_label_column = true;
        self
    }
}

/// Full pipeline configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Sources to combine, in append order
    pub sources: Vec<SourceSpec>,
    /// Name of the cleaned data sheet in the output workbook
    pub output_sheet: String,
    /// Name of the derived summary sheet
    pub summary_sheet: String,
    /// Rows occupied by the header block in the raw sources (data starts below)
    pub header_rows: usize,
    /// Auxiliary column range (inclusive, 0-based) deleted after combination
    pub drop_columns: Option<(usize, usize)>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                SourceSpec::new("UNOPS", "UNOPS Total Distribution")
                    .tokens(&["UNOPS", "DISTRIBUTION"]),
                SourceSpec::new("UNHCR", "UNHCR Total Distribution")
                    .tokens(&["UNHCR", "DISTRIBUTION"])
                    .stamped(),
            ],
            output_sheet: "Total Distribution".into(),
            summary_sheet: "Summary".into(),
            header_rows: 2,
            drop_columns: None,
        }
    }
}

impl CleanConfig {
    /// First data row in the raw sources (0-based)
    pub fn data_start(&self) -> usize {
        self.header_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_two_sources() {
        let config = CleanConfig::default();
        assert_eq!(config.sources.len(), 2);
        assert!(!config.sources[0].insert_label_column);
        assert!(config.sources[1].insert_label_column);
        assert_eq!(config.data_start(), 2);
    }

    #[test]
    fn config_deserializes_from_toml() {
        let toml = r#"
            output_sheet = "Cleaned"
            drop_columns = [7, 9]

            [[sources]]
            label = "UNOPS"
            sheet = "UNOPS Total Distribution"
        "#;
        let config: CleanConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.output_sheet, "Cleaned");
        assert_eq!(config.drop_columns, Some((7, 9)));
        assert_eq!(config.sources.len(), 1);
        // Unset fields fall back to their defaults
        assert_eq!(config.summary_sheet, "Summary");
        assert_eq!(config.header_rows, 2);
    }
}
