//! Canonical intervention categories
//!
//! The pipeline recognizes a fixed set of intervention categories. Every
//! record ends up either in one of these (possibly by folding) or with an
//! empty category. The set also drives row fills and the summary sheet's
//! display order.

use serde::{Deserialize, Serialize};

use crate::Rgb;

/// One of the recognized intervention categories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Telecommunications,
    Health,
    Wash,
    Ingos,
    Wfp,
    Logistics,
}

/// Legacy spelling rewritten to `INGOs` before the fold check runs
const LEGACY_INGOS_ALIAS: &str = "NGOS";

impl Category {
    /// All categories in summary display order
    pub const DISPLAY_ORDER: [Category; 6] = [
        Category::Telecommunications,
        Category::Health,
        Category::Wash,
        Category::Ingos,
        Category::Wfp,
        Category::Logistics,
    ];

    /// The category non-canonical values fold into
    pub const FALLBACK: Category = Category::Ingos;

    /// Parse a raw category cell value. Case-insensitive, whitespace-trimmed;
    /// accepts the legacy `NGOs` alias for `INGOs`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_uppercase();
        match normalized.as_str() {
            "TELECOMMUNICATIONS" => Some(Category::Telecommunications),
            "HEALTH" => Some(Category::Health),
            "WASH" => Some(Category::Wash),
            "INGOS" | LEGACY_INGOS_ALIAS => Some(Category::Ingos),
            "WFP" => Some(Category::Wfp),
            "LOGISTICS" => Some(Category::Logistics),
            _ => None,
        }
    }

    /// Canonical cell text written back into the category column
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Telecommunications => "TELECOMMUNICATIONS",
            Category::Health => "HEALTH",
            Category::Wash => "WASH",
            Category::Ingos => "INGOs",
            Category::Wfp => "WFP",
            Category::Logistics => "LOGISTICS",
        }
    }

    /// Label shown on the summary sheet
    pub fn display_label(&self) -> &'static str {
        match self {
            Category::Telecommunications => "Telecommunications",
            Category::Health => "Health",
            Category::Wash => "WASH",
            Category::Ingos => "INGOs",
            Category::Wfp => "WFP",
            Category::Logistics => "Logistics",
        }
    }

    /// Row fill for genuine members of this category.
    ///
    /// WASH and LOGISTICS intentionally share a fill.
    pub fn fill(&self) -> Rgb {
        match self {
            Category::Telecommunications => 0xD5F3FB,
            Category::Health => 0x00B050,
            Category::Wash => 0xFAB28A,
            Category::Logistics => 0xFAB28A,
            Category::Ingos => 0xBE9EF2,
            Category::Wfp => 0x2CC3EC,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
