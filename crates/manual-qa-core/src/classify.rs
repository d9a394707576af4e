//! Residual passage classifier.
//!
//! Assigns `reference`, `specification`, or `content` to passages that
//! survived safety and procedure extraction. The policy is an ordered rule
//! table: the first rule whose pattern matches wins, and anything left
//! unmatched falls through to [`Category::Content`].

use regex::Regex;
use std::sync::LazyLock;

use crate::models::Category;

static FIGURE_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(figure|diagram|table)\s+\d+").unwrap());

// Unit tokens match case-sensitively.
static UNIT_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*(mm|°C|rpm|psi)").unwrap());

/// One entry of the classification table.
pub struct Rule {
    /// Short rule name, used in diagnostics and tests.
    pub name: &'static str,
    pub category: Category,
    pattern: &'static LazyLock<Regex>,
}

impl Rule {
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Passage rules, checked in order.
pub static PASSAGE_RULES: [Rule; 2] = [
    Rule {
        name: "figure_reference",
        category: Category::Reference,
        pattern: &FIGURE_REF_RE,
    },
    Rule {
        name: "unit_value",
        category: Category::Specification,
        pattern: &UNIT_VALUE_RE,
    },
];

/// Classify a residual passage.
pub fn classify(text: &str) -> Category {
    PASSAGE_RULES
        .iter()
        .find(|rule| rule.matches(text))
        .map(|rule| rule.category)
        .unwrap_or(Category::Content)
}
