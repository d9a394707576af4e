//! Question intent classification.
//!
//! Maps a free-text question to an [`Intent`] by case-insensitive keyword
//! membership. Keyword sets are checked in a fixed order and the first set
//! with any match wins, so a question mentioning both "warning" and
//! "install" is a safety question. Keywords match as substrings: "spec"
//! also matches "specification" and "step" matches "steps".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The classified purpose of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Safety,
    Procedure,
    Troubleshooting,
    Specification,
    Definition,
    General,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::Safety,
        Intent::Procedure,
        Intent::Troubleshooting,
        Intent::Specification,
        Intent::Definition,
        Intent::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Safety => "safety",
            Intent::Procedure => "procedure",
            Intent::Troubleshooting => "troubleshooting",
            Intent::Specification => "specification",
            Intent::Definition => "definition",
            Intent::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let lower = s.trim().to_lowercase();
        Intent::ALL
            .into_iter()
            .find(|i| i.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "invalid question type: '{}'. Use safety, procedure, troubleshooting, \
                     specification, definition, or general.",
                    s
                )
            })
    }
}

/// Keyword sets in priority order. `General` has no keywords.
pub const INTENT_KEYWORDS: [(Intent, &[&str]); 5] = [
    (
        Intent::Safety,
        &["safety", "warning", "caution", "danger", "risk", "hazard"],
    ),
    (
        Intent::Procedure,
        &[
            "step",
            "procedure",
            "how to",
            "install",
            "assemble",
            "maintenance",
            "operation",
        ],
    ),
    (
        Intent::Troubleshooting,
        &[
            "error",
            "fault",
            "troubleshoot",
            "fix",
            "problem",
            "alarm",
            "diagnose",
        ],
    ),
    (
        Intent::Specification,
        &[
            "spec",
            "parameter",
            "setting",
            "value",
            "torque",
            "rpm",
            "pressure",
            "temperature",
            "voltage",
        ],
    ),
    (
        Intent::Definition,
        &["what is", "define", "explain", "meaning", "purpose"],
    ),
];

/// Classify a question. Unmatched questions are [`Intent::General`].
pub fn classify_question(question: &str) -> Intent {
    let lower = question.to_lowercase();
    INTENT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_intent() {
        assert_eq!(classify_question("Is there a hazard near the press?"), Intent::Safety);
        assert_eq!(classify_question("How to replace the belt"), Intent::Procedure);
        assert_eq!(classify_question("Alarm E42 keeps showing"), Intent::Troubleshooting);
        assert_eq!(classify_question("Required torque for M8?"), Intent::Specification);
        assert_eq!(classify_question("What is a servo drive?"), Intent::Definition);
        assert_eq!(classify_question("Tell me about the robot"), Intent::General);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify_question("DANGER ZONES?"), Intent::Safety);
        assert_eq!(classify_question("Explain THE cycle"), Intent::Definition);
    }

    #[test]
    fn test_safety_beats_procedure() {
        assert_eq!(
            classify_question("Which warning applies during the install step?"),
            Intent::Safety
        );
    }

    #[test]
    fn test_procedure_beats_specification() {
        assert_eq!(
            classify_question("What are the steps to set the torque?"),
            Intent::Procedure
        );
    }

    #[test]
    fn test_substring_membership() {
        assert_eq!(classify_question("specifications of the pump"), Intent::Specification);
    }

    #[test]
    fn test_pure() {
        let q = "What pressure should the regulator hold?";
        assert_eq!(classify_question(q), classify_question(q));
    }

    #[test]
    fn test_parse_intent() {
        assert_eq!("Safety".parse::<Intent>().unwrap(), Intent::Safety);
        assert_eq!(" general ".parse::<Intent>().unwrap(), Intent::General);
        assert!("urgent".parse::<Intent>().is_err());
    }
}
