//! Error taxonomy for ingestion and question answering.
//!
//! Only two things can go wrong at the core boundary: the caller handed
//! over something unusable ([`QaError::InvalidInput`]), or one of the
//! external collaborators failed ([`QaError::Upstream`]). Unmatched
//! classification patterns are not errors; they fall through to defaults.

use std::fmt;

/// Which external collaborator failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Embedding,
    Search,
    Completion,
    Store,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Embedding => "embedding",
            Stage::Search => "search",
            Stage::Completion => "completion",
            Stage::Store => "store",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the ingestion and answering pipelines.
#[derive(Debug)]
pub enum QaError {
    /// Empty or unusable input. Nothing was persisted.
    InvalidInput(String),
    /// An embedding, search, completion, or store call failed. Propagated
    /// unchanged, without retry.
    Upstream {
        stage: Stage,
        source: anyhow::Error,
    },
}

impl QaError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        QaError::InvalidInput(msg.into())
    }

    pub fn upstream(stage: Stage, source: anyhow::Error) -> Self {
        QaError::Upstream { stage, source }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, QaError::InvalidInput(_))
    }
}

impl fmt::Display for QaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QaError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            QaError::Upstream { stage, source } => write!(f, "{} failed: {:#}", stage, source),
        }
    }
}

impl std::error::Error for QaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QaError::InvalidInput(_) => None,
            QaError::Upstream { source, .. } => Some(source.as_ref()),
        }
    }
}

pub type QaResult<T> = std::result::Result<T, QaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_cause() {
        let err = QaError::upstream(Stage::Embedding, anyhow::anyhow!("HTTP 503"));
        assert_eq!(err.to_string(), "embedding failed: HTTP 503");
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_invalid_input() {
        let err = QaError::invalid("document has no pages");
        assert!(err.is_invalid_input());
        assert!(std::error::Error::source(&err).is_none());
    }
}
