//! Per-identifier resolution result, as reported by batch callers.

use serde::{Deserialize, Serialize};

/// Outcome of resolving one identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    /// The identifier as the caller supplied it
    pub identifier: String,

    /// Raw BibTeX text, when resolution succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bibtex: Option<String>,

    /// Error message, when resolution failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolvedRecord {
    /// Create a successful record
    pub fn success(identifier: impl Into<String>, bibtex: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            bibtex: Some(bibtex.into()),
            error: None,
        }
    }

    /// Create a failed record
    pub fn error(identifier: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            bibtex: None,
            error: Some(error.into()),
        }
    }

    /// Whether the identifier resolved
    pub fn is_success(&self) -> bool {
        self.bibtex.is_some()
    }
}
