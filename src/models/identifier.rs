//! Bibliographic identifiers accepted by the resolver.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// An identifier naming a single published work.
///
/// The variant decides which upstream service is consulted. The wrapped string
/// is passed on as-is (it is trimmed again right before the URI is built).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Identifier {
    /// Digital Object Identifier, e.g. `10.1000/xyz123`
    Doi(String),
    /// arXiv identifier, e.g. `2101.00001` or `hep-th/9901001`
    Arxiv(String),
    /// PubMed or PubMed Central identifier, e.g. `31452104` or `PMC3531190`
    PubMed(String),
}

/// Errors produced while classifying free-form identifier input
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("empty identifier")]
    Empty,

    #[error("unrecognized identifier: {0}")]
    Unrecognized(String),
}

fn doi_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^10\.\d{4,9}/\S+$").expect("valid DOI regex"))
}

fn arxiv_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:\d{4}\.\d{4,5}|[A-Za-z-]+(?:\.[A-Za-z-]+)?/\d{7})(?:v\d+)?$")
            .expect("valid arXiv regex")
    })
}

fn pmc_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^pmc\d+$").expect("valid PMC regex"))
}

impl Identifier {
    /// Classify free-form input into an identifier.
    ///
    /// Handles explicit prefixes (`doi:`, `arxiv:`, `pmid:`), resolver URLs
    /// (`https://doi.org/...`, `https://arxiv.org/abs/...`) and bare identifiers.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(IdentifierError::Empty);
        }

        if let Some(rest) = strip_prefix_ignore_case(input, "doi:") {
            return non_empty(rest).map(Identifier::Doi);
        }
        if let Some(rest) = strip_prefix_ignore_case(input, "arxiv:") {
            return non_empty(rest).map(Identifier::Arxiv);
        }
        if let Some(rest) = strip_prefix_ignore_case(input, "pmid:") {
            return non_empty(rest).map(Identifier::PubMed);
        }

        if let Some(id) = from_url(input) {
            return Ok(id);
        }

        if pmc_regex().is_match(input) {
            return Ok(Identifier::PubMed(input.to_string()));
        }
        if doi_regex().is_match(input) {
            return Ok(Identifier::Doi(input.to_string()));
        }
        if arxiv_regex().is_match(input) {
            return Ok(Identifier::Arxiv(input.to_string()));
        }
        if input.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Identifier::PubMed(input.to_string()));
        }

        Err(IdentifierError::Unrecognized(input.to_string()))
    }

    /// Short name of the identifier kind
    pub fn kind(&self) -> &'static str {
        match self {
            Identifier::Doi(_) => "doi",
            Identifier::Arxiv(_) => "arxiv",
            Identifier::PubMed(_) => "pubmed",
        }
    }

    /// The wrapped identifier string
    pub fn value(&self) -> &str {
        match self {
            Identifier::Doi(v) | Identifier::Arxiv(v) | Identifier::PubMed(v) => v,
        }
    }
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&input[prefix.len()..])
    } else {
        None
    }
}

fn non_empty(rest: &str) -> Result<String, IdentifierError> {
    let rest = rest.trim();
    if rest.is_empty() {
        Err(IdentifierError::Empty)
    } else {
        Ok(rest.to_string())
    }
}

/// Recognize identifiers embedded in resolver URLs
fn from_url(input: &str) -> Option<Identifier> {
    let lower = input.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return None;
    }

    // Query strings and fragments are never part of these identifiers
    let end = input.find(['?', '#']).unwrap_or(input.len());
    let input = &input[..end];
    let lower = &lower[..end];

    if let Some(pos) = lower.find("doi.org/") {
        let doi = &input[pos + "doi.org/".len()..];
        return (!doi.is_empty()).then(|| Identifier::Doi(doi.to_string()));
    }

    if lower.contains("arxiv.org/") {
        for marker in ["/abs/", "/pdf/"] {
            if let Some(pos) = lower.find(marker) {
                let id = &input[pos + marker.len()..];
                let id = id.strip_suffix(".pdf").unwrap_or(id).trim_end_matches('/');
                return (!id.is_empty()).then(|| Identifier::Arxiv(id.to_string()));
            }
        }
    }

    None
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::parse(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.value())
    }
}
