//! Citation sources, one per identifier kind.
//!
//! Every source implements [`Source`]: identifier string in, raw BibTeX out.
//! The arXiv and PubMed sources look for a DOI in the upstream metadata first
//! and hand it to the DOI source, since a DOI record is usually the most
//! complete one available.
//!
//! [`CitationResolver`] picks the source for an [`Identifier`](crate::models::Identifier).

mod arxiv;
mod doi;
mod pubmed;
mod resolver;

pub use arxiv::ArxivSource;
pub use doi::DoiSource;
pub use pubmed::PubMedSource;
pub use resolver::CitationResolver;

use async_trait::async_trait;

use crate::utils::XmlError;

/// A service that turns one kind of identifier into a BibTeX record
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g., "doi", "arxiv")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Fetch the BibTeX record for an identifier.
    ///
    /// `proxy` is prepended literally to every URI requested on the way.
    async fn get_bibtex(&self, id: &str, proxy: Option<&str>) -> Result<String, SourceError>;
}

/// Errors that can occur while resolving a citation
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Upstream reports that the identifier has no record
    #[error("Entry not found")]
    EntryNotFound,

    /// Upstream gateway failure (HTTP 502)
    #[error("Bad gateway")]
    BadGateway,

    /// PubMed accepted the identifier but knows no DOI for it
    #[error("No DOI is registered for this PubMed entry")]
    PubMedDoiNotFound,

    /// A 302 response with neither a Location header nor a fallback
    #[error("Malformed redirection from {0}")]
    MalformedRedirect(String),

    /// Unexpected status, decoding or transport failure
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Transport(err.to_string())
    }
}

impl From<XmlError> for SourceError {
    fn from(err: XmlError) -> Self {
        SourceError::Transport(format!("XML: {}", err))
    }
}
