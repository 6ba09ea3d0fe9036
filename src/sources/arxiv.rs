//! arXiv source implementation.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::config::Endpoints;
use crate::sources::{DoiSource, Source, SourceError};
use crate::utils::{format_arxiv_entry, FetchRequest, HttpClient, XmlDocument, XmlError};

/// arXiv source
///
/// Queries the arXiv API for the entry. If the entry links a published DOI the
/// record comes from the DOI source, otherwise it is formatted from the feed.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: Arc<HttpClient>,
    api_url: String,
    doi: DoiSource,
}

impl ArxivSource {
    /// Create a new arXiv source against the public services
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(
            Arc::new(HttpClient::new()?),
            &Endpoints::default(),
        ))
    }

    /// Create with a custom HTTP client and endpoints
    pub fn with_client(client: Arc<HttpClient>, endpoints: &Endpoints) -> Self {
        Self {
            doi: DoiSource::with_client(Arc::clone(&client), endpoints),
            api_url: endpoints.arxiv.clone(),
            client,
        }
    }

    /// URI of the API query for one identifier
    pub fn query_uri(&self, arxiv_id: &str) -> String {
        format!("{}?id_list={}", self.api_url, arxiv_id)
    }

    /// Fetch the BibTeX record for an arXiv identifier
    pub async fn resolve(&self, arxiv_id: &str, proxy: Option<&str>) -> Result<String, SourceError> {
        let arxiv_id = arxiv_id.trim();

        let body = self
            .client
            .fetch(FetchRequest::new(self.query_uri(arxiv_id)).proxy(proxy))
            .await?;
        let feed = XmlDocument::parse(&body)?;

        let doi = match feed.find_path(&["feed", "entry", "doi"]) {
            Ok(element) => Some(element.text().trim().to_string()).filter(|d| !d.is_empty()),
            Err(XmlError::TagNotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };

        match doi {
            Some(doi) => {
                debug!(arxiv_id, doi = %doi, "arXiv entry has a DOI");
                self.doi.resolve(&doi, proxy).await
            }
            None => {
                debug!(arxiv_id, "arXiv entry has no DOI, formatting feed entry");
                format_arxiv_entry(arxiv_id, &feed).map_err(|e| match e {
                    XmlError::TagNotFound(_) => SourceError::EntryNotFound,
                    other => other.into(),
                })
            }
        }
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    async fn get_bibtex(&self, id: &str, proxy: Option<&str>) -> Result<String, SourceError> {
        self.resolve(id, proxy).await
    }
}
