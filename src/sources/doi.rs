//! DOI source: content negotiation at doi.org, CrossCite as fallback.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::config::Endpoints;
use crate::sources::{Source, SourceError};
use crate::utils::{FetchRequest, HttpClient};

/// DOI source
///
/// Asks the DOI resolver for `application/x-bibtex`. When that answers
/// `404`/`504` (or redirects nowhere) the CrossCite formatter is asked instead.
#[derive(Debug, Clone)]
pub struct DoiSource {
    client: Arc<HttpClient>,
    doi_url: String,
    crosscite_url: String,
}

impl DoiSource {
    /// Create a new DOI source against the public services
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(
            Arc::new(HttpClient::new()?),
            &Endpoints::default(),
        ))
    }

    /// Create with a custom HTTP client and endpoints
    pub fn with_client(client: Arc<HttpClient>, endpoints: &Endpoints) -> Self {
        Self {
            client,
            doi_url: endpoints.doi.clone(),
            crosscite_url: endpoints.crosscite.clone(),
        }
    }

    /// URI of the record at the DOI resolver
    pub fn primary_uri(&self, doi: &str) -> String {
        format!("{}/{}", self.doi_url.trim_end_matches('/'), doi)
    }

    /// URI of the record at the CrossCite formatter
    pub fn fallback_uri(&self, doi: &str) -> String {
        format!(
            "{}?doi={}&style=bibtex&lang=en-US",
            self.crosscite_url, doi
        )
    }

    /// Fetch the BibTeX record for a DOI
    pub async fn resolve(&self, doi: &str, proxy: Option<&str>) -> Result<String, SourceError> {
        let doi = doi.trim();
        debug!(doi, "resolving DOI");

        let request = FetchRequest::new(self.primary_uri(doi))
            .proxy(proxy)
            .header("Accept", "application/x-bibtex")
            .header("charset", "utf-8")
            .fallback(self.fallback_uri(doi));

        self.client.fetch(request).await
    }
}

#[async_trait]
impl Source for DoiSource {
    fn id(&self) -> &str {
        "doi"
    }

    fn name(&self) -> &str {
        "DOI"
    }

    async fn get_bibtex(&self, id: &str, proxy: Option<&str>) -> Result<String, SourceError> {
        self.resolve(id, proxy).await
    }
}
