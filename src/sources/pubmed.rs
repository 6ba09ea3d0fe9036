//! PubMed source implementation using the PMC ID Converter API.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::config::Endpoints;
use crate::sources::{DoiSource, Source, SourceError};
use crate::utils::{FetchRequest, HttpClient, XmlDocument, XmlError};

/// PubMed source
///
/// PubMed records are resolved through their DOI: the ID converter maps the
/// PMID/PMCID to a DOI, which is then handed to the DOI source.
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: Arc<HttpClient>,
    idconv_url: String,
    doi: DoiSource,
}

impl PubMedSource {
    /// Create a new PubMed source against the public services
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
            idconv_url: endpoints.pubmed.clone(),
            client,
        }
    }

    /// URI of the ID converter query for one identifier
    pub fn idconv_uri(&self, pubmed_id: &str) -> String {
        format!("{}?ids={}", self.idconv_url, pubmed_id)
    }

    /// Fetch the BibTeX record for a PubMed identifier
    pub async fn resolve(&self, pubmed_id: &str, proxy: Option<&str>) -> Result<String, SourceError> {
        let pubmed_id = pubmed_id.trim();

        let body = self
            .client
            .fetch(FetchRequest::new(self.idconv_uri(pubmed_id)).proxy(proxy))
            .await?;
        let doc = XmlDocument::parse(&body)?;

        match doc.find_last_attr("record", "doi") {
            Ok(doi) => {
                debug!(pubmed_id, doi = %doi, "PubMed id maps to a DOI");
                self.doi.resolve(&doi, proxy).await
            }
            Err(XmlError::TagNotFound(_)) => {
                let err = Self::classify_missing_doi(&doc);
                debug!(pubmed_id, error = %err, "PubMed id has no DOI");
                Err(err)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Tell a rejected identifier apart from one that simply has no DOI
    fn classify_missing_doi(doc: &XmlDocument) -> SourceError {
        match doc.find_path(&["pmcids", "record"]) {
            Ok(record) if record.attr("status") == Some("error") => SourceError::EntryNotFound,
            Ok(_) => SourceError::PubMedDoiNotFound,
            Err(_) => SourceError::EntryNotFound,
        }
    }
}

#[async_trait]
impl Source for PubMedSource {
    fn id(&self) -> &str {
        "pubmed"
    }

    fn name(&self) -> &str {
        "PubMed"
    }

    async fn get_bibtex(&self, id: &str, proxy: Option<&str>) -> Result<String, SourceError> {
        self.resolve(id, proxy).await
    }
}
