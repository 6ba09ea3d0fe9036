//! Dispatch from identifier kind to citation source.

use futures_util::future::join_all;
use std::sync::Arc;
use tracing::debug;

use super::{ArxivSource, DoiSource, PubMedSource, Source, SourceError};
use crate::config::{Config, Endpoints};
use crate::models::Identifier;
use crate::utils::HttpClient;

/// Resolves any [`Identifier`] to its BibTeX record.
///
/// All sources share one HTTP client.
#[derive(Debug, Clone)]
pub struct CitationResolver {
    doi: DoiSource,
    arxiv: ArxivSource,
    pubmed: PubMedSource,
}

impl CitationResolver {
    /// Create a resolver against the public services
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&Config::default())
    }

    /// Create a resolver from configuration
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = Arc::new(HttpClient::with_config(&config.http)?);
        Ok(Self::with_client(client, &config.endpoints))
    }

    /// Create with a custom HTTP client and endpoints
    pub fn with_client(client: Arc<HttpClient>, endpoints: &Endpoints) -> Self {
        Self {
            doi: DoiSource::with_client(Arc::clone(&client), endpoints),
            arxiv: ArxivSource::with_client(Arc::clone(&client), endpoints),
            pubmed: PubMedSource::with_client(client, endpoints),
        }
    }

    /// The source responsible for an identifier kind
    pub fn source_for(&self, identifier: &Identifier) -> &dyn Source {
        match identifier {
            Identifier::Doi(_) => &self.doi,
            Identifier::Arxiv(_) => &self.arxiv,
            Identifier::PubMed(_) => &self.pubmed,
        }
    }

    /// Resolve one identifier, forwarding `proxy` to the chosen source
    pub async fn resolve(
        &self,
        identifier: &Identifier,
        proxy: Option<&str>,
    ) -> Result<String, SourceError> {
        let source = self.source_for(identifier);
        debug!(source = source.id(), id = identifier.value(), "resolving");
        source.get_bibtex(identifier.value(), proxy).await
    }

    /// Resolve several identifiers concurrently.
    ///
    /// Results come back in input order, one per identifier.
    pub async fn resolve_all(
        &self,
        identifiers: &[Identifier],
        proxy: Option<&str>,
    ) -> Vec<Result<String, SourceError>> {
        join_all(identifiers.iter().map(|id| self.resolve(id, proxy))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn resolver_for(server: &mockito::Server) -> CitationResolver {
        CitationResolver::with_client(
            Arc::new(HttpClient::new().unwrap()),
            &Endpoints::with_base(&server.url()),
        )
    }

    #[test]
    fn test_source_for() {
        let resolver = CitationResolver::new().unwrap();
        assert_eq!(
            resolver
                .source_for(&Identifier::Doi("10.1/a".to_string()))
                .id(),
            "doi"
        );
        assert_eq!(
            resolver
                .source_for(&Identifier::Arxiv("2101.00001".to_string()))
                .name(),
            "arXiv"
        );
        assert_eq!(
            resolver
                .source_for(&Identifier::PubMed("PMC1".to_string()))
                .id(),
            "pubmed"
        );
    }

    #[tokio::test]
    async fn test_resolve_dispatches_by_kind() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/doi/10.1/a")
            .with_status(200)
            .with_body("@article{doi}")
            .create_async()
            .await;
        server
            .mock("GET", "/api/query")
            .match_query(Matcher::UrlEncoded("id_list".into(), "2101.00001".into()))
            .with_status(200)
            .with_body(
                "<feed><entry><id>http://arxiv.org/abs/2101.00001v1</id><title>T</title></entry></feed>",
            )
            .create_async()
            .await;
        server
            .mock("GET", "/idconv/")
            .match_query(Matcher::UrlEncoded("ids".into(), "PMC1".into()))
            .with_status(200)
            .with_body(r#"<pmcids><record pmcid="PMC1"/></pmcids>"#)
            .create_async()
            .await;

        let resolver = resolver_for(&server);

        let doi = resolver
            .resolve(&Identifier::Doi("10.1/a".to_string()), None)
            .await
            .unwrap();
        assert_eq!(doi, "@article{doi}");

        let arxiv = resolver
            .resolve(&Identifier::Arxiv("2101.00001".to_string()), None)
            .await
            .unwrap();
        assert!(arxiv.starts_with("@misc{"));

        let pubmed = resolver
            .resolve(&Identifier::PubMed("PMC1".to_string()), None)
            .await
            .unwrap_err();
        assert!(matches!(pubmed, SourceError::PubMedDoiNotFound));
    }

    #[tokio::test]
    async fn test_resolve_all_keeps_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/doi/10.1/a")
            .with_status(200)
            .with_body("first")
            .create_async()
            .await;
        server
            .mock("GET", "/doi/10.1/b")
            .with_status(502)
            .create_async()
            .await;
        server
            .mock("GET", "/doi/10.1/c")
            .with_status(200)
            .with_body("third")
            .create_async()
            .await;

        let ids = vec![
            Identifier::Doi("10.1/a".to_string()),
            Identifier::Doi("10.1/b".to_string()),
            Identifier::Doi("10.1/c".to_string()),
        ];
        let results = resolver_for(&server).resolve_all(&ids, None).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), "first");
        assert!(matches!(results[1], Err(SourceError::BadGateway)));
        assert_eq!(results[2].as_ref().unwrap(), "third");
    }
}
