//! Integration tests for bibfetch
//!
//! These tests drive the resolver end to end against a local mock server that
//! stands in for doi.org, CrossCite, the arXiv API and the PMC ID converter.

use bibfetch::config::{Config, Endpoints};
use bibfetch::utils::HttpClient;
use bibfetch::{CitationResolver, Identifier, SourceError};
use mockito::Matcher;
use std::sync::Arc;

fn resolver_for(server: &mockito::Server) -> CitationResolver {
    let config = Config {
        endpoints: Endpoints::with_base(&server.url()),
        ..Config::default()
    };
    CitationResolver::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_doi_input_resolves_through_crosscite() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/doi/10.1000/xyz123")
        .match_header("accept", "application/x-bibtex")
        .with_status(504)
        .create_async()
        .await;
    let crosscite = server
        .mock("GET", "/format")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("doi".into(), "10.1000/xyz123".into()),
            Matcher::UrlEncoded("style".into(), "bibtex".into()),
        ]))
        .with_status(200)
        .with_body("@article{xyz123,\n  title = {Fallback}\n}")
        .create_async()
        .await;

    let id = Identifier::parse("https://doi.org/10.1000/xyz123").unwrap();
    let bib = resolver_for(&server).resolve(&id, None).await.unwrap();

    assert!(bib.contains("Fallback"));
    crosscite.assert_async().await;
}

#[tokio::test]
async fn test_doi_redirect_is_followed() {
    let mut server = mockito::Server::new_async().await;
    let target = format!("{}/records/xyz123", server.url());
    server
        .mock("GET", "/doi/10.1000/xyz123")
        .with_status(302)
        .with_header("location", &target)
        .create_async()
        .await;
    let record = server
        .mock("GET", "/records/xyz123")
        .match_header("accept", "application/x-bibtex")
        .with_status(200)
        .with_body("@article{redirected}")
        .create_async()
        .await;

    let id = Identifier::Doi("10.1000/xyz123".to_string());
    let bib = resolver_for(&server).resolve(&id, None).await.unwrap();

    assert_eq!(bib, "@article{redirected}");
    record.assert_async().await;
}

#[tokio::test]
async fn test_arxiv_input_formats_feed_entry() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/query")
        .match_query(Matcher::UrlEncoded("id_list".into(), "1706.03762".into()))
        .with_status(200)
        .with_body(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All You Need</title>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
    <arxiv:primary_category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#,
        )
        .create_async()
        .await;

    let id = Identifier::parse("arXiv:1706.03762").unwrap();
    let bib = resolver_for(&server).resolve(&id, None).await.unwrap();

    assert!(bib.starts_with("@misc{vaswani2017attention,"));
    assert!(bib.contains("author = {Ashish Vaswani and Noam Shazeer}"));
    assert!(bib.contains("primaryClass = {cs.CL}"));
}

#[tokio::test]
async fn test_pubmed_input_delegates_to_doi() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/idconv/")
        .match_query(Matcher::UrlEncoded("ids".into(), "PMC3531190".into()))
        .with_status(200)
        .with_body(
            r#"<pmcids status="ok"><record requested-id="PMC3531190" pmcid="PMC3531190" pmid="23193287" doi="10.1093/nar/gks1195"/></pmcids>"#,
        )
        .create_async()
        .await;
    let doi = server
        .mock("GET", "/doi/10.1093/nar/gks1195")
        .with_status(200)
        .with_body("@article{pmc}")
        .create_async()
        .await;

    let id = Identifier::parse("PMC3531190").unwrap();
    let bib = resolver_for(&server).resolve(&id, None).await.unwrap();

    assert_eq!(bib, "@article{pmc}");
    doi.assert_async().await;
}

#[tokio::test]
async fn test_resolve_all_mixed_batch() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/doi/10.1000/ok")
        .with_status(200)
        .with_body("@article{ok}")
        .create_async()
        .await;
    server
        .mock("GET", "/idconv/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"<pmcids><record requested-id="1" status="error" errmsg="invalid article id"/></pmcids>"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/query")
        .match_query(Matcher::Any)
        .with_status(502)
        .create_async()
        .await;

    let ids: Vec<Identifier> = ["doi:10.1000/ok", "pmid:1", "2101.00001"]
        .iter()
        .map(|raw| raw.parse().unwrap())
        .collect();
    let results = resolver_for(&server).resolve_all(&ids, None).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap(), "@article{ok}");
    assert!(matches!(results[1], Err(SourceError::EntryNotFound)));
    assert!(matches!(results[2], Err(SourceError::BadGateway)));
}

#[tokio::test]
async fn test_proxy_prefix_applies_to_every_hop() {
    let mut server = mockito::Server::new_async().await;
    let idconv = server
        .mock("GET", "/https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0/")
        .match_query(Matcher::UrlEncoded("ids".into(), "PMC1".into()))
        .with_status(200)
        .with_body(r#"<pmcids><record pmcid="PMC1" doi="10.1/a"/></pmcids>"#)
        .create_async()
        .await;
    let doi = server
        .mock("GET", "/https://doi.org/10.1/a")
        .with_status(200)
        .with_body("@article{proxied}")
        .create_async()
        .await;

    let resolver = CitationResolver::with_client(
        Arc::new(HttpClient::new().unwrap()),
        &Endpoints::default(),
    );
    let proxy = format!("{}/", server.url());
    let bib = resolver
        .resolve(&Identifier::PubMed("PMC1".to_string()), Some(proxy.as_str()))
        .await
        .unwrap();

    assert_eq!(bib, "@article{proxied}");
    idconv.assert_async().await;
    doi.assert_async().await;
}

#[test]
fn test_unrecognized_input_is_rejected() {
    assert!(Identifier::parse("not an identifier").is_err());
    assert!(Identifier::parse("   ").is_err());
}
