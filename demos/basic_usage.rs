//! Basic usage example for the bibfetch library.
//!
//! Resolves a DOI, an arXiv id and a PubMed Central id to BibTeX.

use bibfetch::{CitationResolver, Identifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let resolver = CitationResolver::new()?;

    let identifiers = ["10.1038/nature14539", "arXiv:1706.03762", "PMC3531190"]
        .iter()
        .map(|raw| raw.parse::<Identifier>())
        .collect::<Result<Vec<_>, _>>()?;

    for identifier in &identifiers {
        println!(
            "Resolving {} via {}...",
            identifier,
            resolver.source_for(identifier).name()
        );
    }

    let results = resolver.resolve_all(&identifiers, None).await;

    for (identifier, result) in identifiers.iter().zip(results) {
        match result {
            Ok(bibtex) => println!("\n{}", bibtex.trim_end()),
            Err(e) => eprintln!("\n{}: {}", identifier, e),
        }
    }

    Ok(())
}
