//! # bibfetch
//!
//! Resolve scholarly identifiers (DOIs, arXiv ids, PubMed/PMC ids) to BibTeX.
//!
//! ## Architecture
//!
//! - [`models`]: identifiers and per-identifier results
//! - [`sources`]: one source per identifier kind, plus the [`CitationResolver`] dispatcher
//! - [`utils`]: the HTTP fetcher, XML tree and arXiv BibTeX formatter
//! - [`config`]: configuration management
//!
//! ## Example
//!
//! ```rust,no_run
//! use bibfetch::{CitationResolver, Identifier};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = CitationResolver::new()?;
//! let id: Identifier = "arXiv:1706.03762".parse()?;
//! println!("{}", resolver.resolve(&id, None).await?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use models::{Identifier, IdentifierError, ResolvedRecord};
pub use sources::{CitationResolver, Source, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
