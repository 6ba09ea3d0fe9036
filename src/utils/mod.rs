//! Utility modules supporting citation resolution.
//!
//! - [`HttpClient`]: GET with literal proxy prefix, manual `302` handling,
//!   gzip decoding and an optional fallback URI
//! - [`XmlDocument`]: small owned element tree with path and attribute lookups
//! - [`format_arxiv_entry`]: BibTeX rendering of an arXiv Atom entry
//!
//! # Fetching with a fallback
//!
//! ```rust,no_run
//! use bibfetch::utils::{FetchRequest, HttpClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let body = client
//!     .fetch(
//!         FetchRequest::new("https://doi.org/10.1000/xyz123")
//!             .header("Accept", "application/x-bibtex")
//!             .fallback("https://citation.crosscite.org/format?doi=10.1000/xyz123&style=bibtex&lang=en-US"),
//!     )
//!     .await?;
//! println!("{}", body);
//! # Ok(())
//! # }
//! ```

mod bibtex;
mod http;
mod xml;

pub use bibtex::format_arxiv_entry;
pub use http::{FetchRequest, HttpClient};
pub use xml::{XmlDocument, XmlElement, XmlError};
