//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `BIBFETCH_*` environment variables (nested keys separated by `__`).
//!
//! ```toml
//! proxy = "http://cache.local/"
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//! user_agent = "bibfetch/0.1.0"
//!
//! [endpoints]
//! doi = "https://doi.org"
//! crosscite = "https://citation.crosscite.org/format"
//! arxiv = "https://export.arxiv.org/api/query"
//! pubmed = "https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0/"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base URL of the DOI resolver
pub const DOI_URL: &str = "https://doi.org";
/// Base URL of the CrossCite citation formatter
pub const CROSSCITE_URL: &str = "https://citation.crosscite.org/format";
/// Base URL of the arXiv query API
pub const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";
/// Base URL of the NCBI PMC id converter
pub const PUBMED_IDCONV_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0/";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Upstream service base URLs
    #[serde(default)]
    pub endpoints: Endpoints,

    /// Default URI prefix, used when a call does not supply its own
    #[serde(default)]
    pub proxy: Option<String>,
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Total request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("bibfetch/{}", crate::VERSION)
}

/// Base URLs of the services consulted during resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_doi")]
    pub doi: String,

    #[serde(default = "default_crosscite")]
    pub crosscite: String,

    #[serde(default = "default_arxiv")]
    pub arxiv: String,

    #[serde(default = "default_pubmed")]
    pub pubmed: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            doi: default_doi(),
            crosscite: default_crosscite(),
            arxiv: default_arxiv(),
            pubmed: default_pubmed(),
        }
    }
}

fn default_doi() -> String {
    DOI_URL.to_string()
}

fn default_crosscite() -> String {
    CROSSCITE_URL.to_string()
}

fn default_arxiv() -> String {
    ARXIV_API_URL.to_string()
}

fn default_pubmed() -> String {
    PUBMED_IDCONV_URL.to_string()
}

impl Endpoints {
    /// Point every service at one base URL, each under its own path.
    ///
    /// Handy for running against a local mirror or a mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            doi: format!("{}/doi", base),
            crosscite: format!("{}/format", base),
            arxiv: format!("{}/api/query", base),
            pubmed: format!("{}/idconv/", base),
        }
    }
}

/// `BIBFETCH_*` variables, nested keys joined by `__` (e.g. `BIBFETCH_HTTP__TIMEOUT_SECS`)
fn env_source() -> config::Environment {
    config::Environment::with_prefix("BIBFETCH")
        .prefix_separator("_")
        .separator("__")
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env_source())
        .build()?;

    settings.try_deserialize()
}

/// Get the configuration from environment variables and defaults only
pub fn get_config() -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(env_source())
        .build()?;

    settings.try_deserialize()
}

/// Look for a configuration file in the usual places
///
/// Checks `./bibfetch.toml`, then `<config dir>/bibfetch/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("bibfetch.toml");
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("bibfetch").join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert_eq!(
            config.http.user_agent,
            format!("bibfetch/{}", crate::VERSION)
        );
        assert_eq!(config.endpoints.doi, "https://doi.org");
        assert_eq!(
            config.endpoints.crosscite,
            "https://citation.crosscite.org/format"
        );
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_endpoints_with_base() {
        let endpoints = Endpoints::with_base("http://127.0.0.1:1234/");
        assert_eq!(endpoints.doi, "http://127.0.0.1:1234/doi");
        assert_eq!(endpoints.crosscite, "http://127.0.0.1:1234/format");
        assert_eq!(endpoints.arxiv, "http://127.0.0.1:1234/api/query");
        assert_eq!(endpoints.pubmed, "http://127.0.0.1:1234/idconv/");
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let toml_content = r#"
proxy = "http://cache.local/"

[http]
timeout_secs = 5

[endpoints]
arxiv = "http://mirror.local/api/query"
"#;

        let mut file = File::create(&path).unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.proxy.as_deref(), Some("http://cache.local/"));
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert_eq!(config.endpoints.arxiv, "http://mirror.local/api/query");
        assert_eq!(config.endpoints.doi, DOI_URL);
    }

    #[test]
    fn test_load_config_env_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[http]\nuser_agent = \"from-file\"\n").unwrap();

        std::env::set_var("BIBFETCH_ENDPOINTS__PUBMED", "http://env.local/idconv/");
        let config = load_config(&path).unwrap();
        std::env::remove_var("BIBFETCH_ENDPOINTS__PUBMED");

        assert_eq!(config.http.user_agent, "from-file");
        assert_eq!(config.endpoints.pubmed, "http://env.local/idconv/");
    }

    #[test]
    fn test_get_config_reads_prefixed_env() {
        std::env::set_var("BIBFETCH_ENDPOINTS__CROSSCITE", "http://env.local/format");
        let config = get_config().unwrap();
        std::env::remove_var("BIBFETCH_ENDPOINTS__CROSSCITE");

        assert_eq!(config.endpoints.crosscite, "http://env.local/format");
    }

    #[test]
    fn test_load_config_nonexistent() {
        let path = PathBuf::from("/nonexistent/bibfetch.toml");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        std::fs::write(&path, "invalid = toml = content").unwrap();

        assert!(load_config(&path).is_err());
    }
}
