//! HTTP client utilities.
//!
//! [`HttpClient::fetch`] is a GET with bounded fallback: it negotiates gzip,
//! follows `302` redirects itself and escalates to a fallback URI on `404`/`504`.

use flate2::read::GzDecoder;
use futures_util::future::{BoxFuture, FutureExt};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING, CONTENT_ENCODING, LOCATION,
};
use reqwest::{redirect, Client, StatusCode};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::HttpConfig;
use crate::sources::SourceError;

/// A single GET, with the parameters that are threaded through redirects and
/// fallback retries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// Target URI, before the proxy prefix is applied
    pub uri: String,

    /// Literal prefix prepended to every URI this request touches
    pub proxy: Option<String>,

    /// Extra request headers
    pub headers: Vec<(String, String)>,

    /// Complete alternate URI, consulted at most once
    pub fallback: Option<String>,
}

impl FetchRequest {
    /// Create a request for a URI
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    /// Set the proxy prefix
    pub fn proxy(mut self, proxy: Option<&str>) -> Self {
        self.proxy = proxy.map(str::to_string);
        self
    }

    /// Add a request header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the fallback URI
    pub fn fallback(mut self, uri: impl Into<String>) -> Self {
        self.fallback = Some(uri.into());
        self
    }

    /// The URI actually requested: proxy prefix followed by the target
    pub fn effective_uri(&self) -> String {
        format!("{}{}", self.proxy.as_deref().unwrap_or(""), self.uri)
    }

    /// Same request aimed at a redirect target. The fallback is kept.
    fn redirect_to(&self, location: &str) -> Self {
        Self {
            uri: location.to_string(),
            ..self.clone()
        }
    }

    /// Request for the fallback URI, with no fallback of its own
    fn fallback_request(&self) -> Option<Self> {
        self.fallback.as_ref().map(|fallback| Self {
            uri: fallback.clone(),
            proxy: self.proxy.clone(),
            headers: self.headers.clone(),
            fallback: None,
        })
    }
}

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::with_config(&HttpConfig::default())
    }

    /// Create a new HTTP client from configuration.
    ///
    /// Redirects and transparent decompression are disabled: [`fetch`](Self::fetch)
    /// handles both.
    pub fn with_config(config: &HttpConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(redirect::Policy::none())
            .no_gzip()
            .build()
            .map_err(|e| SourceError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// GET a URI and return the (decompressed) body text.
    ///
    /// | status | outcome |
    /// |---|---|
    /// | 200 | body, gunzipped when `content-encoding: gzip` |
    /// | 302 | follow `Location` (fallback kept), else fallback, else [`SourceError::MalformedRedirect`] |
    /// | 404, 504 with fallback | fetch the fallback once, without a fallback of its own |
    /// | 400, 404 | [`SourceError::EntryNotFound`] |
    /// | 502 | [`SourceError::BadGateway`] |
    /// | other | [`SourceError::Transport`] |
    pub fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<String, SourceError>> {
        async move {
            let uri = request.effective_uri();
            let headers = build_headers(&request.headers)?;

            debug!(uri = %uri, "GET");
            let response = self.client.get(&uri).headers(headers).send().await?;
            let status = response.status();
            debug!(uri = %uri, status = status.as_u16(), "response received");

            if status == StatusCode::OK {
                let gzipped = response
                    .headers()
                    .get(CONTENT_ENCODING)
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case("gzip"));
                let body = response.bytes().await?;
                return if gzipped {
                    gunzip(&body)
                } else {
                    Ok(String::from_utf8_lossy(&body).into_owned())
                };
            }

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            // Drain the body so the connection can be reused
            if let Err(e) = response.bytes().await {
                debug!(uri = %uri, error = %e, "failed to drain response body");
            }

            match (status, location, request.fallback_request()) {
                (StatusCode::FOUND, Some(location), _) => {
                    debug!(from = %uri, to = %location, "following redirect");
                    self.fetch(request.redirect_to(&location)).await
                }
                (StatusCode::FOUND, None, Some(next)) => {
                    debug!(from = %uri, to = %next.uri, "redirect without location, using fallback");
                    self.fetch(next).await
                }
                (StatusCode::FOUND, None, None) => Err(SourceError::MalformedRedirect(request.uri)),
                (StatusCode::NOT_FOUND | StatusCode::GATEWAY_TIMEOUT, _, Some(next)) => {
                    debug!(from = %uri, to = %next.uri, status = status.as_u16(), "using fallback");
                    self.fetch(next).await
                }
                (StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND, _, _) => {
                    Err(SourceError::EntryNotFound)
                }
                (StatusCode::BAD_GATEWAY, _, _) => Err(SourceError::BadGateway),
                (status, _, _) => Err(SourceError::Transport(format!(
                    "unexpected status {} from {}",
                    status.as_u16(),
                    uri
                ))),
            }
        }
        .boxed()
    }
}

/// Caller headers layered over the implicit `Accept-Encoding: gzip`
fn build_headers(extra: &[(String, String)]) -> Result<HeaderMap, SourceError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SourceError::Transport(format!("invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| SourceError::Transport(format!("invalid header value {}: {}", value, e)))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

fn gunzip(body: &[u8]) -> Result<String, SourceError> {
    let mut decoded = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut decoded)
        .map_err(|e| SourceError::Transport(format!("gzip decoding failed: {}", e)))?;
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}
