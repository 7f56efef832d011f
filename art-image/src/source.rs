//! Byte sources: the `fetch(url) -> bytes` capability behind the fetcher.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use url::Url;

use crate::error::FetchError;

/// Default user agent for HTTP fetches.
pub const DEFAULT_USER_AGENT: &str = concat!("emoji-art/", env!("CARGO_PKG_VERSION"));

/// Asynchronously retrieves the raw bytes behind a URL.
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Fetch the bytes at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be retrieved.
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// Settings for HTTP fetching.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Upper bound for a single fetch, or `None` to wait indefinitely.
    pub timeout: Option<Duration>,
    /// User agent sent with HTTP requests.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Fetches `http`/`https` URLs with `reqwest` and decodes `data:` URIs inline.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: Client,
}

impl HttpSource {
    /// Create a source with the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client fails to build.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }
}

#[async_trait]
impl ByteSource for HttpSource {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        match url.scheme() {
            "data" => decode_data_uri(url.as_str()),
            "http" | "https" => {
                tracing::debug!("GET {url}");
                let response = self.http.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }
                Ok(response.bytes().await?.to_vec())
            }
            other => Err(FetchError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Decode the payload of a data URI.
///
/// Supports formats like: `data:image/png;base64,iVBORw0KGgo...` as well as
/// percent-encoded payloads.
///
/// # Errors
///
/// Returns [`FetchError::DataUri`] if the URI is malformed.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, FetchError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| FetchError::DataUri("not a data URI".to_string()))?;
    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| FetchError::DataUri("missing comma".to_string()))?;

    if metadata.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(percent_decode(payload)?)
            .map_err(|e| FetchError::DataUri(format!("bad base64: {e}")))
    } else {
        percent_decode(payload)
    }
}

fn percent_decode(input: &str) -> Result<Vec<u8>, FetchError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| FetchError::DataUri("invalid percent-encoding".to_string()))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}
