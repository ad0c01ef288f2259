//! Blocking HTTP client shared by the resource wrappers.

use crate::error::{normalize_message, ApiError, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Where the three resources live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_recipes_url")]
    pub recipes_url: String,
    #[serde(default = "default_albums_url")]
    pub albums_url: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const DEFAULT_BASE: &str = "http://localhost:2356";

fn default_recipes_url() -> String {
    format!("{DEFAULT_BASE}/recipes")
}

fn default_albums_url() -> String {
    format!("{DEFAULT_BASE}/albums")
}

fn default_auth_url() -> String {
    format!("{DEFAULT_BASE}/auth")
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::with_base(DEFAULT_BASE)
    }
}

impl ApiConfig {
    /// Point all three resources at one server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            recipes_url: format!("{base}/recipes"),
            albums_url: format!("{base}/albums"),
            auth_url: format!("{base}/auth"),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// HTTP implementation of the resource traits.
///
/// The session cookie set by the login call lives in the client's cookie
/// store and is sent with every later request.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    pub(super) recipes: Url,
    pub(super) albums: Url,
    pub(super) auth: Url,
}

impl HttpClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            recipes: parse_base(&config.recipes_url)?,
            albums: parse_base(&config.albums_url)?,
            auth: parse_base(&config.auth_url)?,
        })
    }

    pub(super) fn get(&self, url: Url) -> RequestBuilder {
        tracing::debug!("GET {}", url);
        self.client.get(url)
    }

    pub(super) fn post(&self, url: Url) -> RequestBuilder {
        tracing::debug!("POST {}", url);
        self.client.post(url)
    }

    pub(super) fn put(&self, url: Url) -> RequestBuilder {
        tracing::debug!("PUT {}", url);
        self.client.put(url)
    }

    pub(super) fn delete(&self, url: Url) -> RequestBuilder {
        tracing::debug!("DELETE {}", url);
        self.client.delete(url)
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

/// Append path segments to a resource base. Segments are percent-encoded.
pub(super) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn a non-success response into an [`ApiError::Status`].
pub(super) fn check(response: Response, fallback: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = response.text().unwrap_or_default();
    let message = normalize_message(content_type.as_deref(), &body, fallback);
    tracing::warn!("{} ({}): {}", fallback, status.as_u16(), message);

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
        body,
    })
}

/// Check the status and decode the JSON body.
pub(super) fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
    let text = check(response, fallback)?.text()?;
    Ok(serde_json::from_str(&text)?)
}
