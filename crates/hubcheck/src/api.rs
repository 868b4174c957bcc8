//! REST client for the repository API.
//!
//! Requests are unauthenticated GETs. Any status is returned to the caller
//! as an [`ApiResponse`]; deciding whether a status is acceptable is the
//! test body's job.

use crate::result::{HarnessError, HarnessResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// `User-Agent` sent with every request
pub const USER_AGENT: &str = concat!("hubcheck/", env!("CARGO_PKG_VERSION"));

/// Media type requested from the API
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Repository payload (`GET /repos/{owner}/{repo}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name
    pub name: String,
    /// `owner/name`
    #[serde(default)]
    pub full_name: String,
    /// Owning account
    pub owner: Owner,
    /// Star count
    pub stargazers_count: u64,
    /// Fork count
    #[serde(default)]
    pub forks_count: u64,
    /// Whether the repository is private
    pub private: bool,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
}

/// Owning account of a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Account login
    pub login: String,
}

/// One entry of a directory listing (`GET /repos/{owner}/{repo}/contents`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// File or directory name
    pub name: String,
    /// Path from the repository root
    #[serde(default)]
    pub path: String,
    /// `file`, `dir`, `symlink` or `submodule`
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Error payload returned with 4xx statuses
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable message ("Not Found")
    #[serde(default)]
    pub message: String,
    /// Link to the relevant documentation
    #[serde(default)]
    pub documentation_url: Option<String>,
}

/// A received response, any status
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Requested URL
    pub url: String,
    /// HTTP status code
    pub status: u16,
    headers: HeaderMap,
    /// Decoded body; `Null` when empty, a JSON string when not JSON
    pub body: Value,
}

impl ApiResponse {
    /// Header value by case-insensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Fail with `UnexpectedStatus` unless the status is `expected`
    pub fn expect_status(&self, expected: u16) -> HarnessResult<&Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(HarnessError::UnexpectedStatus {
                url: self.url.clone(),
                expected,
                actual: self.status,
            })
        }
    }

    /// Decode the body into a typed payload
    pub fn json<T: DeserializeOwned>(&self) -> HarnessResult<T> {
        Ok(T::deserialize(&self.body)?)
    }
}

/// HTTP client for the REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for `base_url`
    pub fn new(base_url: impl Into<String>) -> HarnessResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a client with a custom reqwest client
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` below the base URL
    pub async fn get(&self, path: &str) -> HarnessResult<ApiResponse> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        info!("Making GET request to: {url}");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status().as_u16();
        info!("Response status code: {status}");

        let headers = resp.headers().clone();
        let text = resp.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|e| {
                debug!("Body of {url} is not JSON: {e}");
                Value::String(text)
            })
        };

        Ok(ApiResponse {
            url,
            status,
            headers,
            body,
        })
    }

    /// `GET /repos/{slug}` where `slug` is `owner/repo`
    pub async fn repository(&self, slug: &str) -> HarnessResult<ApiResponse> {
        self.get(&format!("repos/{slug}")).await
    }

    /// `GET /repos/{slug}/contents`
    pub async fn contents(&self, slug: &str) -> HarnessResult<ApiResponse> {
        self.get(&format!("repos/{slug}/contents")).await
    }
}
