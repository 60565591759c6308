//! Page fetcher wrapping reqwest.
//!
//! One GET per audit with a browser user-agent and a fixed timeout.
//! No retries; redirects follow the client default.

use crate::types::FetchError;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Default page fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/131.0.0.0 Safari/537.36";

/// Raw page returned by a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Normalized URL that was requested.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    pub body: Vec<u8>,
}

/// Prefix `https://` when the URL does not start with a scheme.
pub fn normalize_url(raw: &str) -> String {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    let scheme = SCHEME.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://")
            .unwrap_or_else(|e| panic!("invalid scheme pattern: {e}"))
    });

    let trimmed = raw.trim();
    if scheme.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// HTTP client for page acquisition.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Create a fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// GET the page at an already normalized URL.
    ///
    /// Anything but a 200 is a [`FetchError::Status`]; transport failures
    /// (including timeouts) are [`FetchError::Network`].
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(FetchError::Status(status));
        }

        let final_url = resp.url().to_string();
        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            body: body.to_vec(),
        })
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}
