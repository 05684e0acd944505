//! Single-hop HTTP fetching.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::config::REDIRECT_STATUS_CODES;
use crate::error_handling::{categorize_reqwest_error, FetchError};

/// The parts of a hop response the resolver looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw `Location` header, if any
    pub location: Option<String>,
}

impl HopResponse {
    /// Whether the status is one of the followed redirect codes.
    pub fn is_redirect(&self) -> bool {
        REDIRECT_STATUS_CODES.contains(&self.status)
    }
}

/// Issues one request without following redirects.
///
/// Implementations must not follow redirects themselves; the resolver needs
/// to see every hop.
#[async_trait]
pub trait HopFetcher: Send + Sync {
    /// Fetches `url` and reports its status and `Location` header.
    async fn fetch(&self, url: &Url) -> Result<HopResponse, FetchError>;
}

/// `HopFetcher` backed by a `reqwest` client with redirects disabled.
///
/// Build the client with `initialization::init_redirect_client`.
pub struct ReqwestHopFetcher {
    client: Arc<reqwest::Client>,
}

impl ReqwestHopFetcher {
    /// Wraps a client. The client must use `reqwest::redirect::Policy::none()`.
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HopFetcher for ReqwestHopFetcher {
    async fn fetch(&self, url: &Url) -> Result<HopResponse, FetchError> {
        // Shorteners may serve interstitials instead of redirects to clients that
        // do not look like a browser.
        let resp = apply_browser_headers(self.client.get(url.clone()))
            .send()
            .await
            .map_err(|e| categorize_reqwest_error(&e))?;

        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        // Body is never read; dropping the response releases the connection.
        Ok(HopResponse {
            status: resp.status().as_u16(),
            location,
        })
    }
}

fn apply_browser_headers(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    builder
        .header(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        )
        .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .header(
            reqwest::header::HeaderName::from_static("sec-fetch-dest"),
            "document",
        )
        .header(
            reqwest::header::HeaderName::from_static("sec-fetch-mode"),
            "navigate",
        )
        .header(
            reqwest::header::HeaderName::from_static("upgrade-insecure-requests"),
            "1",
        )
}
