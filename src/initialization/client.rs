//! HTTP client initialization.
//!
//! This module provides functions to initialize HTTP clients with proper
//! configuration for requests and redirect handling.

use std::sync::Arc;

use crate::config::EngineSettings;
use reqwest::ClientBuilder;

/// Initializes the HTTP client used for registration lookups.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from settings
/// - Timeout from settings
/// - Redirect following enabled (RDAP bootstrap services answer with redirects)
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(settings: &EngineSettings) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(settings.http_timeout)
        .user_agent(settings.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes a shared HTTP client for redirect resolution.
///
/// Creates a `reqwest::Client` with redirects disabled so every hop of a
/// chain is visible to the resolver.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_redirect_client(
    settings: &EngineSettings,
) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(settings.http_timeout)
        .user_agent(settings.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
