//! Domain registration lookups.
//!
//! The domain-age collector depends only on the [`RegistrationSource`]
//! trait. The production source queries RDAP over HTTP and can keep results
//! in an on-disk cache; tests inject their own sources.

mod cache;
mod parse;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

pub use types::RegistrationRecord;

/// Something that can report registration data for a registrable domain.
#[async_trait]
pub trait RegistrationSource: Send + Sync {
    /// Looks up `domain` (e.g. `example.com`).
    ///
    /// Returns `Ok(None)` when the source has no record for the domain.
    async fn lookup(&self, domain: &str) -> Result<Option<RegistrationRecord>>;
}

/// `RegistrationSource` that queries an RDAP service.
///
/// Requests go to `{base_url}/domain/{domain}`. The default base
/// (`https://rdap.org`) redirects to the authoritative registry, so the client
/// must follow redirects.
pub struct RdapSource {
    client: Arc<reqwest::Client>,
    base_url: String,
    cache_dir: Option<PathBuf>,
}

impl RdapSource {
    /// Creates a source. `cache_dir` enables the on-disk cache.
    pub fn new(client: Arc<reqwest::Client>, base_url: &str, cache_dir: Option<PathBuf>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache_dir,
        }
    }

    fn cached(&self, domain: &str) -> Option<RegistrationRecord> {
        let cache_dir = self.cache_dir.as_deref()?;
        match cache::load_from_cache(cache_dir, domain) {
            Ok(Some(entry)) => {
                log::debug!("Registration cache hit for {}", domain);
                Some(entry.result.into())
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("Ignoring unreadable registration cache for {}: {:#}", domain, e);
                None
            }
        }
    }
}

#[async_trait]
impl RegistrationSource for RdapSource {
    async fn lookup(&self, domain: &str) -> Result<Option<RegistrationRecord>> {
        if let Some(record) = self.cached(domain) {
            return Ok(Some(record));
        }

        log::debug!("Starting RDAP lookup for domain: {}", domain);
        let url = format!("{}/domain/{}", self.base_url, domain);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/rdap+json")
            .send()
            .await
            .with_context(|| format!("RDAP request failed for {}", domain))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            log::debug!("RDAP has no record for {}", domain);
            return Ok(None);
        }
        if !status.is_success() {
            anyhow::bail!("RDAP server returned {} for {}", status, domain);
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read RDAP response for {}", domain))?;
        let record = parse::parse_rdap_response(&body)?;
        log::debug!("RDAP lookup successful for {}", domain);

        if let Some(cache_dir) = self.cache_dir.as_deref() {
            // A cache write failure only costs a repeated lookup later
            if let Err(e) = cache::save_to_cache(cache_dir, domain, &record) {
                log::warn!("Failed to cache registration data for {}: {:#}", domain, e);
            }
        }

        Ok(Some(record))
    }
}
