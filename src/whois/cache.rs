//! Registration data cache management.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::types::{RegistrationRecord, WhoisCacheEntry};
use crate::config::WHOIS_CACHE_TTL_SECS;

fn cache_file(cache_path: &Path, domain: &str) -> PathBuf {
    cache_path.join(format!("{}.json", domain.replace('.', "_")))
}

/// Loads a cached registration record from disk
pub(crate) fn load_from_cache(cache_path: &Path, domain: &str) -> Result<Option<WhoisCacheEntry>> {
    let cache_file = cache_file(cache_path, domain);

    if !cache_file.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&cache_file).context("Failed to read cache file")?;
    let entry: WhoisCacheEntry =
        serde_json::from_str(&content).context("Failed to parse cache file")?;

    // Check if cache is still valid
    let age = entry.cached_at.elapsed().unwrap_or_default();
    if age.as_secs() > WHOIS_CACHE_TTL_SECS {
        // Cache expired, delete it
        let _ = std::fs::remove_file(&cache_file);
        return Ok(None);
    }

    Ok(Some(entry))
}

/// Saves a registration record to disk cache
pub(crate) fn save_to_cache(
    cache_path: &Path,
    domain: &str,
    record: &RegistrationRecord,
) -> Result<()> {
    save_entry(
        cache_path,
        &WhoisCacheEntry {
            result: record.into(),
            cached_at: SystemTime::now(),
            domain: domain.to_string(),
        },
    )
}

fn save_entry(cache_path: &Path, entry: &WhoisCacheEntry) -> Result<()> {
    std::fs::create_dir_all(cache_path).context("Failed to create cache directory")?;

    let content =
        serde_json::to_string_pretty(entry).context("Failed to serialize cache entry")?;
    std::fs::write(cache_file(cache_path, &entry.domain), content)
        .context("Failed to write cache file")?;

    Ok(())
}
