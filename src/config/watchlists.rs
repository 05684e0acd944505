//! Shortener and lexical watch-lists.
//!
//! Loaded once at start-up and shared read-only (behind an `Arc`) by every
//! assessment.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::constants::{DEFAULT_SHORTENER_DOMAINS, DEFAULT_SUSPICIOUS_TOKENS};

/// Immutable lists consulted by the shortener and lexical collectors.
///
/// Entries are stored lowercased and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlists {
    shortener_domains: Vec<String>,
    suspicious_tokens: Vec<String>,
}

impl Default for Watchlists {
    fn default() -> Self {
        Self::new(
            DEFAULT_SHORTENER_DOMAINS.iter().copied(),
            DEFAULT_SUSPICIOUS_TOKENS.iter().copied(),
        )
    }
}

impl Watchlists {
    /// Builds watch-lists from arbitrary entries.
    pub fn new<S, T>(
        shortener_domains: impl IntoIterator<Item = S>,
        suspicious_tokens: impl IntoIterator<Item = T>,
    ) -> Self
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            shortener_domains: normalize_entries(shortener_domains, |d| {
                d.trim_end_matches('.').to_string()
            }),
            suspicious_tokens: normalize_entries(suspicious_tokens, str::to_string),
        }
    }

    /// Loads watch-lists, replacing either built-in list with the contents of a file when given.
    ///
    /// Files hold one entry per line; blank lines and lines starting with `#` are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or contains no entries.
    pub fn load(shorteners: Option<&Path>, tokens: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let shortener_domains = match shorteners {
            Some(path) => read_list_file(path)?,
            None => defaults.shortener_domains,
        };
        let suspicious_tokens = match tokens {
            Some(path) => read_list_file(path)?,
            None => defaults.suspicious_tokens,
        };
        Ok(Self::new(shortener_domains, suspicious_tokens))
    }

    /// Known shortener domains, lowercased.
    pub fn shortener_domains(&self) -> &[String] {
        &self.shortener_domains
    }

    /// Watched lexical tokens, lowercased.
    pub fn suspicious_tokens(&self) -> &[String] {
        &self.suspicious_tokens
    }

    /// Whether `host` is a listed shortener or a subdomain of one.
    pub fn is_shortener_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.shortener_domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

fn normalize_entries<I, S>(entries: I, shape: impl Fn(&str) -> String) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.as_ref().trim().to_lowercase();
        if entry.is_empty() {
            continue;
        }
        let entry = shape(&entry);
        if !out.contains(&entry) {
            out.push(entry);
        }
    }
    out
}

fn read_list_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read watch-list file {}", path.display()))?;
    let entries: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    if entries.is_empty() {
        anyhow::bail!("Watch-list file {} has no entries", path.display());
    }
    Ok(entries)
}
