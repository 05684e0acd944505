//! Host label utilities.
//!
//! The registrable domain is approximated as the last two labels of the host
//! (`www.example.co.uk` gives `co.uk`). That matches how subdomains are counted
//! for the structure check and keeps the engine free of a Public Suffix List
//! download.
//!
//! Key functions:
//! - `registrable_domain()` - The last two labels of a hostname
//! - `subdomain_labels()` - Every label in front of the registrable domain
//!
//! IP literals have neither: both functions treat them as label-less.

use std::net::IpAddr;

/// Whether `host` is an IPv4 or IPv6 literal (brackets allowed).
fn is_ip_literal(host: &str) -> bool {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok()
}

/// Splits a hostname into non-empty, lowercased labels.
fn labels(host: &str) -> Vec<String> {
    host.trim_end_matches('.')
        .split('.')
        .filter(|label| !label.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

/// Returns the registrable domain of a hostname.
///
/// # Returns
///
/// The last two labels joined with a dot, the single label for one-label
/// hosts (e.g. `localhost`), or `None` when the host has no labels or is an
/// IP literal.
pub fn registrable_domain(host: &str) -> Option<String> {
    if is_ip_literal(host) {
        return None;
    }
    let labels = labels(host);
    match labels.len() {
        0 => None,
        1 => Some(labels[0].clone()),
        n => Some(labels[n - 2..].join(".")),
    }
}

/// Returns the labels in front of the registrable domain, leftmost first.
///
/// `a.b.example.com` gives `["a", "b"]`; `example.com` and IP literals give
/// an empty list.
pub fn subdomain_labels(host: &str) -> Vec<String> {
    if is_ip_literal(host) {
        return Vec::new();
    }
    let mut labels = labels(host);
    let keep = labels.len().saturating_sub(2);
    labels.truncate(keep);
    labels
}
