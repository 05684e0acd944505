//! Raw input normalization.
//!
//! Turns the string decoded from a QR code into a `NormalizedUrl`: a parsed
//! http(s) URL that is guaranteed to have a host.

use std::fmt;

use serde::{Serialize, Serializer};
use url::{Host, Url};

use crate::config::MAX_INPUT_LENGTH;
use crate::error_handling::InvalidInputError;

/// A well-formed http(s) URL with a non-empty host.
///
/// The only way to build one is [`NormalizedUrl::parse`], so holders can rely
/// on `host()` being present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedUrl {
    url: Url,
    host: String,
}

impl NormalizedUrl {
    /// Normalizes a raw decoded string.
    ///
    /// Trims surrounding whitespace, prefixes `https://` when no scheme is
    /// present, and validates that the result is an http(s) URL with a host.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInputError` if the input is empty, longer than
    /// `MAX_INPUT_LENGTH`, names an unsupported scheme, does not parse, or
    /// has no host.
    pub fn parse(raw: &str) -> Result<Self, InvalidInputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidInputError::Empty);
        }
        if trimmed.len() > MAX_INPUT_LENGTH {
            return Err(InvalidInputError::TooLong {
                len: trimmed.len(),
                max: MAX_INPUT_LENGTH,
            });
        }

        let candidate = match explicit_scheme(trimmed) {
            Some(scheme) if scheme.eq_ignore_ascii_case("http") => trimmed.to_string(),
            Some(scheme) if scheme.eq_ignore_ascii_case("https") => trimmed.to_string(),
            Some(scheme) => return Err(InvalidInputError::UnsupportedScheme(scheme.to_string())),
            None => format!("https://{trimmed}"),
        };

        let url = Url::parse(&candidate).map_err(|e| InvalidInputError::Malformed {
            reason: e.to_string(),
        })?;
        Self::from_url(url)
    }

    /// Wraps an already-parsed URL, enforcing the http(s) and host invariants.
    ///
    /// Used for redirect targets, which arrive as parsed URLs.
    pub fn from_url(url: Url) -> Result<Self, InvalidInputError> {
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(InvalidInputError::UnsupportedScheme(other.to_string())),
        }
        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.trim_end_matches('.').to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => String::new(),
        };
        if host.is_empty() {
            return Err(InvalidInputError::MissingHost(url.to_string()));
        }
        Ok(Self { url, host })
    }

    /// The parsed URL.
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// The serialized URL.
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The host without brackets or trailing dot, lowercased by the parser.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether the host is an IPv4 or IPv6 literal.
    pub fn is_ip_literal(&self) -> bool {
        matches!(self.url.host(), Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)))
    }

    /// The URL scheme (`http` or `https`).
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NormalizedUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Returns the scheme when the input starts with `<scheme>://`.
///
/// Only the `://` form counts: `example.com:8080` has no scheme even though
/// `example.com` would be a syntactically valid one.
fn explicit_scheme(input: &str) -> Option<&str> {
    let (scheme, _) = input.split_once("://")?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        Some(scheme)
    } else {
        None
    }
}
