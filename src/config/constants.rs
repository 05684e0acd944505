//! Configuration constants.
//!
//! This module defines the defaults used throughout the engine: timeouts,
//! redirect and input limits, the scoring rule set, and the built-in
//! watch-lists.

use std::time::Duration;

// Request budget
/// Default end-to-end budget for one assessment.
/// Covers redirect resolution plus every collector, including the registration lookup.
pub const DEFAULT_ASSESSMENT_DEADLINE: Duration = Duration::from_millis(8_000);
/// Fraction of the request budget the redirect resolver may consume.
/// The remainder is always left to the collectors so a slow chain cannot starve them.
pub const RESOLVER_BUDGET_FRACTION: f64 = 0.6;
/// Per-collector timeout, capped at whatever is left of the request budget
pub const DEFAULT_COLLECTOR_TIMEOUT: Duration = Duration::from_secs(5);
/// Per-request HTTP timeout in seconds (each redirect hop, each RDAP query)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;

/// Default User-Agent string for HTTP requests.
///
/// Some shorteners serve an interstitial page instead of a redirect to clients that
/// do not look like a browser, so redirect resolution presents itself as one.
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// Input limits
/// Maximum raw input length (2048 characters), matching common browser URL limits
pub const MAX_INPUT_LENGTH: usize = 2048;

// Redirect handling
/// Maximum number of URLs kept in a redirect chain
pub const DEFAULT_MAX_REDIRECT_HOPS: usize = 5;
/// HTTP status codes treated as redirects
pub const REDIRECT_STATUS_CODES: &[u16] = &[301, 302, 303, 307, 308];

// Subdomain structure
/// A subdomain label longer than this is flagged
pub const DEFAULT_MAX_SUBDOMAIN_LABEL_LEN: usize = 20;
/// More subdomain levels than this are flagged
pub const DEFAULT_MAX_SUBDOMAIN_LEVELS: usize = 3;

// Registration data
/// Default RDAP bootstrap service used for domain registration lookups
pub const DEFAULT_RDAP_BASE_URL: &str = "https://rdap.org";
/// WHOIS cache TTL: 7 days (registration data changes infrequently)
pub const WHOIS_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;

// Batch processing
/// Maximum concurrent assessments in CLI batch mode
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

// Scoring rule set.
// Scores run from 0 (certainly malicious) to 100 (certainly safe).
// The weights are inherited heuristics, not calibrated against labeled data.
/// Starting score before any adjustment
pub const BASELINE_SCORE: i32 = 50;
/// Lowest possible score
pub const MIN_SCORE: i32 = 0;
/// Highest possible score
pub const MAX_SCORE: i32 = 100;
/// Final destination is served over HTTPS
pub const HTTPS_ADJUSTMENT: i32 = 10;
/// Registrable domain is older than `ESTABLISHED_DOMAIN_MIN_AGE_DAYS`
pub const ESTABLISHED_DOMAIN_ADJUSTMENT: i32 = 15;
/// A domain strictly older than this many days counts as established
pub const ESTABLISHED_DOMAIN_MIN_AGE_DAYS: i64 = 365;
/// Host is a bare IP literal
pub const RAW_IP_ADJUSTMENT: i32 = -20;
/// Host has an overlong subdomain label or too many subdomain levels
pub const SUBDOMAIN_ADJUSTMENT: i32 = -10;
/// Applied once per matched watch-list token, uncapped
pub const SUSPICIOUS_TOKEN_ADJUSTMENT: i32 = -5;
/// Original host belongs to a link-shortening service
pub const SHORTENER_ADJUSTMENT: i32 = -5;
/// Redirect chain hit the hop limit, looped, or failed to resolve
pub const UNRESOLVED_REDIRECT_ADJUSTMENT: i32 = -10;
/// Scores at or above this are `safe`
pub const SAFE_THRESHOLD: i32 = 70;
/// Scores at or above this (and below `SAFE_THRESHOLD`) are `suspicious`
pub const SUSPICIOUS_THRESHOLD: i32 = 40;

// Watch-lists
/// Hosts known to issue redirecting short links
pub const DEFAULT_SHORTENER_DOMAINS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "t.co",
    "goo.gl",
    "is.gd",
    "buff.ly",
    "ow.ly",
    "rebrand.ly",
    "cutt.ly",
    "tiny.cc",
    "shorturl.at",
    "rb.gy",
];

/// Tokens commonly found in credential-phishing URLs
pub const DEFAULT_SUSPICIOUS_TOKENS: &[&str] = &[
    "login", "verify", "account", "secure", "password", "bank", "update", "confirm",
];
