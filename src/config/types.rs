//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and the library-level engine settings.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_ASSESSMENT_DEADLINE, DEFAULT_COLLECTOR_TIMEOUT, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_REDIRECT_HOPS, DEFAULT_MAX_SUBDOMAIN_LABEL_LEN,
    DEFAULT_MAX_SUBDOMAIN_LEVELS, DEFAULT_RDAP_BASE_URL, DEFAULT_USER_AGENT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// How assessments are written to stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable report per input
    Plain,
    /// One JSON object per line
    Json,
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Assess a single decoded string
/// qr_trap "bit.ly/abc"
///
/// # Assess every line of a file, emitting JSON lines
/// qr_trap --file decoded.txt --output json
///
/// # Read from stdin with a tighter budget
/// cat decoded.txt | qr_trap --file - --deadline-ms 3000
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "qr_trap",
    about = "Scores the risk of URLs decoded from QR codes."
)]
pub struct Opt {
    /// Raw strings decoded from QR codes
    #[arg(value_parser)]
    pub inputs: Vec<String>,

    /// File with one decoded string per line ("-" reads stdin)
    #[arg(long, value_parser)]
    pub file: Option<PathBuf>,

    /// Output format: plain|json
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// End-to-end budget per assessment in milliseconds
    #[arg(long, default_value_t = DEFAULT_ASSESSMENT_DEADLINE.as_millis() as u64)]
    pub deadline_ms: u64,

    /// Maximum number of URLs kept in a redirect chain
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECT_HOPS)]
    pub max_hops: usize,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Maximum concurrent assessments when several inputs are given
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// RDAP service used for domain registration lookups
    #[arg(long, default_value = DEFAULT_RDAP_BASE_URL)]
    pub rdap_url: String,

    /// Directory for cached registration data (disabled when omitted)
    #[arg(long)]
    pub whois_cache_dir: Option<PathBuf>,

    /// Skip the registration lookup; the domain-age signal is left out
    #[arg(long)]
    pub disable_domain_age: bool,

    /// File listing shortener domains, one per line (replaces the built-in list)
    #[arg(long)]
    pub shorteners: Option<PathBuf>,

    /// File listing suspicious tokens, one per line (replaces the built-in list)
    #[arg(long)]
    pub tokens: Option<PathBuf>,

    /// Subdomain labels longer than this are flagged
    #[arg(long, default_value_t = DEFAULT_MAX_SUBDOMAIN_LABEL_LEN)]
    pub max_subdomain_label_len: usize,

    /// More subdomain levels than this are flagged
    #[arg(long, default_value_t = DEFAULT_MAX_SUBDOMAIN_LEVELS)]
    pub max_subdomain_levels: usize,
}

/// Library settings for the assessment engine (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use qr_trap::EngineSettings;
///
/// let settings = EngineSettings {
///     max_redirect_hops: 3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Maximum number of URLs kept in a redirect chain (at least 1)
    pub max_redirect_hops: usize,

    /// Per-request HTTP timeout
    pub http_timeout: Duration,

    /// Upper bound for any single collector
    pub collector_timeout: Duration,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// RDAP service base URL
    pub rdap_base_url: String,

    /// On-disk cache for registration data
    pub whois_cache_dir: Option<PathBuf>,

    /// Whether the registration lookup runs at all
    pub enable_domain_age: bool,

    /// Subdomain labels longer than this are flagged
    pub max_subdomain_label_len: usize,

    /// More subdomain levels than this are flagged
    pub max_subdomain_levels: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_redirect_hops: DEFAULT_MAX_REDIRECT_HOPS,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            collector_timeout: DEFAULT_COLLECTOR_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rdap_base_url: DEFAULT_RDAP_BASE_URL.to_string(),
            whois_cache_dir: None,
            enable_domain_age: true,
            max_subdomain_label_len: DEFAULT_MAX_SUBDOMAIN_LABEL_LEN,
            max_subdomain_levels: DEFAULT_MAX_SUBDOMAIN_LEVELS,
        }
    }
}

impl From<&Opt> for EngineSettings {
    fn from(opt: &Opt) -> Self {
        Self {
            max_redirect_hops: opt.max_hops.max(1),
            http_timeout: Duration::from_secs(opt.timeout_seconds),
            collector_timeout: DEFAULT_COLLECTOR_TIMEOUT,
            user_agent: opt.user_agent.clone(),
            rdap_base_url: opt.rdap_url.clone(),
            whois_cache_dir: opt.whois_cache_dir.clone(),
            enable_domain_age: !opt.disable_domain_age,
            max_subdomain_label_len: opt.max_subdomain_label_len,
            max_subdomain_levels: opt.max_subdomain_levels,
        }
    }
}
