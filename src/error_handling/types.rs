//! Error type definitions.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// The raw input could not be turned into a URL with a host.
///
/// This is the only failure that is fatal to an assessment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInputError {
    /// Nothing left after trimming whitespace.
    #[error("could not understand this code: input is empty")]
    Empty,

    /// Input exceeds the maximum accepted length.
    #[error("could not understand this code: input is {len} characters (max {max})")]
    TooLong {
        /// Length of the rejected input
        len: usize,
        /// Maximum accepted length
        max: usize,
    },

    /// Input names a scheme other than http or https.
    #[error("could not understand this code: unsupported scheme '{0}'")]
    UnsupportedScheme(String),

    /// Input does not parse as a URL even after scheme coercion.
    #[error("could not understand this code: {reason}")]
    Malformed {
        /// Parser diagnostic
        reason: String,
    },

    /// Input parsed but has no usable host component.
    #[error("could not understand this code: no host in '{0}'")]
    MissingHost(String),
}

/// Why a collector produced no value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectorError {
    /// The data source has nothing for this target (e.g. no registration record).
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The collector failed unexpectedly.
    #[error("failed: {0}")]
    Failed(String),
}

/// Failure fetching one redirect hop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not complete in time.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Connection, TLS, or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error loading watch-lists or other start-up configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
