//! Error types and error categorization.
//!
//! This module provides:
//! - Typed errors for the request boundary (`InvalidInputError`) and the
//!   collector and fetcher seams
//! - Initialization errors for the CLI start-up path
//! - Categorization of `reqwest` failures into fetch error kinds
//!
//! Only `InvalidInputError` ever reaches the caller of `assess`. Every other
//! failure is absorbed into a signal status or a redirect-chain terminal.

mod categorization;
mod types;

// Re-export public API
pub use categorization::categorize_reqwest_error;
pub use types::{CollectorError, FetchError, InitializationError, InvalidInputError};
