//! Engine configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, scoring weights and thresholds)
//! - Immutable watch-lists shared by the collectors
//! - CLI option types and library settings

mod constants;
mod types;
mod watchlists;

// Re-export all constants
pub use constants::*;
pub use types::{EngineSettings, LogFormat, LogLevel, Opt, OutputFormat};
pub use watchlists::Watchlists;
