//! qr_trap library: risk assessment for URLs decoded from QR codes
//!
//! Given the raw string decoded from a QR code, the engine normalizes it into
//! a URL, follows its redirect chain hop by hop, gathers independent risk
//! signals concurrently under a deadline, and scores them with a fixed,
//! explainable rule set.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use qr_trap::{AssessmentEngine, EngineSettings, Watchlists};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = AssessmentEngine::from_settings(
//!     &EngineSettings::default(),
//!     Arc::new(Watchlists::default()),
//! )?;
//!
//! match engine.assess_within("bit.ly/abc", Duration::from_secs(8)).await {
//!     Ok(assessment) => println!(
//!         "{} scored {} ({})",
//!         assessment.final_url(),
//!         assessment.score(),
//!         assessment.risk_level()
//!     ),
//!     Err(e) => println!("{e}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod app;
pub mod config;
mod domain;
mod engine;
mod error_handling;
pub mod initialization;
mod input;
pub mod redirect;
pub mod scoring;
pub mod signals;
pub mod whois;

// Re-export public API
pub use app::{run_batch, BatchReport, BatchStats};
pub use config::{EngineSettings, LogFormat, LogLevel, Opt, OutputFormat, Watchlists};
pub use domain::{registrable_domain, subdomain_labels};
pub use engine::{Assessment, AssessmentEngine};
pub use error_handling::{CollectorError, FetchError, InitializationError, InvalidInputError};
pub use input::NormalizedUrl;
pub use redirect::{ChainTermination, RedirectChain};
pub use scoring::RiskLevel;
pub use signals::{SignalName, SignalStatus, Signals};
