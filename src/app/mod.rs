//! Batch driver behind the CLI.
//!
//! Reads raw decoded strings, assesses them concurrently (bounded by a
//! semaphore), prints each result as it completes, and logs a summary.

mod output;
mod shutdown;
mod source;
mod statistics;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use log::{error, info, warn};
use tokio::sync::Semaphore;

use crate::config::{EngineSettings, Opt, Watchlists};
use crate::engine::AssessmentEngine;
use crate::scoring::RiskLevel;

pub use output::{render, render_plain};
pub use shutdown::listen_for_ctrl_c;
pub use source::InputSource;
pub use statistics::BatchStats;

/// Totals for a finished batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Inputs processed
    pub total: usize,
    /// Inputs classified `safe`
    pub safe: usize,
    /// Inputs classified `suspicious`
    pub suspicious: usize,
    /// Inputs classified `malicious`
    pub malicious: usize,
    /// Inputs rejected as invalid
    pub invalid: usize,
    /// Wall-clock duration
    pub elapsed_seconds: f64,
}

/// Runs a batch of assessments as described by the CLI options.
///
/// # Errors
///
/// Returns an error if the watch-lists, HTTP clients, or input source cannot
/// be set up, or if reading input fails part-way. Invalid inputs are not
/// errors; they are printed and counted.
pub async fn run_batch(opt: Opt) -> Result<BatchReport> {
    let settings = EngineSettings::from(&opt);
    let watchlists = Watchlists::load(opt.shorteners.as_deref(), opt.tokens.as_deref())
        .context("Failed to load watch-lists")?;
    info!(
        "Loaded {} shortener domains and {} watch-list tokens",
        watchlists.shortener_domains().len(),
        watchlists.suspicious_tokens().len()
    );
    let engine = AssessmentEngine::from_settings(&settings, Arc::new(watchlists))
        .context("Failed to initialize assessment engine")?;

    let mut source = InputSource::open(opt.inputs, opt.file.as_deref()).await?;
    let budget = Duration::from_millis(opt.deadline_ms);
    let output = opt.output;
    let stats = Arc::new(BatchStats::new());
    let semaphore = Arc::new(Semaphore::new(opt.max_concurrency.max(1)));
    let cancel = listen_for_ctrl_c();
    let start = std::time::Instant::now();
    let mut tasks = FuturesUnordered::new();

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = source.next_input() => next?,
        };
        let Some(raw) = next else { break };

        let permit = tokio::select! {
            _ = cancel.cancelled() => break,
            permit = Arc::clone(&semaphore).acquire_owned() => {
                permit.context("Concurrency limiter closed")?
            }
        };

        let engine = engine.clone();
        let stats = Arc::clone(&stats);
        tasks.push(tokio::spawn(async move {
            let _permit = permit;
            let result = engine.assess_within(&raw, budget).await;
            stats.record(&result);
            println!("{}", render(&raw, &result, output));
        }));

        // Reap finished tasks so the set does not grow with the input
        while let Some(Some(joined)) = tasks.next().now_or_never() {
            report_join(joined);
        }
    }

    if cancel.is_cancelled() {
        warn!("Stopped reading input after interrupt");
    }
    while let Some(joined) = tasks.next().await {
        report_join(joined);
    }

    let elapsed_seconds = start.elapsed().as_secs_f64();
    stats.log_summary(elapsed_seconds);
    Ok(BatchReport {
        total: stats.total(),
        safe: stats.count(RiskLevel::Safe),
        suspicious: stats.count(RiskLevel::Suspicious),
        malicious: stats.count(RiskLevel::Malicious),
        invalid: stats.invalid(),
        elapsed_seconds,
    })
}

fn report_join(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!("Assessment task failed: {}", e);
    }
}
