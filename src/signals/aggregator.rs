//! Concurrent fan-out over the collectors.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, warn};
use tokio::task::AbortHandle;
use tokio::time::Instant;

use super::collectors::{CollectorTarget, SignalCollector};
use super::{SignalEntry, SignalName, Signals};
use crate::error_handling::CollectorError;
use crate::input::NormalizedUrl;
use crate::redirect::RedirectChain;

/// Aborts every collector task still running when dropped.
///
/// Covers both the deadline path and a caller dropping the `collect` future.
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Runs a set of collectors concurrently under one deadline.
///
/// Collector names should be unique; each collector owns one entry in the
/// resulting [`Signals`].
#[derive(Clone)]
pub struct SignalAggregator {
    collectors: Vec<Arc<dyn SignalCollector>>,
    collector_timeout: Duration,
}

impl SignalAggregator {
    /// Creates an aggregator. `collector_timeout` bounds collectors that do
    /// not declare their own timeout.
    pub fn new(collectors: Vec<Arc<dyn SignalCollector>>, collector_timeout: Duration) -> Self {
        Self {
            collectors,
            collector_timeout,
        }
    }

    /// The signals this aggregator produces.
    pub fn signal_names(&self) -> impl Iterator<Item = SignalName> + '_ {
        self.collectors.iter().map(|collector| collector.name())
    }

    /// Runs every collector and returns one entry per collector.
    ///
    /// Never fails: a collector that errors or panics is recorded as `error`,
    /// and any collector still running at `deadline` is cancelled and
    /// recorded as `timed-out`.
    pub async fn collect(
        &self,
        normalized: &NormalizedUrl,
        chain: &RedirectChain,
        deadline: Instant,
    ) -> Signals {
        let target = Arc::new(CollectorTarget::new(normalized.clone(), chain.clone()));
        let mut guard = AbortOnDrop(Vec::with_capacity(self.collectors.len()));
        let mut pending = FuturesUnordered::new();

        for collector in &self.collectors {
            let name = collector.name();
            let budget = collector.timeout().unwrap_or(self.collector_timeout);
            let task_deadline = deadline.min(Instant::now() + budget);
            let collector = Arc::clone(collector);
            let target = Arc::clone(&target);

            let handle = tokio::spawn(async move {
                debug!("Running {} collector", name);
                match tokio::time::timeout_at(task_deadline, collector.collect(&target)).await {
                    Ok(Ok(value)) => SignalEntry::ok(value),
                    Ok(Err(CollectorError::Unavailable(detail))) => {
                        SignalEntry::unavailable(detail)
                    }
                    Ok(Err(CollectorError::Failed(detail))) => SignalEntry::error(detail),
                    Err(_) => SignalEntry::timed_out(format!(
                        "collector exceeded its {}ms budget",
                        budget.as_millis()
                    )),
                }
            });
            guard.0.push(handle.abort_handle());
            pending.push(async move { (name, handle.await) });
        }

        let mut signals = Signals::default();
        loop {
            match tokio::time::timeout_at(deadline, pending.next()).await {
                Ok(Some((name, Ok(entry)))) => {
                    if !entry.is_ok() {
                        warn!(
                            "Signal {} is {} for {}: {}",
                            name,
                            entry.status(),
                            normalized,
                            entry.detail().unwrap_or_default()
                        );
                    }
                    signals.insert(name, entry);
                }
                Ok(Some((name, Err(join_error)))) => {
                    let detail = if join_error.is_panic() {
                        "collector panicked"
                    } else {
                        "collector was cancelled"
                    };
                    warn!("Signal {} failed for {}: {}", name, normalized, detail);
                    signals.insert(name, SignalEntry::error(detail));
                }
                Ok(None) => break,
                Err(_) => {
                    debug!("Request deadline elapsed with collectors still running");
                    break;
                }
            }
        }
        drop(pending);
        drop(guard);

        for name in self.signal_names() {
            if !signals.contains(name) {
                warn!("Signal {} timed out for {}", name, normalized);
                signals.insert(name, SignalEntry::timed_out("request deadline elapsed"));
            }
        }
        signals
    }
}
