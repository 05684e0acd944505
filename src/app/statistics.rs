//! Batch statistics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::info;
use strum::IntoEnumIterator;

use crate::engine::Assessment;
use crate::error_handling::InvalidInputError;
use crate::scoring::RiskLevel;
use crate::signals::SignalName;

/// Thread-safe counters for a batch of assessments.
///
/// Every risk level and signal name is initialized to zero on creation, so
/// the summary always lists the same categories.
pub struct BatchStats {
    levels: HashMap<RiskLevel, AtomicUsize>,
    degraded: HashMap<SignalName, AtomicUsize>,
    invalid: AtomicUsize,
}

impl Default for BatchStats {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self {
            levels: RiskLevel::iter().map(|l| (l, AtomicUsize::new(0))).collect(),
            degraded: SignalName::iter()
                .map(|n| (n, AtomicUsize::new(0)))
                .collect(),
            invalid: AtomicUsize::new(0),
        }
    }

    /// Counts one assessment outcome.
    pub fn record(&self, result: &Result<Assessment, InvalidInputError>) {
        match result {
            Ok(assessment) => {
                if let Some(counter) = self.levels.get(&assessment.risk_level()) {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
                for (name, _) in assessment.signals().degraded() {
                    if let Some(counter) = self.degraded.get(&name) {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
            Err(_) => {
                self.invalid.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Assessments classified as `level`.
    pub fn count(&self, level: RiskLevel) -> usize {
        self.levels
            .get(&level)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Assessments where `name` was not `ok`.
    pub fn degraded(&self, name: SignalName) -> usize {
        self.degraded
            .get(&name)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Inputs rejected as invalid.
    pub fn invalid(&self) -> usize {
        self.invalid.load(Ordering::SeqCst)
    }

    /// Inputs seen, valid or not.
    pub fn total(&self) -> usize {
        RiskLevel::iter().map(|l| self.count(l)).sum::<usize>() + self.invalid()
    }

    /// Logs a summary of the batch.
    pub fn log_summary(&self, elapsed_seconds: f64) {
        let total = self.total();
        let rate = if elapsed_seconds > 0.0 {
            total as f64 / elapsed_seconds
        } else {
            0.0
        };
        info!(
            "Assessed {} input{} in {:.1}s (~{:.2}/sec)",
            total,
            if total == 1 { "" } else { "s" },
            elapsed_seconds,
            rate
        );
        for level in RiskLevel::iter() {
            info!("   {}: {}", level, self.count(level));
        }
        info!("   invalid: {}", self.invalid());

        let degraded: Vec<(SignalName, usize)> = SignalName::iter()
            .map(|name| (name, self.degraded(name)))
            .filter(|(_, count)| *count > 0)
            .collect();
        if !degraded.is_empty() {
            info!("Degraded signals:");
            for (name, count) in degraded {
                info!("   {}: {}", name, count);
            }
        }
    }
}
