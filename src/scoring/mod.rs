//! Risk scoring.
//!
//! Maps a [`Signals`] record to a score in `[0, 100]` and a [`RiskLevel`].
//! Pure and deterministic: the same signals always give the same result.
//!
//! Adjustments are applied to `BASELINE_SCORE` in signal order, each
//! independently, and the sum is clamped once at the end. A signal whose
//! status is not `ok` contributes nothing, so missing data is never read as
//! good or bad news.

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::config::{
    BASELINE_SCORE, ESTABLISHED_DOMAIN_ADJUSTMENT, ESTABLISHED_DOMAIN_MIN_AGE_DAYS,
    HTTPS_ADJUSTMENT, MAX_SCORE, MIN_SCORE, RAW_IP_ADJUSTMENT, SAFE_THRESHOLD,
    SHORTENER_ADJUSTMENT, SUBDOMAIN_ADJUSTMENT, SUSPICIOUS_THRESHOLD, SUSPICIOUS_TOKEN_ADJUSTMENT,
    UNRESOLVED_REDIRECT_ADJUSTMENT,
};
use crate::signals::{SignalName, Signals};

/// Three-way classification of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RiskLevel {
    /// `score >= SAFE_THRESHOLD`
    Safe,
    /// `SUSPICIOUS_THRESHOLD <= score < SAFE_THRESHOLD`
    Suspicious,
    /// `score < SUSPICIOUS_THRESHOLD`
    Malicious,
}

impl RiskLevel {
    /// Classifies a score.
    pub fn from_score(score: u8) -> Self {
        let score = i32::from(score);
        if score >= SAFE_THRESHOLD {
            RiskLevel::Safe
        } else if score >= SUSPICIOUS_THRESHOLD {
            RiskLevel::Suspicious
        } else {
            RiskLevel::Malicious
        }
    }
}

/// One applied score change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Adjustment {
    /// Signal responsible
    pub signal: SignalName,
    /// Points added (negative for penalties)
    pub delta: i32,
    /// Short human-readable explanation
    pub reason: String,
}

/// Result of scoring a set of signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    /// Clamped score
    pub score: u8,
    /// Classification of `score`
    pub risk_level: RiskLevel,
    /// Adjustments applied, in order
    pub adjustments: Vec<Adjustment>,
}

/// Scores a set of signals.
pub fn score(signals: &Signals) -> ScoreCard {
    let mut adjustments = Vec::new();
    let mut apply = |signal: SignalName, delta: i32, reason: String| {
        adjustments.push(Adjustment {
            signal,
            delta,
            reason,
        });
    };

    if signals.has_https() == Some(true) {
        apply(
            SignalName::HasHttps,
            HTTPS_ADJUSTMENT,
            "destination uses HTTPS".to_string(),
        );
    }
    if let Some(days) = signals.domain_age_days() {
        if days > ESTABLISHED_DOMAIN_MIN_AGE_DAYS {
            apply(
                SignalName::DomainAgeDays,
                ESTABLISHED_DOMAIN_ADJUSTMENT,
                format!("domain registered {days} days ago"),
            );
        }
    }
    if signals.is_raw_ip() == Some(true) {
        apply(
            SignalName::IsRawIp,
            RAW_IP_ADJUSTMENT,
            "host is a raw IP address".to_string(),
        );
    }
    if signals.has_long_or_many_subdomains() == Some(true) {
        apply(
            SignalName::HasLongOrManySubdomains,
            SUBDOMAIN_ADJUSTMENT,
            "unusually long or deep subdomains".to_string(),
        );
    }
    if let Some(tokens) = signals.suspicious_tokens() {
        if !tokens.is_empty() {
            let count = i32::try_from(tokens.len()).unwrap_or(i32::MAX);
            let listed: Vec<&str> = tokens.iter().map(String::as_str).collect();
            apply(
                SignalName::SuspiciousTokens,
                SUSPICIOUS_TOKEN_ADJUSTMENT.saturating_mul(count),
                format!("suspicious words: {}", listed.join(", ")),
            );
        }
    }
    if signals.is_known_shortener() == Some(true) {
        apply(
            SignalName::IsKnownShortener,
            SHORTENER_ADJUSTMENT,
            "link uses a URL shortener".to_string(),
        );
    }
    if let Some(chain) = signals.redirect_chain() {
        if chain.is_unresolved() {
            apply(
                SignalName::RedirectChain,
                UNRESOLVED_REDIRECT_ADJUSTMENT,
                format!("redirects did not resolve ({})", chain.termination()),
            );
        }
    }

    let total = adjustments
        .iter()
        .fold(BASELINE_SCORE, |acc, adjustment| {
            acc.saturating_add(adjustment.delta)
        })
        .clamp(MIN_SCORE, MAX_SCORE);
    // Clamped to [0, 100] above
    let score = u8::try_from(total).unwrap_or(0);

    ScoreCard {
        score,
        risk_level: RiskLevel::from_score(score),
        adjustments,
    }
}
