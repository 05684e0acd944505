//! Risk signals and their collection.
//!
//! A signal is one independently computed observation about a URL. Every
//! collector contributes exactly one [`SignalEntry`] to [`Signals`], carrying
//! either a value (`ok`) or the reason it has none (`unavailable`,
//! `timed-out`, `error`).

mod aggregator;
mod collectors;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::redirect::RedirectChain;

pub use aggregator::SignalAggregator;
pub use collectors::{
    default_collectors, lexical_haystack, CollectorTarget, DomainAgeCollector, HttpsCollector,
    LexicalCollector, RawIpCollector, RedirectChainCollector, ShortenerCollector, SignalCollector,
    SubdomainCollector,
};

/// Names of the signals the engine knows about.
///
/// Variant order is the order the scorer applies adjustments in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Display,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SignalName {
    /// Final URL uses HTTPS
    HasHttps,
    /// Age of the registrable domain in days
    DomainAgeDays,
    /// Final host is an IP literal
    IsRawIp,
    /// Host has too many or overly long subdomain labels
    HasLongOrManySubdomains,
    /// Watch-list tokens found in the URL
    SuspiciousTokens,
    /// Original host is a known URL shortener
    IsKnownShortener,
    /// The resolved redirect chain
    RedirectChain,
}

/// Outcome of one collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SignalStatus {
    /// The collector produced a value.
    Ok,
    /// The collector could not get data (e.g. no registration record).
    Unavailable,
    /// The collector did not finish in time.
    TimedOut,
    /// The collector failed unexpectedly.
    Error,
}

/// Value of a signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SignalValue {
    /// Boolean observation
    Flag(bool),
    /// Count of days
    Days(i64),
    /// Matched tokens
    Tokens(BTreeSet<String>),
    /// Redirect chain
    Chain(RedirectChain),
}

/// One entry in [`Signals`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalEntry {
    status: SignalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<SignalValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl SignalEntry {
    /// A successful observation.
    pub fn ok(value: SignalValue) -> Self {
        Self {
            status: SignalStatus::Ok,
            value: Some(value),
            detail: None,
        }
    }

    /// No data available.
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::without_value(SignalStatus::Unavailable, detail)
    }

    /// The collector ran out of time.
    pub fn timed_out(detail: impl Into<String>) -> Self {
        Self::without_value(SignalStatus::TimedOut, detail)
    }

    /// The collector failed.
    pub fn error(detail: impl Into<String>) -> Self {
        Self::without_value(SignalStatus::Error, detail)
    }

    fn without_value(status: SignalStatus, detail: impl Into<String>) -> Self {
        Self {
            status,
            value: None,
            detail: Some(detail.into()),
        }
    }

    /// Entry status.
    pub fn status(&self) -> SignalStatus {
        self.status
    }

    /// The value, present only when the status is `ok`.
    pub fn value(&self) -> Option<&SignalValue> {
        self.value.as_ref()
    }

    /// Why there is no value.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Whether the entry is `ok`.
    pub fn is_ok(&self) -> bool {
        self.status == SignalStatus::Ok
    }
}

/// All signals gathered for one assessment, keyed by name.
///
/// The typed getters return `None` unless the signal's status is `ok`, so
/// callers cannot mistake missing data for a negative observation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Signals {
    entries: BTreeMap<SignalName, SignalEntry>,
}

impl Signals {
    /// Records the entry for `name`, replacing any previous one.
    pub fn insert(&mut self, name: SignalName, entry: SignalEntry) {
        self.entries.insert(name, entry);
    }

    /// The entry for `name`, whatever its status.
    pub fn get(&self, name: SignalName) -> Option<&SignalEntry> {
        self.entries.get(&name)
    }

    /// Whether an entry exists for `name`.
    pub fn contains(&self, name: SignalName) -> bool {
        self.entries.contains_key(&name)
    }

    /// Iterates entries in signal order.
    pub fn iter(&self) -> impl Iterator<Item = (SignalName, &SignalEntry)> {
        self.entries.iter().map(|(name, entry)| (*name, entry))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Signals whose status is not `ok`.
    pub fn degraded(&self) -> impl Iterator<Item = (SignalName, &SignalEntry)> {
        self.iter().filter(|(_, entry)| !entry.is_ok())
    }

    fn ok_value(&self, name: SignalName) -> Option<&SignalValue> {
        self.entries
            .get(&name)
            .filter(|entry| entry.is_ok())
            .and_then(SignalEntry::value)
    }

    fn flag(&self, name: SignalName) -> Option<bool> {
        match self.ok_value(name) {
            Some(SignalValue::Flag(flag)) => Some(*flag),
            _ => None,
        }
    }

    /// `hasHttps`, if known.
    pub fn has_https(&self) -> Option<bool> {
        self.flag(SignalName::HasHttps)
    }

    /// `domainAgeDays`, if known.
    pub fn domain_age_days(&self) -> Option<i64> {
        match self.ok_value(SignalName::DomainAgeDays) {
            Some(SignalValue::Days(days)) => Some(*days),
            _ => None,
        }
    }

    /// `isRawIp`, if known.
    pub fn is_raw_ip(&self) -> Option<bool> {
        self.flag(SignalName::IsRawIp)
    }

    /// `hasLongOrManySubdomains`, if known.
    pub fn has_long_or_many_subdomains(&self) -> Option<bool> {
        self.flag(SignalName::HasLongOrManySubdomains)
    }

    /// `suspiciousTokens`, if known.
    pub fn suspicious_tokens(&self) -> Option<&BTreeSet<String>> {
        match self.ok_value(SignalName::SuspiciousTokens) {
            Some(SignalValue::Tokens(tokens)) => Some(tokens),
            _ => None,
        }
    }

    /// `isKnownShortener`, if known.
    pub fn is_known_shortener(&self) -> Option<bool> {
        self.flag(SignalName::IsKnownShortener)
    }

    /// `redirectChain`, if known.
    pub fn redirect_chain(&self) -> Option<&RedirectChain> {
        match self.ok_value(SignalName::RedirectChain) {
            Some(SignalValue::Chain(chain)) => Some(chain),
            _ => None,
        }
    }
}
