//! Individual signal collectors.
//!
//! Each collector computes one signal from the normalized input and its
//! resolved redirect chain. Collectors hold only immutable configuration and
//! can run concurrently with each other.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::{SignalName, SignalValue};
use crate::config::{EngineSettings, Watchlists};
use crate::domain::{registrable_domain, subdomain_labels};
use crate::error_handling::CollectorError;
use crate::input::NormalizedUrl;
use crate::redirect::RedirectChain;
use crate::whois::RegistrationSource;

/// What every collector looks at: the input URL and where it led.
#[derive(Debug, Clone)]
pub struct CollectorTarget {
    normalized: NormalizedUrl,
    chain: RedirectChain,
}

impl CollectorTarget {
    /// Bundles the normalized input with its resolved chain.
    pub fn new(normalized: NormalizedUrl, chain: RedirectChain) -> Self {
        Self { normalized, chain }
    }

    /// The normalized input, before any redirect.
    pub fn normalized(&self) -> &NormalizedUrl {
        &self.normalized
    }

    /// The resolved redirect chain.
    pub fn chain(&self) -> &RedirectChain {
        &self.chain
    }

    /// The last URL reached.
    pub fn final_url(&self) -> &NormalizedUrl {
        self.chain.final_url()
    }
}

/// A probe that computes one signal.
///
/// Returning `CollectorError::Unavailable` marks the signal `unavailable`;
/// `CollectorError::Failed` marks it `error`.
#[async_trait]
pub trait SignalCollector: Send + Sync {
    /// The signal this collector fills in.
    fn name(&self) -> SignalName;

    /// Own time budget, if tighter than the aggregator's default.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Computes the signal.
    async fn collect(&self, target: &CollectorTarget) -> Result<SignalValue, CollectorError>;
}

/// Whether the final URL uses HTTPS.
///
/// Checks the destination rather than the input: an HTTPS shortener that
/// forwards to plain HTTP is the case worth flagging.
pub struct HttpsCollector;

#[async_trait]
impl SignalCollector for HttpsCollector {
    fn name(&self) -> SignalName {
        SignalName::HasHttps
    }

    async fn collect(&self, target: &CollectorTarget) -> Result<SignalValue, CollectorError> {
        Ok(SignalValue::Flag(target.final_url().scheme() == "https"))
    }
}

/// Whether the final host is an IPv4 or IPv6 literal.
pub struct RawIpCollector;

#[async_trait]
impl SignalCollector for RawIpCollector {
    fn name(&self) -> SignalName {
        SignalName::IsRawIp
    }

    async fn collect(&self, target: &CollectorTarget) -> Result<SignalValue, CollectorError> {
        Ok(SignalValue::Flag(target.final_url().is_ip_literal()))
    }
}

/// Flags hosts with too many or overly long subdomain labels.
pub struct SubdomainCollector {
    max_label_len: usize,
    max_levels: usize,
}

impl SubdomainCollector {
    /// Labels longer than `max_label_len`, or more than `max_levels` labels, are flagged.
    pub fn new(max_label_len: usize, max_levels: usize) -> Self {
        Self {
            max_label_len,
            max_levels,
        }
    }
}

#[async_trait]
impl SignalCollector for SubdomainCollector {
    fn name(&self) -> SignalName {
        SignalName::HasLongOrManySubdomains
    }

    async fn collect(&self, target: &CollectorTarget) -> Result<SignalValue, CollectorError> {
        let url = target.final_url();
        // An address has octets, not labels
        if url.is_ip_literal() {
            return Ok(SignalValue::Flag(false));
        }
        let labels = subdomain_labels(url.host());
        let flagged = labels.len() > self.max_levels
            || labels.iter().any(|label| label.len() > self.max_label_len);
        Ok(SignalValue::Flag(flagged))
    }
}

/// Records every watch-list token that appears in the final URL.
pub struct LexicalCollector {
    watchlists: Arc<Watchlists>,
}

impl LexicalCollector {
    /// Uses the tokens from `watchlists`.
    pub fn new(watchlists: Arc<Watchlists>) -> Self {
        Self { watchlists }
    }
}

#[async_trait]
impl SignalCollector for LexicalCollector {
    fn name(&self) -> SignalName {
        SignalName::SuspiciousTokens
    }

    async fn collect(&self, target: &CollectorTarget) -> Result<SignalValue, CollectorError> {
        let chain = target.chain();
        let redirected = chain.redirect_count() > 0 && !chain.is_unresolved();
        let haystack = lexical_haystack(target.final_url(), redirected);
        let matches: BTreeSet<String> = self
            .watchlists
            .suspicious_tokens()
            .iter()
            .filter(|token| haystack.contains(token.as_str()))
            .cloned()
            .collect();
        Ok(SignalValue::Tokens(matches))
    }
}

/// The lowercased text the lexical check searches: the full URL.
///
/// With `skip_registered_name` set, the registrable domain of the host is
/// blanked out and everything else (scheme, userinfo, subdomains, port, path,
/// query, fragment) is kept. The collector sets it only for a destination
/// reached through a completed redirect, so the name a shortener pointed at
/// is not scored against its own brand. IP hosts are never blanked.
pub fn lexical_haystack(url: &NormalizedUrl, skip_registered_name: bool) -> String {
    let full = url.as_str().to_lowercase();
    if skip_registered_name && !url.is_ip_literal() {
        if let Some(stripped) = without_registered_name(url, &full) {
            return stripped;
        }
    }
    full
}

/// `full` with the host's registrable domain replaced by a space.
fn without_registered_name(url: &NormalizedUrl, full: &str) -> Option<String> {
    let name = registrable_domain(url.host())?;
    let authority_start = full.find("://")? + 3;
    let authority_end = full[authority_start..]
        .find(['/', '?', '#'])
        .map_or(full.len(), |i| authority_start + i);
    let authority = &full[authority_start..authority_end];
    let host_start = authority.rfind('@').map_or(0, |i| i + 1);
    let host_end = authority[host_start..]
        .find(':')
        .map_or(authority.len(), |i| host_start + i);
    let host = &authority[host_start..host_end];
    let name_start = host.strip_suffix(name.as_str())?.len();

    let cut = authority_start + host_start + name_start;
    let resume = authority_start + host_end;
    Some(format!("{} {}", &full[..cut], &full[resume..]))
}

/// Whether the input host is a known URL shortener.
///
/// Looks at the host the user was given, not the destination: the point is
/// that the real target was hidden.
pub struct ShortenerCollector {
    watchlists: Arc<Watchlists>,
}

impl ShortenerCollector {
    /// Uses the shortener domains from `watchlists`.
    pub fn new(watchlists: Arc<Watchlists>) -> Self {
        Self { watchlists }
    }
}

#[async_trait]
impl SignalCollector for ShortenerCollector {
    fn name(&self) -> SignalName {
        SignalName::IsKnownShortener
    }

    async fn collect(&self, target: &CollectorTarget) -> Result<SignalValue, CollectorError> {
        Ok(SignalValue::Flag(
            self.watchlists.is_shortener_host(target.normalized().host()),
        ))
    }
}

/// Age in days of the final host's registrable domain.
///
/// Any lookup failure or missing creation date is reported as
/// `unavailable`, never as a default age.
pub struct DomainAgeCollector {
    source: Arc<dyn RegistrationSource>,
}

impl DomainAgeCollector {
    /// Looks domains up through `source`.
    pub fn new(source: Arc<dyn RegistrationSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl SignalCollector for DomainAgeCollector {
    fn name(&self) -> SignalName {
        SignalName::DomainAgeDays
    }

    async fn collect(&self, target: &CollectorTarget) -> Result<SignalValue, CollectorError> {
        let url = target.final_url();
        if url.is_ip_literal() {
            return Err(CollectorError::Unavailable(
                "IP addresses have no registration data".to_string(),
            ));
        }
        let domain = registrable_domain(url.host()).ok_or_else(|| {
            CollectorError::Unavailable(format!("no registrable domain in {}", url.host()))
        })?;

        let record = self
            .source
            .lookup(&domain)
            .await
            .map_err(|e| CollectorError::Unavailable(format!("lookup failed for {domain}: {e:#}")))?
            .ok_or_else(|| {
                CollectorError::Unavailable(format!("no registration record for {domain}"))
            })?;
        let created = record.creation_date.ok_or_else(|| {
            CollectorError::Unavailable(format!("no creation date for {domain}"))
        })?;

        let age_days = (Utc::now() - created).num_days();
        if age_days < 0 {
            return Err(CollectorError::Unavailable(format!(
                "creation date for {domain} is in the future"
            )));
        }
        Ok(SignalValue::Days(age_days))
    }
}

/// Reports the already-resolved redirect chain as a signal.
pub struct RedirectChainCollector;

#[async_trait]
impl SignalCollector for RedirectChainCollector {
    fn name(&self) -> SignalName {
        SignalName::RedirectChain
    }

    async fn collect(&self, target: &CollectorTarget) -> Result<SignalValue, CollectorError> {
        Ok(SignalValue::Chain(target.chain().clone()))
    }
}

/// The standard collector set.
///
/// The domain-age collector is included only when a registration source is
/// given.
pub fn default_collectors(
    settings: &EngineSettings,
    watchlists: Arc<Watchlists>,
    registration: Option<Arc<dyn RegistrationSource>>,
) -> Vec<Arc<dyn SignalCollector>> {
    let mut collectors: Vec<Arc<dyn SignalCollector>> = vec![
        Arc::new(HttpsCollector),
        Arc::new(RawIpCollector),
        Arc::new(SubdomainCollector::new(
            settings.max_subdomain_label_len,
            settings.max_subdomain_levels,
        )),
        Arc::new(LexicalCollector::new(Arc::clone(&watchlists))),
        Arc::new(ShortenerCollector::new(watchlists)),
        Arc::new(RedirectChainCollector),
    ];
    if let Some(source) = registration {
        collectors.push(Arc::new(DomainAgeCollector::new(source)));
    }
    collectors
}
