//! Assessment orchestration.
//!
//! `AssessmentEngine::assess` is the crate's single entry point: normalize the
//! raw string, resolve its redirects, collect signals, and score them.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use serde::Serialize;
use tokio::time::Instant;

use crate::config::{EngineSettings, Watchlists, RESOLVER_BUDGET_FRACTION};
use crate::error_handling::{InitializationError, InvalidInputError};
use crate::initialization::{init_client, init_redirect_client};
use crate::input::NormalizedUrl;
use crate::redirect::{HopFetcher, RedirectResolver, ReqwestHopFetcher};
use crate::scoring::{self, Adjustment, RiskLevel};
use crate::signals::{default_collectors, SignalAggregator, Signals};
use crate::whois::{RdapSource, RegistrationSource};

/// The complete result of assessing one decoded string.
///
/// Only the engine constructs these; every field is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    normalized_url: NormalizedUrl,
    final_url: NormalizedUrl,
    host: String,
    signals: Signals,
    score: u8,
    risk_level: RiskLevel,
    adjustments: Vec<Adjustment>,
}

impl Assessment {
    /// The input after normalization.
    pub fn normalized_url(&self) -> &NormalizedUrl {
        &self.normalized_url
    }

    /// The last URL reached while following redirects.
    pub fn final_url(&self) -> &NormalizedUrl {
        &self.final_url
    }

    /// Host of the final URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Every collected signal.
    pub fn signals(&self) -> &Signals {
        &self.signals
    }

    /// Risk score in `[0, 100]`; higher is safer.
    pub fn score(&self) -> u8 {
        self.score
    }

    /// Classification of the score.
    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    /// Score adjustments applied, in order.
    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }
}

/// Runs assessments. Cheap to clone and safe to share between tasks.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use qr_trap::{AssessmentEngine, EngineSettings, Watchlists};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = AssessmentEngine::from_settings(
///     &EngineSettings::default(),
///     Arc::new(Watchlists::default()),
/// )?;
/// let assessment = engine.assess_within("bit.ly/abc", Duration::from_secs(8)).await?;
/// println!("{} -> {}", assessment.final_url(), assessment.risk_level());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AssessmentEngine {
    resolver: RedirectResolver,
    aggregator: SignalAggregator,
}

impl AssessmentEngine {
    /// Builds an engine from explicit parts.
    ///
    /// Tests use this to inject a fake `HopFetcher` and `RegistrationSource`.
    /// Passing `None` for `registration` leaves out the domain-age signal.
    pub fn new(
        settings: &EngineSettings,
        watchlists: Arc<Watchlists>,
        fetcher: Arc<dyn HopFetcher>,
        registration: Option<Arc<dyn RegistrationSource>>,
    ) -> Self {
        let collectors = default_collectors(settings, watchlists, registration);
        Self::with_parts(
            RedirectResolver::new(fetcher, settings.max_redirect_hops),
            SignalAggregator::new(collectors, settings.collector_timeout),
        )
    }

    /// Builds an engine around a custom resolver and collector set.
    pub fn with_parts(resolver: RedirectResolver, aggregator: SignalAggregator) -> Self {
        Self {
            resolver,
            aggregator,
        }
    }

    /// Builds the production engine: reqwest for redirect hops and RDAP for
    /// registration data (unless disabled in `settings`).
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::ConfigError` for an unparseable RDAP URL
    /// and `InitializationError::HttpClientError` if an HTTP client cannot be
    /// built.
    pub fn from_settings(
        settings: &EngineSettings,
        watchlists: Arc<Watchlists>,
    ) -> Result<Self, InitializationError> {
        if settings.enable_domain_age {
            url::Url::parse(&settings.rdap_base_url).map_err(|e| {
                InitializationError::ConfigError(format!(
                    "invalid RDAP URL '{}': {}",
                    settings.rdap_base_url, e
                ))
            })?;
        }
        let fetcher: Arc<dyn HopFetcher> =
            Arc::new(ReqwestHopFetcher::new(init_redirect_client(settings)?));
        let registration: Option<Arc<dyn RegistrationSource>> = if settings.enable_domain_age {
            Some(Arc::new(RdapSource::new(
                init_client(settings)?,
                &settings.rdap_base_url,
                settings.whois_cache_dir.clone(),
            )))
        } else {
            None
        };
        Ok(Self::new(settings, watchlists, fetcher, registration))
    }

    /// Assesses a raw decoded string, finishing by `deadline`.
    ///
    /// The resolver may use at most `RESOLVER_BUDGET_FRACTION` of the time
    /// left; collectors get the rest. A deadline that runs out degrades the
    /// signals (they show up as `timed-out`) but still yields an
    /// `Assessment`. Dropping the returned future cancels every in-flight
    /// request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInputError` if the string cannot be turned into an
    /// http(s) URL with a host. Nothing else fails the request.
    pub async fn assess(
        &self,
        raw: &str,
        deadline: Instant,
    ) -> Result<Assessment, InvalidInputError> {
        let normalized = NormalizedUrl::parse(raw)?;
        let started = Instant::now();
        let budget = deadline.saturating_duration_since(started);
        let resolver_deadline = started + budget.mul_f64(RESOLVER_BUDGET_FRACTION);
        debug!(
            "Assessing {} with a {}ms budget",
            normalized,
            budget.as_millis()
        );

        let chain = self.resolver.resolve(&normalized, resolver_deadline).await;
        let signals = self.aggregator.collect(&normalized, &chain, deadline).await;
        let card = scoring::score(&signals);

        let final_url = chain.final_url().clone();
        info!(
            "Assessed {} -> {}: score {} ({}), {} redirect(s), {}ms",
            normalized,
            final_url,
            card.score,
            card.risk_level,
            chain.redirect_count(),
            started.elapsed().as_millis()
        );

        Ok(Assessment {
            host: final_url.host().to_string(),
            normalized_url: normalized,
            final_url,
            signals,
            score: card.score,
            risk_level: card.risk_level,
            adjustments: card.adjustments,
        })
    }

    /// [`assess`](Self::assess) with a deadline `budget` from now.
    pub async fn assess_within(
        &self,
        raw: &str,
        budget: Duration,
    ) -> Result<Assessment, InvalidInputError> {
        self.assess(raw, Instant::now() + budget).await
    }
}
