// Shared fakes for the integration tests.
//
// `FakeWeb` stands in for the network when following redirects and
// `FakeRegistry` for the registration-data service, so every scenario is
// deterministic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use url::Url;

use qr_trap::redirect::{HopFetcher, HopResponse};
use qr_trap::whois::{RegistrationRecord, RegistrationSource};
use qr_trap::{AssessmentEngine, EngineSettings, FetchError, Watchlists};

/// Scripted web: URLs listed in `redirects` answer 301 with a Location,
/// everything else answers 200.
#[derive(Default)]
pub struct FakeWeb {
    redirects: HashMap<String, String>,
    pub calls: AtomicUsize,
}

#[allow(dead_code)] // Not every test file uses every helper
impl FakeWeb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HopFetcher for FakeWeb {
    async fn fetch(&self, url: &Url) -> Result<HopResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match self.redirects.get(url.as_str()) {
            Some(location) => HopResponse {
                status: 301,
                location: Some(location.clone()),
            },
            None => HopResponse {
                status: 200,
                location: None,
            },
        })
    }
}

/// Registration source with fixed ages and an optional response delay.
#[derive(Default)]
pub struct FakeRegistry {
    ages: HashMap<String, i64>,
    delay: Option<Duration>,
    pub started: AtomicUsize,
    pub finished: AtomicUsize,
}

#[allow(dead_code)] // Not every test file uses every helper
impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_age(mut self, domain: &str, days: i64) -> Self {
        self.ages.insert(domain.to_string(), days);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl RegistrationSource for FakeRegistry {
    async fn lookup(&self, domain: &str) -> anyhow::Result<Option<RegistrationRecord>> {
        self.started.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(self.ages.get(domain).map(|days| RegistrationRecord {
            creation_date: Some(Utc::now() - chrono::Duration::days(*days)),
            ..Default::default()
        }))
    }
}

/// Engine wired to the given fakes with default settings and watch-lists.
#[allow(dead_code)] // Not every test file uses every helper
pub fn engine_with(web: Arc<FakeWeb>, registry: Option<Arc<FakeRegistry>>) -> AssessmentEngine {
    AssessmentEngine::new(
        &EngineSettings::default(),
        Arc::new(Watchlists::default()),
        web,
        registry.map(|r| r as Arc<dyn RegistrationSource>),
    )
}
