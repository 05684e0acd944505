// Redirect resolution tests.

use super::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Scripted fetcher: each URL maps to a fixed response or error.
/// Unknown URLs answer 200.
#[derive(Default)]
struct ScriptedFetcher {
    responses: HashMap<String, Result<HopResponse, FetchError>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn redirect(mut self, from: &str, status: u16, location: &str) -> Self {
        self.responses.insert(
            from.to_string(),
            Ok(HopResponse {
                status,
                location: Some(location.to_string()),
            }),
        );
        self
    }

    fn status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(
            url.to_string(),
            Ok(HopResponse {
                status,
                location: None,
            }),
        );
        self
    }

    fn error(mut self, url: &str, error: FetchError) -> Self {
        self.responses.insert(url.to_string(), Err(error));
        self
    }

    fn slow(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl HopFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> Result<HopResponse, FetchError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(url.to_string());
        if let Some(delay) = self.delays.get(url.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        self.responses
            .get(url.as_str())
            .cloned()
            .unwrap_or(Ok(HopResponse {
                status: 200,
                location: None,
            }))
    }
}

fn url(raw: &str) -> NormalizedUrl {
    NormalizedUrl::parse(raw).expect("test URL must be valid")
}

fn far_deadline() -> Instant {
    Instant::now() + Duration::from_secs(10)
}

fn hop_strings(chain: &RedirectChain) -> Vec<&str> {
    chain.hops().iter().map(|h| h.as_str()).collect()
}

#[tokio::test]
async fn test_no_redirect_completes_with_single_hop() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let resolver = RedirectResolver::new(fetcher.clone(), 5);

    let chain = resolver.resolve(&url("https://example.com/"), far_deadline()).await;

    assert_eq!(chain.termination(), ChainTermination::Completed);
    assert_eq!(hop_strings(&chain), vec!["https://example.com/"]);
    assert_eq!(chain.redirect_count(), 0);
    assert!(!chain.is_unresolved());
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn test_follows_shortener_to_destination() {
    let fetcher = Arc::new(
        ScriptedFetcher::default().redirect(
            "https://bit.ly/abc",
            301,
            "https://good-bank.com/account",
        ),
    );
    let resolver = RedirectResolver::new(fetcher, 5);

    let chain = resolver.resolve(&url("bit.ly/abc"), far_deadline()).await;

    assert_eq!(chain.termination(), ChainTermination::Completed);
    assert_eq!(
        hop_strings(&chain),
        vec!["https://bit.ly/abc", "https://good-bank.com/account"]
    );
    assert_eq!(chain.final_url().host(), "good-bank.com");
}

#[tokio::test]
async fn test_relative_location_resolved_against_current_url() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .redirect("https://example.com/a/b", 302, "../c?x=1")
            .redirect("https://example.com/c?x=1", 307, "/d"),
    );
    let resolver = RedirectResolver::new(fetcher, 5);

    let chain = resolver.resolve(&url("https://example.com/a/b"), far_deadline()).await;

    assert_eq!(
        hop_strings(&chain),
        vec![
            "https://example.com/a/b",
            "https://example.com/c?x=1",
            "https://example.com/d"
        ]
    );
}

#[tokio::test]
async fn test_two_node_cycle_is_detected_before_hop_limit() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .redirect("https://a.example/", 302, "https://b.example/")
            .redirect("https://b.example/", 302, "https://a.example/"),
    );
    let resolver = RedirectResolver::new(fetcher.clone(), 5);

    let chain = resolver.resolve(&url("https://a.example/"), far_deadline()).await;

    assert_eq!(chain.termination(), ChainTermination::CycleDetected);
    assert_eq!(
        hop_strings(&chain),
        vec!["https://a.example/", "https://b.example/"]
    );
    // The repeated URL is never requested again
    assert_eq!(fetcher.calls().len(), 2);
}

#[tokio::test]
async fn test_two_node_cycle_detected_even_with_tight_hop_limit() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .redirect("https://a.example/", 302, "https://b.example/")
            .redirect("https://b.example/", 302, "https://a.example/"),
    );
    let resolver = RedirectResolver::new(fetcher, 2);

    let chain = resolver.resolve(&url("https://a.example/"), far_deadline()).await;

    assert_eq!(chain.termination(), ChainTermination::CycleDetected);
}

#[tokio::test]
async fn test_self_redirect_is_a_cycle() {
    let fetcher = Arc::new(ScriptedFetcher::default().redirect(
        "https://loop.example/",
        301,
        "https://loop.example/#again",
    ));
    let resolver = RedirectResolver::new(fetcher, 5);

    let chain = resolver.resolve(&url("https://loop.example/"), far_deadline()).await;

    assert_eq!(chain.termination(), ChainTermination::CycleDetected);
    assert_eq!(chain.hops().len(), 1);
}

#[tokio::test]
async fn test_hop_limit_exceeded_returns_partial_chain() {
    let mut fetcher = ScriptedFetcher::default();
    for i in 0..10 {
        fetcher = fetcher.redirect(
            &format!("https://hop.example/{i}"),
            302,
            &format!("/{}", i + 1),
        );
    }
    let fetcher = Arc::new(fetcher);
    let resolver = RedirectResolver::new(fetcher.clone(), 5);

    let chain = resolver.resolve(&url("https://hop.example/0"), far_deadline()).await;

    assert_eq!(chain.termination(), ChainTermination::HopLimitExceeded);
    assert_eq!(chain.hops().len(), 5);
    assert_eq!(chain.final_url().as_str(), "https://hop.example/4");
    assert!(chain.is_unresolved());
    assert_eq!(fetcher.calls().len(), 5);
}

#[tokio::test]
async fn test_chain_of_exactly_max_hops_completes() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .redirect("https://x.example/1", 302, "/2")
            .redirect("https://x.example/2", 302, "/3"),
    );
    let resolver = RedirectResolver::new(fetcher, 3);

    let chain = resolver.resolve(&url("https://x.example/1"), far_deadline()).await;

    assert_eq!(chain.termination(), ChainTermination::Completed);
    assert_eq!(chain.hops().len(), 3);
}

#[tokio::test]
async fn test_transport_error_on_start_retains_start_url() {
    let fetcher = Arc::new(ScriptedFetcher::default().error(
        "https://down.example/",
        FetchError::Transport("connection refused".to_string()),
    ));
    let resolver = RedirectResolver::new(fetcher, 5);

    let chain = resolver.resolve(&url("https://down.example/"), far_deadline()).await;

    assert_eq!(chain.termination(), ChainTermination::ResolutionFailed);
    assert_eq!(hop_strings(&chain), vec!["https://down.example/"]);
    let failure = chain.failure().expect("failure recorded");
    assert_eq!(failure.kind, FailureKind::Transport);
    assert!(failure.message.contains("connection refused"));
}

#[tokio::test]
async fn test_failure_mid_chain_keeps_last_reached_url() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .redirect("https://short.example/x", 302, "http://gone.example/")
            .error(
                "http://gone.example/",
                FetchError::Timeout("operation timed out".to_string()),
            ),
    );
    let resolver = RedirectResolver::new(fetcher, 5);

    let chain = resolver.resolve(&url("https://short.example/x"), far_deadline()).await;

    assert_eq!(chain.termination(), ChainTermination::ResolutionFailed);
    assert_eq!(hop_strings(&chain), vec!["https://short.example/x"]);
    assert_eq!(chain.failure().map(|f| f.kind), Some(FailureKind::Timeout));
}

#[tokio::test]
async fn test_deadline_bounds_slow_hop() {
    let fetcher = Arc::new(
        ScriptedFetcher::default().slow("https://slow.example/", Duration::from_secs(5)),
    );
    let resolver = RedirectResolver::new(fetcher, 5);
    let deadline = Instant::now() + Duration::from_millis(50);

    let started = std::time::Instant::now();
    let chain = resolver.resolve(&url("https://slow.example/"), deadline).await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(chain.termination(), ChainTermination::ResolutionFailed);
    assert_eq!(chain.failure().map(|f| f.kind), Some(FailureKind::Timeout));
}

#[tokio::test]
async fn test_redirect_without_location_completes() {
    let fetcher = Arc::new(ScriptedFetcher::default().status("https://odd.example/", 302));
    let resolver = RedirectResolver::new(fetcher, 5);

    let chain = resolver.resolve(&url("https://odd.example/"), far_deadline()).await;

    assert_eq!(chain.termination(), ChainTermination::Completed);
    assert_eq!(chain.hops().len(), 1);
}

#[tokio::test]
async fn test_non_http_location_is_invalid_destination() {
    let fetcher = Arc::new(ScriptedFetcher::default().redirect(
        "https://app.example/",
        302,
        "market://details?id=com.evil",
    ));
    let resolver = RedirectResolver::new(fetcher, 5);

    let chain = resolver.resolve(&url("https://app.example/"), far_deadline()).await;

    assert_eq!(chain.termination(), ChainTermination::ResolutionFailed);
    assert_eq!(
        chain.failure().map(|f| f.kind),
        Some(FailureKind::InvalidDestination)
    );
    assert_eq!(hop_strings(&chain), vec!["https://app.example/"]);
}

#[tokio::test]
async fn test_error_statuses_are_final() {
    let fetcher = Arc::new(ScriptedFetcher::default().status("https://gone.example/", 404));
    let resolver = RedirectResolver::new(fetcher, 5);

    let chain = resolver.resolve(&url("https://gone.example/"), far_deadline()).await;

    // A 404 is still a response: the destination is settled
    assert_eq!(chain.termination(), ChainTermination::Completed);
}

#[test]
fn test_termination_serializes_kebab_case() {
    assert_eq!(
        serde_json::to_string(&ChainTermination::HopLimitExceeded).expect("serializes"),
        "\"hop-limit-exceeded\""
    );
    assert_eq!(ChainTermination::CycleDetected.to_string(), "cycle-detected");
    assert_eq!(ChainTermination::ResolutionFailed.as_ref(), "resolution-failed");
}

#[test]
fn test_direct_chain() {
    let chain = RedirectChain::direct(url("example.com"));
    assert_eq!(chain.termination(), ChainTermination::Completed);
    assert_eq!(chain.final_url().host(), "example.com");
    assert!(chain.failure().is_none());
}

mod reqwest_fetcher {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    fn test_client() -> Arc<reqwest::Client> {
        Arc::new(
            reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .no_proxy()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("client"),
        )
    }

    #[tokio::test]
    async fn test_reqwest_fetcher_reports_location_without_following() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/short"))
                .respond_with(status_code(302).insert_header("Location", "/long")),
        );

        let fetcher = ReqwestHopFetcher::new(test_client());
        let target = Url::parse(&server.url("/short").to_string()).expect("url");
        let response = fetcher.fetch(&target).await.expect("fetch succeeds");

        assert_eq!(response.status, 302);
        assert_eq!(response.location.as_deref(), Some("/long"));
        assert!(response.is_redirect());
    }

    #[tokio::test]
    async fn test_resolver_over_http_server() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/a"))
                .respond_with(status_code(301).insert_header("Location", "/b")),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/b"))
                .respond_with(status_code(308).insert_header("Location", "/c")),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/c"))
                .respond_with(status_code(200).body("landing")),
        );

        let resolver = RedirectResolver::new(Arc::new(ReqwestHopFetcher::new(test_client())), 5);
        let start = NormalizedUrl::parse(&server.url("/a").to_string()).expect("url");
        let chain = resolver.resolve(&start, far_deadline()).await;

        assert_eq!(chain.termination(), ChainTermination::Completed);
        assert_eq!(chain.hops().len(), 3);
        assert!(chain.final_url().as_str().ends_with("/c"));
        assert_eq!(chain.final_url().scheme(), "http");
    }

    #[tokio::test]
    async fn test_resolver_over_http_server_cycle() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/a"))
                .respond_with(status_code(302).insert_header("Location", "/b")),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/b"))
                .respond_with(status_code(302).insert_header("Location", "/a")),
        );

        let resolver = RedirectResolver::new(Arc::new(ReqwestHopFetcher::new(test_client())), 5);
        let start = NormalizedUrl::parse(&server.url("/a").to_string()).expect("url");
        let chain = resolver.resolve(&start, far_deadline()).await;

        assert_eq!(chain.termination(), ChainTermination::CycleDetected);
        assert_eq!(chain.hops().len(), 2);
    }

    #[tokio::test]
    async fn test_resolver_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let resolver = RedirectResolver::new(Arc::new(ReqwestHopFetcher::new(test_client())), 5);
        let start = NormalizedUrl::parse(&format!("http://{addr}/")).expect("url");
        let chain = resolver.resolve(&start, far_deadline()).await;

        assert_eq!(chain.termination(), ChainTermination::ResolutionFailed);
        assert_eq!(chain.failure().map(|f| f.kind), Some(FailureKind::Transport));
        assert_eq!(chain.hops().len(), 1);
    }
}
