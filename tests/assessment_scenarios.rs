//! End-to-end scenarios through the public `assess` API with injected fakes.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{engine_with, FakeRegistry, FakeWeb};
use qr_trap::{ChainTermination, InvalidInputError, RiskLevel, SignalName, SignalStatus};

const BUDGET: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_raw_ip_login_is_malicious() {
    let engine = engine_with(Arc::new(FakeWeb::new()), Some(Arc::new(FakeRegistry::new())));

    let assessment = engine
        .assess_within("http://192.168.1.1/login", BUDGET)
        .await
        .expect("valid input");

    let signals = assessment.signals();
    assert_eq!(signals.has_https(), Some(false));
    assert_eq!(signals.is_raw_ip(), Some(true));
    assert_eq!(
        signals.suspicious_tokens().map(|t| t.iter().cloned().collect::<Vec<_>>()),
        Some(vec!["login".to_string()])
    );
    assert_eq!(
        signals.get(SignalName::DomainAgeDays).map(|e| e.status()),
        Some(SignalStatus::Unavailable)
    );
    assert_eq!(assessment.score(), 25);
    assert_eq!(assessment.risk_level(), RiskLevel::Malicious);
}

#[tokio::test]
async fn test_shortener_to_established_domain_is_suspicious() {
    let web = Arc::new(FakeWeb::new().redirect("https://bit.ly/abc", "https://good-bank.com/account"));
    let registry = Arc::new(FakeRegistry::new().with_age("good-bank.com", 800));
    let engine = engine_with(Arc::clone(&web), Some(registry));

    let assessment = engine
        .assess_within("bit.ly/abc", BUDGET)
        .await
        .expect("valid input");

    assert_eq!(assessment.normalized_url().as_str(), "https://bit.ly/abc");
    assert_eq!(assessment.final_url().as_str(), "https://good-bank.com/account");
    assert_eq!(assessment.host(), "good-bank.com");

    let signals = assessment.signals();
    assert_eq!(signals.is_known_shortener(), Some(true));
    assert_eq!(signals.has_https(), Some(true));
    assert_eq!(signals.domain_age_days(), Some(800));
    let chain = signals.redirect_chain().expect("chain signal");
    assert_eq!(chain.termination(), ChainTermination::Completed);
    assert_eq!(chain.redirect_count(), 1);

    assert_eq!(assessment.score(), 65);
    assert_eq!(assessment.risk_level(), RiskLevel::Suspicious);
    assert_eq!(web.call_count(), 2);
}

#[tokio::test]
async fn test_tokens_in_registered_name_are_scored() {
    let engine = engine_with(Arc::new(FakeWeb::new()), Some(Arc::new(FakeRegistry::new())));

    let assessment = engine
        .assess_within("https://secure-login-verify.com/", BUDGET)
        .await
        .expect("valid input");

    assert_eq!(
        assessment
            .signals()
            .suspicious_tokens()
            .map(|t| t.iter().cloned().collect::<Vec<_>>()),
        Some(vec![
            "login".to_string(),
            "secure".to_string(),
            "verify".to_string()
        ])
    );
    // 50 + 10 (https) - 15 (three tokens)
    assert_eq!(assessment.score(), 45);
    assert_eq!(assessment.risk_level(), RiskLevel::Suspicious);
}

#[tokio::test]
async fn test_direct_visit_to_bank_domain_matches_its_name() {
    let registry = Arc::new(FakeRegistry::new().with_age("good-bank.com", 800));
    let engine = engine_with(Arc::new(FakeWeb::new()), Some(registry));

    let assessment = engine
        .assess_within("https://good-bank.com/account", BUDGET)
        .await
        .expect("valid input");

    // 50 + 10 (https) + 15 (age) - 10 (bank, account)
    assert_eq!(assessment.score(), 65);
    assert_eq!(
        assessment.signals().suspicious_tokens().map(|t| t.len()),
        Some(2)
    );
}

#[tokio::test]
async fn test_malformed_input_is_rejected() {
    let web = Arc::new(FakeWeb::new());
    let engine = engine_with(Arc::clone(&web), Some(Arc::new(FakeRegistry::new())));

    let result = engine.assess_within("::::not a url", BUDGET).await;

    assert!(matches!(result, Err(InvalidInputError::Malformed { .. })));
    let message = result.expect_err("rejected").to_string();
    assert!(message.starts_with("could not understand this code"));
    // Nothing was fetched for an input that never normalized
    assert_eq!(web.call_count(), 0);
}

#[tokio::test]
async fn test_other_invalid_inputs() {
    let engine = engine_with(Arc::new(FakeWeb::new()), None);

    assert!(matches!(
        engine.assess_within("   ", BUDGET).await,
        Err(InvalidInputError::Empty)
    ));
    assert!(matches!(
        engine.assess_within("javascript://alert(1)", BUDGET).await,
        Err(InvalidInputError::UnsupportedScheme(_))
    ));
    let long = format!("https://example.com/{}", "a".repeat(3000));
    assert!(matches!(
        engine.assess_within(&long, BUDGET).await,
        Err(InvalidInputError::TooLong { .. })
    ));
}

#[tokio::test]
async fn test_domain_age_timeout_degrades_to_sixty() {
    let registry = Arc::new(
        FakeRegistry::new()
            .with_age("example.com", 4000)
            .with_delay(Duration::from_secs(30)),
    );
    let engine = engine_with(Arc::new(FakeWeb::new()), Some(registry));

    let assessment = engine
        .assess_within("https://example.com/", Duration::from_millis(300))
        .await
        .expect("a timeout never fails the request");

    let age = assessment
        .signals()
        .get(SignalName::DomainAgeDays)
        .expect("entry present");
    assert_eq!(age.status(), SignalStatus::TimedOut);
    assert!(age.value().is_none());
    assert_eq!(assessment.score(), 60);
    assert_eq!(assessment.risk_level(), RiskLevel::Suspicious);
}

#[tokio::test]
async fn test_missing_domain_age_is_neutral() {
    let without_check = engine_with(Arc::new(FakeWeb::new()), None)
        .assess_within("https://example.com/welcome", BUDGET)
        .await
        .expect("valid input");
    let unavailable = engine_with(Arc::new(FakeWeb::new()), Some(Arc::new(FakeRegistry::new())))
        .assess_within("https://example.com/welcome", BUDGET)
        .await
        .expect("valid input");

    assert_eq!(
        unavailable
            .signals()
            .get(SignalName::DomainAgeDays)
            .map(|e| e.status()),
        Some(SignalStatus::Unavailable)
    );
    assert_eq!(unavailable.score(), without_check.score());
    assert_eq!(unavailable.adjustments(), without_check.adjustments());
}

#[tokio::test]
async fn test_assess_is_idempotent() {
    let web = Arc::new(FakeWeb::new().redirect("https://bit.ly/abc", "https://good-bank.com/account"));
    let registry = Arc::new(FakeRegistry::new().with_age("good-bank.com", 800));
    let engine = engine_with(web, Some(registry));

    let first = engine.assess_within("bit.ly/abc", BUDGET).await.expect("valid");
    let second = engine.assess_within("bit.ly/abc", BUDGET).await.expect("valid");

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_two_node_cycle_is_detected_and_penalized() {
    let web = Arc::new(
        FakeWeb::new()
            .redirect("https://a.example/", "https://b.example/")
            .redirect("https://b.example/", "https://a.example/"),
    );
    let engine = engine_with(Arc::clone(&web), None);

    let assessment = engine
        .assess_within("https://a.example/", BUDGET)
        .await
        .expect("valid input");

    let chain = assessment.signals().redirect_chain().expect("chain signal");
    assert_eq!(chain.termination(), ChainTermination::CycleDetected);
    assert_eq!(chain.hops().len(), 2);
    assert_eq!(web.call_count(), 2);
    // 50 + 10 (https) - 10 (unresolved redirect)
    assert_eq!(assessment.score(), 50);
}

#[tokio::test]
async fn test_https_to_http_downgrade_loses_https_credit() {
    let web = Arc::new(FakeWeb::new().redirect("https://t.co/xyz", "http://plain.example/"));
    let engine = engine_with(web, None);

    let assessment = engine
        .assess_within("https://t.co/xyz", BUDGET)
        .await
        .expect("valid input");

    assert_eq!(assessment.signals().has_https(), Some(false));
    assert_eq!(assessment.signals().is_known_shortener(), Some(true));
    // 50 - 5 (shortener)
    assert_eq!(assessment.score(), 45);
}

#[tokio::test]
async fn test_every_signal_has_exactly_one_entry() {
    let engine = engine_with(Arc::new(FakeWeb::new()), Some(Arc::new(FakeRegistry::new())));
    let assessment = engine
        .assess_within("https://deep.a.b.c.example.com/", BUDGET)
        .await
        .expect("valid input");

    let names: Vec<SignalName> = assessment.signals().iter().map(|(n, _)| n).collect();
    assert_eq!(names.len(), 7);
    assert_eq!(assessment.signals().has_long_or_many_subdomains(), Some(true));
    // 50 + 10 (https) - 10 (subdomains)
    assert_eq!(assessment.score(), 50);
}
