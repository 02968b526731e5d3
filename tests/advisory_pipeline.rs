//! Behavior-driven tests for the fetch → simulate → summarize pipeline.

use std::sync::Arc;
use std::time::Duration;

use alphastoch_core::{
    Advisor, CacheMode, CachedPriceSource, Envelope, EnvelopeMeta, ManualClock, ModelControls,
    PriceSource, Recommendation, RetryConfig, RiskAppetite, StaticPriceSource, Symbol,
    YahooPriceSource,
};
use alphastoch_tests::{controls, seeded, snapshot, ChartHttpClient, CountingSource};

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn when_source_answers_report_is_seeded_at_current_price() {
    // Given: A source quoting 64,000
    let source = StaticPriceSource::new(snapshot(64_000.0));
    let symbol = Symbol::parse("BTC-USD").expect("valid");

    // When: The pipeline runs with the aggressive preset
    let report = Advisor::new()
        .advise(
            &source,
            &symbol,
            &ModelControls::from_appetite(RiskAppetite::Aggressive),
            &mut seeded(3),
        )
        .await
        .expect("report");

    // Then: Every stage's output is present and consistent
    let snapshot = report.snapshot.as_ref().expect("snapshot attached");
    assert_eq!(snapshot.current_price, 64_000.0);
    assert_eq!(report.parameters.start_price(), 64_000.0);
    assert_eq!(report.mean_path()[0], 64_000.0);
    assert_eq!(report.sample_paths.len(), 50);
    // 0.40 / 1.10^2 = 0.3306
    assert_eq!(report.summary.recommendation, Recommendation::Buy);
}

#[tokio::test]
async fn when_seed_is_fixed_two_runs_produce_identical_reports() {
    let source = StaticPriceSource::new(snapshot(250.0));
    let symbol = Symbol::default();
    let advisor = Advisor::new();

    let first = advisor
        .advise(&source, &symbol, &controls(0.2, 0.7), &mut seeded(9))
        .await
        .expect("first");
    let second = advisor
        .advise(&source, &symbol, &controls(0.2, 0.7), &mut seeded(9))
        .await
        .expect("second");

    assert_eq!(first, second);
}

#[tokio::test]
async fn when_sample_limit_exceeds_path_count_all_paths_are_returned() {
    let report = Advisor::new()
        .with_sample_limit(1_000)
        .advise_with_snapshot(
            snapshot(10.0),
            &controls(0.1, 0.3),
            &mut seeded(1),
        )
        .expect("report");

    assert_eq!(report.sample_paths.len(), 300);
}

// =============================================================================
// Cache collaborator
// =============================================================================

#[tokio::test]
async fn when_cached_source_is_reused_within_ttl_upstream_is_called_once() {
    // Given: A cached source on a manual clock
    let clock = Arc::new(ManualClock::new());
    let cached = CachedPriceSource::with_clock(
        CountingSource::default(),
        Duration::from_secs(60),
        clock.clone(),
    );
    let symbol = Symbol::parse("ETH-USD").expect("valid");
    let advisor = Advisor::new();

    // When: Two advisories run 59 seconds apart, then one more after expiry
    for _ in 0..2 {
        advisor
            .advise(&cached, &symbol, &controls(0.1, 0.5), &mut seeded(1))
            .await
            .expect("report");
        clock.advance(Duration::from_secs(59));
    }
    let lookup = cached.lookup(&symbol).await.expect("lookup");

    // Then: The first two share a fetch; the third refetches after 118s
    assert!(!lookup.cache_hit);
    assert_eq!(cached.inner().calls(), 2);
}

#[tokio::test]
async fn when_cache_is_bypassed_every_advisory_fetches() {
    let cached = CachedPriceSource::new(CountingSource::default()).with_mode(CacheMode::Bypass);
    let symbol = Symbol::default();

    for _ in 0..3 {
        let lookup = cached.lookup(&symbol).await.expect("lookup");
        assert!(!lookup.cache_hit);
    }

    assert_eq!(cached.inner().calls(), 3);
}

// =============================================================================
// Yahoo adapter through the pipeline
// =============================================================================

#[tokio::test]
async fn when_yahoo_chart_is_returned_pipeline_uses_last_close() {
    // Given: A transport replaying a chart payload
    let client = Arc::new(ChartHttpClient::new(
        r#"{"chart":{"result":[{"timestamp":[1740700800,1740787200],"indicators":{"quote":[{"close":[84000.0,86100.0]}]}}],"error":null}}"#,
    ));
    let source = YahooPriceSource::with_http_client(client.clone()).with_retry(RetryConfig::no_retry());
    let symbol = Symbol::parse("btc-usd").expect("valid");

    // When: The pipeline runs
    let report = Advisor::new()
        .advise(&source, &symbol, &controls(0.3, 0.9), &mut seeded(4))
        .await
        .expect("report");

    // Then: The last close seeds the simulation and the return is close-to-close
    let snapshot = report.snapshot.expect("snapshot");
    assert_eq!(snapshot.current_price, 86_100.0);
    assert!((snapshot.recent_return_fraction - 0.025).abs() < 1e-12);
    assert_eq!(report.parameters.start_price(), 86_100.0);
    assert!(client.urls()[0].contains("/v8/finance/chart/BTC-USD?range=1y&interval=1d"));
    assert_eq!(snapshot.as_of.to_string(), "2025-03-01T00:00:00Z");
}

#[tokio::test]
async fn when_offline_source_is_used_symbols_get_distinct_stable_prices() {
    let source = YahooPriceSource::offline();
    let btc = source.snapshot(&Symbol::parse("BTC-USD").expect("valid")).await.expect("btc");
    let eth = source.snapshot(&Symbol::parse("ETH-USD").expect("valid")).await.expect("eth");
    let btc_again = source.snapshot(&Symbol::parse("BTC-USD").expect("valid")).await.expect("btc");

    assert_eq!(btc.current_price, btc_again.current_price);
    assert_ne!(btc.current_price, eth.current_price);
}

// =============================================================================
// Envelope
// =============================================================================

#[tokio::test]
async fn when_report_is_enveloped_json_carries_meta_and_data() {
    let report = Advisor::new()
        .advise_with_snapshot(snapshot(100.0), &controls(0.5, 0.4), &mut seeded(2))
        .expect("report");

    let meta = EnvelopeMeta::new(Duration::from_millis(12))
        .with_cache_hit(true)
        .with_warnings(["drift 1.5 is outside the interactive range".to_owned()]);
    let envelope = Envelope::success(meta, &report);
    let json = serde_json::to_value(&envelope).expect("serializes");

    assert_eq!(json["meta"]["schema_version"], "v1.0.0");
    assert_eq!(json["meta"]["cache_hit"], true);
    assert_eq!(json["meta"]["warnings"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["data"]["summary"]["recommendation"], "STRONG_BUY");
    assert_eq!(json["data"]["snapshot"]["symbol"], "BTC-USD");
    assert!(json.get("errors").is_none());
}

#[tokio::test]
async fn when_a_run_fails_the_envelope_carries_the_error_instead_of_data() {
    let err = Advisor::new()
        .advise_with_snapshot(snapshot(100.0), &controls(0.2, 0.0), &mut seeded(2))
        .expect_err("zero volatility");

    let envelope = Envelope::<()>::failure(EnvelopeMeta::new(Duration::ZERO), &err);
    let json = serde_json::to_value(&envelope).expect("serializes");

    assert!(json["data"].is_null());
    assert_eq!(json["errors"][0]["code"], "engine.division_undefined");
    assert!(!envelope.is_success());
}
