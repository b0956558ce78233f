mod common;

use axum_test::TestServer;
use std::sync::atomic::Ordering;

use linkhop::cache::FlushReport;

#[tokio::test]
async fn test_redirect_success() {
    let app = common::test_app(true);
    let id = app.links.seed("https://example.com/target", "alice");
    let key = app.codec.encode(id);

    let server = TestServer::new(common::test_router(app.state.clone())).unwrap();

    let response = server.get(&format!("/{key}")).await;

    assert_eq!(response.status_code(), 308);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_unknown_id_not_found() {
    let app = common::test_app(true);
    let key = app.codec.encode(999);

    let server = TestServer::new(common::test_router(app.state.clone())).unwrap();

    let response = server.get(&format!("/{key}")).await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_rejects_invalid_charset() {
    let app = common::test_app(true);
    let server = TestServer::new(common::test_router(app.state.clone())).unwrap();

    // '!' and '0' are outside the codec alphabet; over-long ids cannot be
    // real either.
    let too_long = "a".repeat(64);
    for bad in ["!!!", "abc0", too_long.as_str()] {
        let response = server.get(&format!("/{bad}")).await;
        response.assert_status_not_found();
    }

    // Nothing reached the repository.
    assert_eq!(app.links.retrieve_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_repeated_hits_resolve_once_and_coalesce_visits() {
    let app = common::test_app(true);
    let id = app.links.seed("https://example.com", "alice");
    let key = app.codec.encode(id);

    let server = TestServer::new(common::test_router(app.state.clone())).unwrap();

    for _ in 0..3 {
        let response = server.get(&format!("/{key}")).await;
        assert_eq!(response.status_code(), 308);
    }

    // One miss resolved against the store; the two hits stayed in memory.
    assert_eq!(app.links.retrieve_calls.load(Ordering::SeqCst), 1);

    // Nothing written back yet; the flush applies one coalesced delta.
    assert_eq!(app.links.visits(id), 0);

    let report = app.cache.as_ref().unwrap().flush().await.unwrap();
    assert_eq!(report, FlushReport { flushed: 1, failed: 0 });

    assert_eq!(app.links.recorded_deltas(), vec![(id, 3)]);
    assert_eq!(app.links.visits(id), 3);
}

#[tokio::test]
async fn test_flush_failure_keeps_count_for_retry() {
    let app = common::test_app(true);
    let id = app.links.seed("https://example.com", "alice");
    let key = app.codec.encode(id);

    let server = TestServer::new(common::test_router(app.state.clone())).unwrap();
    server.get(&format!("/{key}")).await;

    let cache = app.cache.as_ref().unwrap();

    app.links.fail_add_visits.store(true, Ordering::SeqCst);
    let report = cache.flush().await.unwrap();
    assert_eq!(report, FlushReport { flushed: 0, failed: 1 });
    assert!(app.links.recorded_deltas().is_empty());

    // Store recovers: the retry sends the full original delta.
    app.links.fail_add_visits.store(false, Ordering::SeqCst);
    let report = cache.flush().await.unwrap();
    assert_eq!(report, FlushReport { flushed: 1, failed: 0 });
    assert_eq!(app.links.recorded_deltas(), vec![(id, 1)]);
}

#[tokio::test]
async fn test_cache_disabled_bumps_every_request() {
    let app = common::test_app(false);
    let id = app.links.seed("https://example.com", "alice");
    let key = app.codec.encode(id);

    let server = TestServer::new(common::test_router(app.state.clone())).unwrap();

    for _ in 0..2 {
        let response = server.get(&format!("/{key}")).await;
        assert_eq!(response.status_code(), 308);
    }

    // Each redirect bumped the row directly, no cache involved.
    assert_eq!(app.links.visits(id), 2);
    assert_eq!(app.links.retrieve_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_redirect_after_cache_close_is_not_found() {
    let app = common::test_app(true);
    let id = app.links.seed("https://example.com", "alice");
    let key = app.codec.encode(id);

    let server = TestServer::new(common::test_router(app.state.clone())).unwrap();
    let response = server.get(&format!("/{key}")).await;
    assert_eq!(response.status_code(), 308);

    app.cache.as_ref().unwrap().close().await.unwrap();

    // The coordinator is gone; redirects degrade to 404 rather than hang.
    let response = server.get(&format!("/{key}")).await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_health_reports_cache_stats() {
    let app = common::test_app(true);
    let server = TestServer::new(common::test_router(app.state.clone())).unwrap();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["cache"]["status"], "ok");
}
