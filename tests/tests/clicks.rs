//! Tests for click registration over HTTP.
//!
//! POST /counter/:banner_id → ClickService → intake queue → aggregator →
//! MockStore (on stop).

use axum::http::StatusCode;
use axum_test::TestServer;
use clicker_core::BannerId;
use integration_tests::{fixtures, setup::TestContext};

#[tokio::test]
async fn test_click_known_banner() {
    let banner = fixtures::banner("Summer sale");
    let ctx = TestContext::new(vec![banner.clone()]);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.post(&format!("/counter/{}", banner.id)).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_clicks_are_stored_on_stop() {
    let a = fixtures::banner("A");
    let b = fixtures::banner("B");
    let ctx = TestContext::new(vec![a.clone(), b.clone()]);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    for _ in 0..3 {
        server.post(&format!("/counter/{}", a.id)).await.assert_status_ok();
    }
    server.post(&format!("/counter/{}", b.id)).await.assert_status_ok();

    // Nothing reaches storage before the flush
    assert_eq!(ctx.store.save_calls(), 0);

    let report = ctx.stop().await;
    assert_eq!(report.clicks_received, 4);
    assert_eq!(report.clicks_flushed, 4);
    assert_eq!(ctx.store.save_calls(), 1);
    assert_eq!(ctx.store.total_for(a.id), 3);
    assert_eq!(ctx.store.total_for(b.id), 1);
}

#[tokio::test]
async fn test_many_clicks_collapse_into_one_row() {
    let banner = fixtures::banner("Hot");
    let ctx = TestContext::new(vec![banner.clone()]);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    let path = format!("/counter/{}", banner.id);

    for _ in 0..50 {
        server.post(&path).await.assert_status_ok();
    }

    ctx.stop().await;
    assert_eq!(ctx.store.save_calls(), 1);
    assert_eq!(ctx.store.total_for(banner.id), 50);
}

#[tokio::test]
async fn test_unknown_banner_rejected() {
    let ctx = TestContext::new(vec![fixtures::banner("Known")]);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post(&format!("/counter/{}", BannerId::new_v4()))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "BANNER_001");

    let report = ctx.stop().await;
    assert_eq!(report.clicks_received, 0);
    assert_eq!(ctx.store.save_calls(), 0);
}

#[tokio::test]
async fn test_invalid_banner_id() {
    let ctx = TestContext::new(vec![]);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.post("/counter/not-a-uuid").expect_failure().await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

#[tokio::test]
async fn test_lookup_failure_is_server_error() {
    let banner = fixtures::banner("A");
    let ctx = TestContext::new(vec![banner.clone()]);
    ctx.store.set_fail_lookups(true);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post(&format!("/counter/{}", banner.id))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "DB_002");
}

#[tokio::test]
async fn test_click_after_shutdown_is_unavailable() {
    let banner = fixtures::banner("A");
    let ctx = TestContext::new(vec![banner.clone()]);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.stop().await;

    let response = server
        .post(&format!("/counter/{}", banner.id))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INGEST_001");
    assert_eq!(ctx.store.total_for(banner.id), 0);
}

#[tokio::test]
async fn test_storage_failure_loses_window_but_keeps_serving() {
    let banner = fixtures::banner("A");
    let ctx = TestContext::new(vec![banner.clone()]);
    ctx.store.set_fail_saves(true);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.post(&format!("/counter/{}", banner.id)).await.assert_status_ok();
    server.post(&format!("/counter/{}", banner.id)).await.assert_status_ok();

    let report = ctx.stop().await;
    assert_eq!(report.failed_flushes, 1);
    assert_eq!(report.clicks_dropped, 2);
    assert_eq!(ctx.store.total_for(banner.id), 0);
}
