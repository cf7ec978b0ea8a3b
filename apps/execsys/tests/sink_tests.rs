//! Integration tests for the spreadsheet sink.
//!
//! A wiremock server stands in for the spreadsheet web app.

#![allow(clippy::unwrap_used, clippy::panic)]

use execsys::config::SheetsConfig;
use execsys::sink::{SheetsSink, SinkError, SinkOutcome};
use execsys_core::{Catalog, CompletionSet, Rating, Ratings, SinkRecord, calculate_results};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TS: &str = "2026-10-17T14:05:00.000Z";

/// Start a webhook that answers every POST /exec with `response`.
async fn start_webhook(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/exec"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn script_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": "ok"}))
}

fn sink_for(server: &MockServer, timeout_secs: u64) -> SheetsSink {
    SheetsSink::new(&SheetsConfig {
        webhook_url: Some(format!("{}/exec", server.uri())),
        timeout_secs: Some(timeout_secs),
    })
    .unwrap()
}

/// Bodies of every request the webhook received.
async fn received_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.body_json::<Value>().unwrap())
        .collect()
}

fn playbook() -> SinkRecord {
    SinkRecord::playbook(TS, "lead@example.com").unwrap()
}

fn diagnostic() -> SinkRecord {
    let catalog = Catalog::standard();
    let ratings: Ratings = catalog
        .capacities()
        .map(|c| (c.id.clone(), Rating::new(6).unwrap()))
        .collect();
    let result = calculate_results(&ratings, &CompletionSet::new(), catalog);
    SinkRecord::diagnostic(TS, "Jane", "jane@example.com", &ratings, &result, catalog).unwrap()
}

// =============================================================================
// SUBMIT
// =============================================================================

#[tokio::test]
async fn test_submit_delivers_record() {
    let server = start_webhook(script_ok()).await;

    let outcome = sink_for(&server, 5).submit(&playbook()).await.unwrap();
    assert_eq!(outcome, SinkOutcome::Delivered);

    assert_eq!(
        received_bodies(&server).await,
        vec![json!({"type": "playbook", "timestamp": TS, "email": "lead@example.com"})]
    );
}

#[tokio::test]
async fn test_submit_sends_diagnostic_columns() {
    let server = start_webhook(script_ok()).await;

    sink_for(&server, 5).submit(&diagnostic()).await.unwrap();

    let bodies = received_bodies(&server).await;
    let received = &bodies[0];
    assert_eq!(received["type"], "diagnostic");
    assert_eq!(received["name"], "Jane");
    assert_eq!(
        received["weakestCapacities"],
        "Response Inhibition, Emotional Regulation, Sustained Attention"
    );
    assert_eq!(received["missingLevers"], "training, training, training");
    assert_eq!(received["recommendation"], "full_system");
    let ratings: Value =
        serde_json::from_str(received["capacityRatings"].as_str().unwrap()).unwrap();
    assert_eq!(ratings.as_object().unwrap().len(), 11);
}

#[tokio::test]
async fn test_submit_script_error_is_rejected() {
    let server = start_webhook(
        ResponseTemplate::new(200)
            .set_body_json(json!({"status": "error", "message": "sheet missing"})),
    )
    .await;

    let err = sink_for(&server, 5).submit(&playbook()).await.unwrap_err();
    assert!(matches!(err, SinkError::Rejected(ref m) if m == "sheet missing"));
}

#[tokio::test]
async fn test_submit_non_json_reply_is_delivered() {
    let server = start_webhook(ResponseTemplate::new(200).set_body_string("<html>ok</html>")).await;

    let outcome = sink_for(&server, 5).submit(&playbook()).await.unwrap();
    assert_eq!(outcome, SinkOutcome::Delivered);
}

#[tokio::test]
async fn test_submit_http_error() {
    let server = start_webhook(ResponseTemplate::new(500).set_body_string("boom")).await;

    let err = sink_for(&server, 5).submit(&playbook()).await.unwrap_err();
    assert!(matches!(err, SinkError::Http(500, ref body) if body == "boom"));
}

#[tokio::test]
async fn test_submit_unreachable_webhook() {
    let server = MockServer::start().await;
    let sink = sink_for(&server, 5);
    drop(server);

    let err = sink.submit(&playbook()).await.unwrap_err();
    assert!(matches!(err, SinkError::ConnectionFailed(_)));
}

#[tokio::test]
async fn test_submit_times_out() {
    let server = start_webhook(script_ok().set_delay(Duration::from_secs(5))).await;

    let err = sink_for(&server, 1).submit(&playbook()).await.unwrap_err();
    assert!(matches!(err, SinkError::ConnectionFailed(_)));
}

#[tokio::test]
async fn test_submit_without_webhook_is_skipped() {
    let sink = SheetsSink::new(&SheetsConfig::default()).unwrap();
    assert!(!sink.is_enabled());
    assert_eq!(sink.submit(&playbook()).await.unwrap(), SinkOutcome::Skipped);
}

// =============================================================================
// DISPATCH
// =============================================================================

#[tokio::test]
async fn test_dispatch_runs_in_background() {
    let server = start_webhook(script_ok()).await;

    sink_for(&server, 5).dispatch(playbook()).await.unwrap();

    let bodies = received_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["email"], "lead@example.com");
}

#[tokio::test]
async fn test_dispatch_swallows_failures() {
    let server = start_webhook(
        ResponseTemplate::new(200).set_body_json(json!({"status": "error", "message": "nope"})),
    )
    .await;

    // The task completes normally even though the webhook rejected the record.
    assert!(sink_for(&server, 5).dispatch(diagnostic()).await.is_ok());
    assert_eq!(received_bodies(&server).await.len(), 1);
}
