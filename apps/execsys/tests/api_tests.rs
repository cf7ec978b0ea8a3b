//! Integration tests for the Execution System HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum_test::TestServer;
use execsys::api::{
    AppState, CatalogResponse, DiagnosticResponse, HealthResponse, MAX_BODY_BYTES,
    PlaybookResponse, ReportResponse, SiteResponse, SubmitResponse, create_router,
};
use execsys::config::AppConfig;
use execsys::sink::SheetsSink;
use execsys_core::{Catalog, Lever, Recommendation};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Config with rate limiting off so tests never trip the limiter.
fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.rate_limit = Some(0);
    config
}

fn create_test_server_with(config: AppConfig) -> TestServer {
    let state = AppState::new(config, SheetsSink::disabled());
    TestServer::new(create_router(state)).unwrap()
}

fn create_test_server() -> TestServer {
    create_test_server_with(test_config())
}

/// A spreadsheet webhook double answering POST /exec with `response`.
async fn start_webhook(response: ResponseTemplate) -> MockServer {
    let webhook = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/exec"))
        .respond_with(response)
        .mount(&webhook)
        .await;
    webhook
}

/// Test server whose sink posts to `webhook`.
fn create_test_server_with_webhook(webhook: &MockServer) -> TestServer {
    let mut config = test_config();
    config.sheets.webhook_url = Some(format!("{}/exec", webhook.uri()));
    let sink = SheetsSink::new(&config.sheets).unwrap();
    let state = AppState::new(config, sink);
    TestServer::new(create_router(state)).unwrap()
}

/// Wait for the background submission to reach the webhook.
async fn wait_for_records(webhook: &MockServer, count: usize) -> Vec<Value> {
    for _ in 0..100 {
        let received = webhook.received_requests().await.unwrap();
        if received.len() >= count {
            return received
                .iter()
                .map(|r| r.body_json::<Value>().unwrap())
                .collect();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("webhook did not receive {} record(s)", count);
}

/// Every capacity rated, weakest three: task_initiation (2), planning (3),
/// time_awareness (3).
fn full_ratings() -> Value {
    let values = [7, 6, 5, 2, 4, 3, 5, 3, 6, 7, 5];
    let map: serde_json::Map<String, Value> = Catalog::standard()
        .capacities()
        .zip(values)
        .map(|(c, v)| (c.id.as_str().to_string(), json!(v)))
        .collect();
    Value::Object(map)
}

// =============================================================================
// HEALTH / SITE / CATALOG
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_site_defaults() {
    let server = create_test_server();

    let site: SiteResponse = server.get("/site").await.json();
    assert_eq!(site.booking_url, "https://calendly.com/cole-whetstone");
    assert_eq!(site.contact_email, "hello@whetstoneadmissions.com");
}

#[tokio::test]
async fn test_site_uses_config() {
    let mut config = test_config();
    config.site.booking_url = Some("https://book.example.com/call".to_string());
    let server = create_test_server_with(config);

    let site: SiteResponse = server.get("/site").await.json();
    assert_eq!(site.booking_url, "https://book.example.com/call");
}

#[tokio::test]
async fn test_catalog_shape() {
    let server = create_test_server();

    let response = server.get("/catalog").await;
    response.assert_status_ok();
    let catalog: CatalogResponse = response.json();

    let sizes: Vec<usize> = catalog.clusters.iter().map(|c| c.capacities.len()).collect();
    assert_eq!(sizes, vec![3, 2, 3, 3]);
    for capacity in catalog.clusters.iter().flat_map(|c| &c.capacities) {
        assert_eq!(capacity.interventions.len(), 3);
        for lever in Lever::ALL {
            assert_eq!(capacity.interventions[&lever].len(), 2);
        }
    }
}

#[tokio::test]
async fn test_catalog_levers_are_named_keys() {
    let server = create_test_server();

    let body: Value = server.get("/catalog").await.json();
    let first = &body["clusters"][0]["capacities"][0];
    assert_eq!(first["id"], "response_inhibition");
    assert_eq!(first["interventions"]["training"][0]["id"], "ri_mindfulness");
    assert!(first["interventions"]["accountability"].is_array());
}

// =============================================================================
// DIAGNOSTIC ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_diagnostic_full_ratings() {
    let server = create_test_server();

    let response = server
        .post("/diagnostic")
        .json(&json!({ "ratings": full_ratings(), "completions": { "ti_prep": true } }))
        .await;

    response.assert_status_ok();
    let body: DiagnosticResponse = response.json();
    assert!(body.success);
    assert!(body.complete);
    let result = body.result.unwrap();
    let ids: Vec<&str> = result.weakest.iter().map(|s| s.capacity.id.as_str()).collect();
    assert_eq!(ids, vec!["task_initiation", "planning", "time_awareness"]);
    assert_eq!(result.weakest[0].implemented_for(Lever::Environment), 1);
    assert_eq!(result.recommendation, Recommendation::FullSystem);
}

#[tokio::test]
async fn test_diagnostic_partial_ratings() {
    let server = create_test_server();

    let response = server
        .post("/diagnostic")
        .json(&json!({ "ratings": { "metacognition": 8, "organization": 2 } }))
        .await;

    response.assert_status_ok();
    let body: DiagnosticResponse = response.json();
    assert!(body.success);
    assert!(!body.complete);
    let names: Vec<String> = body
        .result
        .unwrap()
        .weakest
        .iter()
        .map(|s| s.capacity.name.clone())
        .collect();
    assert_eq!(names, vec!["Organization", "Metacognition"]);
}

#[tokio::test]
async fn test_diagnostic_empty_body_object() {
    let server = create_test_server();

    let body: DiagnosticResponse = server.post("/diagnostic").json(&json!({})).await.json();
    let result = body.result.unwrap();
    assert!(result.weakest.is_empty());
    assert_eq!(result.recommendation, Recommendation::FullSystem);
}

#[tokio::test]
async fn test_diagnostic_rejects_out_of_range() {
    let server = create_test_server();

    let response = server
        .post("/diagnostic")
        .json(&json!({ "ratings": { "planning": 0 } }))
        .await;

    response.assert_status_bad_request();
    let body: DiagnosticResponse = response.json();
    assert!(!body.success);
    assert!(body.error.unwrap().contains("planning"));
}

#[tokio::test]
async fn test_diagnostic_rejects_unknown_capacity() {
    let server = create_test_server();

    let response = server
        .post("/diagnostic")
        .json(&json!({ "ratings": { "telepathy": 5 } }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_diagnostic_ignores_unknown_intervention() {
    let server = create_test_server();

    let response = server
        .post("/diagnostic")
        .json(&json!({ "ratings": { "planning": 4 }, "completions": { "made_up": true } }))
        .await;

    response.assert_status_ok();
}

// =============================================================================
// SUBMIT ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_submit_requires_complete_ratings() {
    let server = create_test_server();

    let response = server
        .post("/diagnostic/submit")
        .json(&json!({ "email": "a@b.co", "ratings": { "planning": 4 } }))
        .await;

    response.assert_status_bad_request();
    let body: SubmitResponse = response.json();
    assert!(!body.success);
    assert!(!body.submitted);
}

#[tokio::test]
async fn test_submit_without_email_is_not_recorded() {
    let server = create_test_server();

    let response = server
        .post("/diagnostic/submit")
        .json(&json!({ "name": "Jane", "ratings": full_ratings() }))
        .await;

    response.assert_status_ok();
    let body: SubmitResponse = response.json();
    assert!(body.success);
    assert!(!body.submitted);
    assert!(body.result.is_some());
}

#[tokio::test]
async fn test_submit_with_email_and_no_webhook() {
    let server = create_test_server();

    let response = server
        .post("/diagnostic/submit")
        .json(&json!({ "name": "Jane", "email": "jane@example.com", "ratings": full_ratings() }))
        .await;

    response.assert_status_ok();
    let body: SubmitResponse = response.json();
    assert!(body.submitted);
}

#[tokio::test]
async fn test_submit_rejects_bad_email() {
    let server = create_test_server();

    let response = server
        .post("/diagnostic/submit")
        .json(&json!({ "email": "jane-at-example", "ratings": full_ratings() }))
        .await;

    response.assert_status_bad_request();
}

// =============================================================================
// REPORT ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_report_returns_named_file() {
    let server = create_test_server();

    let response = server
        .post("/diagnostic/report")
        .json(&json!({ "name": "Jane Doe", "ratings": full_ratings() }))
        .await;

    response.assert_status_ok();
    let body: ReportResponse = response.json();
    assert!(body.success);
    assert_eq!(
        body.filename.as_deref(),
        Some("Execution-Diagnostic-Jane-Doe.txt")
    );
    assert_eq!(body.recommendation, Some(Recommendation::FullSystem));

    let decoded = base64::Engine::decode(
        &base64::engine::general_purpose::STANDARD,
        body.data.unwrap(),
    )
    .unwrap();
    let text = String::from_utf8(decoded).unwrap();
    assert!(text.contains("Prepared for Jane Doe"));
    assert!(text.contains("Book your call: https://calendly.com/cole-whetstone"));
}

#[tokio::test]
async fn test_report_without_name() {
    let server = create_test_server();

    let body: ReportResponse = server
        .post("/diagnostic/report")
        .json(&json!({ "ratings": full_ratings() }))
        .await
        .json();
    assert_eq!(
        body.filename.as_deref(),
        Some("Execution-Diagnostic-Report.txt")
    );
}

#[tokio::test]
async fn test_report_requires_complete_ratings() {
    let server = create_test_server();

    let response = server
        .post("/diagnostic/report")
        .json(&json!({ "ratings": { "planning": 4 } }))
        .await;

    response.assert_status_bad_request();
}

// =============================================================================
// PLAYBOOK ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_playbook_accepts_email() {
    let server = create_test_server();

    let response = server
        .post("/playbook")
        .json(&json!({ "email": "lead@example.com" }))
        .await;

    response.assert_status_ok();
    let body: PlaybookResponse = response.json();
    assert!(body.success);
}

#[tokio::test]
async fn test_playbook_rejects_invalid_email() {
    let server = create_test_server();

    let response = server.post("/playbook").json(&json!({ "email": "" })).await;

    response.assert_status_bad_request();
    let body: PlaybookResponse = response.json();
    assert!(!body.success);
}

// =============================================================================
// SPREADSHEET WEBHOOK TESTS
// =============================================================================

#[tokio::test]
async fn test_submit_delivers_diagnostic_record() {
    let webhook = start_webhook(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"}))).await;
    let server = create_test_server_with_webhook(&webhook);

    let response = server
        .post("/diagnostic/submit")
        .json(&json!({ "name": "Jane", "email": "jane@example.com", "ratings": full_ratings() }))
        .await;
    response.assert_status_ok();
    assert!(response.json::<SubmitResponse>().submitted);

    let records = wait_for_records(&webhook, 1).await;
    let record = &records[0];
    assert_eq!(record["type"], "diagnostic");
    assert_eq!(record["name"], "Jane");
    assert_eq!(record["email"], "jane@example.com");
    assert_eq!(record["recommendation"], "full_system");
    assert_eq!(
        record["weakestCapacities"],
        "Task Initiation, Planning & Prioritization, Time Awareness"
    );
    assert_eq!(record["missingLevers"], "training, training, training");

    let ratings: Value =
        serde_json::from_str(record["capacityRatings"].as_str().unwrap()).unwrap();
    assert_eq!(ratings, full_ratings());
}

#[tokio::test]
async fn test_submit_does_not_wait_for_failing_webhook() {
    let webhook = start_webhook(
        ResponseTemplate::new(500)
            .set_body_string("boom")
            .set_delay(Duration::from_secs(4)),
    )
    .await;
    let server = create_test_server_with_webhook(&webhook);

    let started = Instant::now();
    let response = server
        .post("/diagnostic/submit")
        .json(&json!({ "email": "jane@example.com", "ratings": full_ratings() }))
        .await;
    let elapsed = started.elapsed();

    response.assert_status_ok();
    let body: SubmitResponse = response.json();
    assert!(body.success);
    assert!(body.submitted);
    assert_eq!(body.result.unwrap().weakest.len(), 3);
    assert!(elapsed < Duration::from_secs(2), "submit took {:?}", elapsed);
}

#[tokio::test]
async fn test_submit_without_email_sends_nothing() {
    let webhook = start_webhook(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"}))).await;
    let server = create_test_server_with_webhook(&webhook);

    server
        .post("/diagnostic/submit")
        .json(&json!({ "ratings": full_ratings() }))
        .await
        .assert_status_ok();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(webhook.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_playbook_delivers_lead_record() {
    let webhook = start_webhook(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"}))).await;
    let server = create_test_server_with_webhook(&webhook);

    server
        .post("/playbook")
        .json(&json!({ "email": " lead@example.com " }))
        .await
        .assert_status_ok();

    let records = wait_for_records(&webhook, 1).await;
    assert_eq!(records[0]["type"], "playbook");
    assert_eq!(records[0]["email"], "lead@example.com");
    assert!(records[0]["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_playbook_does_not_wait_for_failing_webhook() {
    let webhook = start_webhook(
        ResponseTemplate::new(500)
            .set_body_string("boom")
            .set_delay(Duration::from_secs(4)),
    )
    .await;
    let server = create_test_server_with_webhook(&webhook);

    let started = Instant::now();
    let response = server
        .post("/playbook")
        .json(&json!({ "email": "lead@example.com" }))
        .await;
    let elapsed = started.elapsed();

    response.assert_status_ok();
    assert!(response.json::<PlaybookResponse>().success);
    assert!(elapsed < Duration::from_secs(2), "playbook took {:?}", elapsed);
}

// =============================================================================
// MIDDLEWARE TESTS
// =============================================================================

#[tokio::test]
async fn test_rate_limit_enforced() {
    let mut config = test_config();
    config.server.rate_limit = Some(1);
    let server = create_test_server_with(config);

    server.get("/health").await.assert_status_ok();
    let response = server.get("/health").await;
    assert_eq!(response.status_code().as_u16(), 429);
}

#[tokio::test]
async fn test_body_limit_enforced() {
    let server = create_test_server();

    let padding = "x".repeat(MAX_BODY_BYTES + 1);
    let response = server
        .post("/playbook")
        .json(&json!({ "email": padding }))
        .await;

    assert_eq!(response.status_code().as_u16(), 413);
}

#[tokio::test]
async fn test_cors_permissive_config() {
    let mut config = test_config();
    config.server.cors_origins = Some("*".to_string());
    let server = create_test_server_with(config);

    server.get("/health").await.assert_status_ok();
}

// =============================================================================
// ERROR HANDLING TESTS
// =============================================================================

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let server = create_test_server();

    let response = server.get("/unknown").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_method_not_allowed() {
    let server = create_test_server();

    // /diagnostic is POST only
    let response = server.get("/diagnostic").await;
    assert_eq!(response.status_code().as_u16(), 405);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let server = create_test_server();

    let response = server
        .post("/diagnostic")
        .bytes(bytes::Bytes::from("not valid json"))
        .content_type("application/json")
        .await;

    assert!(response.status_code().is_client_error());
}
