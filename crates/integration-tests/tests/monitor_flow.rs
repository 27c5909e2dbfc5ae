//! Failures flowing from the façade into the logger, monitor and telemetry sink

use integration_tests::common::*;
use integration_tests::*;
use profitwise_core::Severity;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_monitor_reflects_facade_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ai-insights"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/ai-analysis"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let monitor = ErrorMonitor::new(Arc::clone(client.logger()));

    assert!(client.get_ai_insights().await.is_err());
    assert!(client.run_ai_analysis().await.is_err());

    // Nothing is visible until the next refresh
    assert_eq!(monitor.snapshot().total, 0);

    let stats = monitor.refresh();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.by_category[&ErrorCategory::ExternalService], 1);
    assert_eq!(stats.by_category[&ErrorCategory::Auth], 1);
    assert_eq!(stats.by_severity[&Severity::High], 1);

    let views = monitor.entry_views();
    assert_eq!(views.len(), 2);
    assert!(views.iter().all(|view| !view.user_message.is_empty()));

    // Clearing the panel leaves the log intact
    monitor.clear();
    assert_eq!(monitor.snapshot().total, 0);
    assert_eq!(client.logger().len(), 2);
}

#[tokio::test]
async fn test_production_logger_forwards_to_error_log() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai-chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/error-log"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = create_production_client(&server);
    assert!(client.send_ai_message("hello").await.is_err());

    assert_eq!(wait_for_requests(&server, "/api/error-log", 1).await, 1);

    let requests = server.received_requests().await.unwrap();
    let delivered = requests
        .iter()
        .find(|request| request.url.path() == "/api/error-log")
        .unwrap();
    let body: Value = serde_json::from_slice(&delivered.body).unwrap();
    assert_eq!(body["error"]["error_code"], "EXTERNAL_SERVICE_ERROR");
    assert_eq!(body["error"]["context"]["action"], "sendAIMessage");
    assert_eq!(client.logger().len(), 1);
}

#[tokio::test]
async fn test_sink_failure_does_not_affect_caller() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/export-user-data"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/error-log"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = create_production_client(&server);
    let error = client.export_user_data().await.unwrap_err();

    assert_eq!(error.category(), ErrorCategory::ExternalService);
    assert_eq!(wait_for_requests(&server, "/api/error-log", 1).await, 1);
    assert_eq!(client.logger().len(), 1);
}

#[tokio::test]
async fn test_error_log_carries_session_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get-dashboard-state"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=s3cr3t; Path=/")
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/ai-insights"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/error-log"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = create_production_client(&server);
    assert!(client.get_dashboard_state().await.unwrap().is_none());
    assert!(client.get_ai_insights().await.is_err());

    assert_eq!(wait_for_requests(&server, "/api/error-log", 1).await, 1);
    let requests = server.received_requests().await.unwrap();
    let delivered = requests
        .iter()
        .find(|request| request.url.path() == "/api/error-log")
        .unwrap();
    let cookie = delivered
        .headers
        .get("cookie")
        .and_then(|value| value.to_str().ok());
    assert_eq!(cookie, Some("session=s3cr3t"));
}
