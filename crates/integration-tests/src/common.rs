//! Common utilities for integration tests

use crate::*;
use profitwise_client::Environment;
use wiremock::MockServer;

/// Backend delay between attempts, short enough for real-time tests
pub const TEST_BASE_DELAY_MS: u64 = 10;

/// Client configuration pointed at `server` with fast retries
pub fn test_config(server: &MockServer) -> ClientConfig {
    let mut config = ClientConfig::new().with_base_url(server.uri());
    config.retry.base_delay_ms = TEST_BASE_DELAY_MS;
    config.request_timeout_secs = 5;
    config
}

/// Development client sharing a fresh logger
pub fn create_test_client(server: &MockServer) -> Arc<DashboardClient> {
    let client = DashboardClient::new(test_config(server), Arc::new(ErrorLogger::default()))
        .expect("Failed to create DashboardClient");
    Arc::new(client)
}

/// Production client whose logger forwards to the backend's error log
pub fn create_production_client(server: &MockServer) -> Arc<DashboardClient> {
    let mut config = test_config(server);
    config.environment = Environment::Production;
    let client = DashboardClient::from_config(config)
        .expect("Failed to create DashboardClient");
    Arc::new(client)
}

/// Persistence controller over `client` with a short debounce window
pub fn create_controller(
    client: &Arc<DashboardClient>,
    debounce: Duration,
) -> PersistenceController<DashboardClient> {
    PersistenceController::with_debounce(Arc::clone(client), debounce)
}

/// A representative saved dashboard state
pub fn sample_state() -> PersistenceState {
    serde_json::from_value(json!({
        "activeSection": "financial",
        "userPreferences": { "theme": "dark" },
        "viewedSections": ["overview", "financial"],
        "interactions": [],
        "bookmarks": [],
        "notes": { "financial": "Check Q3 margins" },
        "filters": { "period": "quarter" },
        "settings": { "currency": "USD" }
    }))
    .expect("Invalid sample state")
}

/// Number of requests the mock backend received on `path`
pub async fn requests_to(server: &MockServer, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == path)
        .count()
}

/// Poll until `path` has seen `expected` requests or two seconds pass
pub async fn wait_for_requests(server: &MockServer, path: &str, expected: usize) -> usize {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let seen = requests_to(server, path).await;
        if seen >= expected || tokio::time::Instant::now() >= deadline {
            return seen;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
