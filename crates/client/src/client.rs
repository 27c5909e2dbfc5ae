use profitwise_core::{classify, DashboardError, ErrorContext, RawFailure, Result};
use profitwise_monitor::{ErrorLogger, ErrorMonitor, HttpErrorSink, LoggerMode};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error_handling::{build_endpoint_url, handle_http_response, parse_json_response};
use crate::retry::RetryPolicy;

/// Component name recorded in the context of every façade call
pub(crate) const COMPONENT: &str = "DataService";

/// Typed access to the dashboard backend.
///
/// Every endpoint method goes through [`DashboardClient::safe_call`], so
/// callers only ever see [`DashboardError`].
#[derive(Debug, Clone)]
pub struct DashboardClient {
    client: Client,
    config: ClientConfig,
    base_url: Url,
    logger: Arc<ErrorLogger>,
}

impl DashboardClient {
    /// Build a client that records failures into `logger`
    pub fn new(config: ClientConfig, logger: Arc<ErrorLogger>) -> Result<Self> {
        let base_url = resolve_base_url(&config)?;
        let client = http_client(&config)?;
        Ok(Self::from_parts(client, config, base_url, logger))
    }

    /// Build a client together with its logger. In production the logger
    /// forwards entries to the telemetry endpoint over the same session.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let base_url = resolve_base_url(&config)?;
        let client = http_client(&config)?;

        let logger_config = config.logger_config();
        let logger = match logger_config.mode {
            LoggerMode::Production => {
                let sink = error_sink(&client, &base_url, &config)?;
                ErrorLogger::with_sink(logger_config, Arc::new(sink))
            }
            LoggerMode::Development => ErrorLogger::new(logger_config),
        };

        Ok(Self::from_parts(client, config, base_url, Arc::new(logger)))
    }

    fn from_parts(
        client: Client,
        config: ClientConfig,
        base_url: Url,
        logger: Arc<ErrorLogger>,
    ) -> Self {
        debug!(base_url = %base_url, environment = ?config.environment, "Created dashboard client");

        Self {
            client,
            config,
            base_url,
            logger,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn logger(&self) -> &Arc<ErrorLogger> {
        &self.logger
    }

    /// Monitor over this client's log, refreshing at the configured interval
    pub fn error_monitor(&self) -> ErrorMonitor {
        ErrorMonitor::with_interval(Arc::clone(&self.logger), self.config.monitor_refresh())
    }

    /// Get the inner reqwest client
    pub fn inner_client(&self) -> &Client {
        &self.client
    }

    /// Run `operation` with retries, returning only typed errors.
    ///
    /// Opaque failures and undecodable bodies escaping the operation are
    /// reported as NETWORK.
    pub async fn safe_call<F, Fut, T, E>(
        &self,
        operation: F,
        context: ErrorContext,
        max_retries: usize,
    ) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<RawFailure>,
    {
        let policy = RetryPolicy::new(
            self.config.retry_config(max_retries),
            Arc::clone(&self.logger),
        );

        let wrapped = || {
            let attempt = operation();
            async move {
                attempt.await.map_err(|e| {
                    let raw: RawFailure = e.into();
                    match raw {
                        RawFailure::Other(message) => RawFailure::transport(message),
                        RawFailure::Decode { message } => {
                            RawFailure::transport(format!("Failed to decode response: {message}"))
                        }
                        other => other,
                    }
                })
            }
        };

        policy.execute(wrapped, context).await
    }

    /// [`safe_call`](Self::safe_call) with the configured default attempts
    pub async fn safe_call_default<F, Fut, T, E>(&self, operation: F, context: ErrorContext) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<RawFailure>,
    {
        self.safe_call(operation, context, self.config.retry.max_retries)
            .await
    }

    pub(crate) fn context(&self, action: &str) -> ErrorContext {
        ErrorContext::new(COMPONENT, action)
    }

    pub(crate) async fn get_json<T>(&self, path: &str) -> std::result::Result<T, RawFailure>
    where
        T: DeserializeOwned,
    {
        let url = build_endpoint_url(&self.base_url, path)?;
        debug!(url = %url, "GET");

        let response = self.client.get(url).send().await?;
        let response = handle_http_response(response, path).await?;
        parse_json_response(response, path).await
    }

    pub(crate) async fn post_json<B, T>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> std::result::Result<T, RawFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = build_endpoint_url(&self.base_url, path)?;
        debug!(url = %url, "POST");

        let request = self.client.post(url);
        let request = match body {
            Some(body) => request.json(body),
            None => request.header(reqwest::header::CONTENT_TYPE, "application/json"),
        };

        let response = request.send().await?;
        let response = handle_http_response(response, path).await?;
        parse_json_response(response, path).await
    }
}

fn resolve_base_url(config: &ClientConfig) -> Result<Url> {
    config.resolved_base_url().map_err(|e| {
        DashboardError::validation(
            format!("Invalid base URL: {e}"),
            Some("base_url"),
            ErrorContext::new(COMPONENT, "initialize"),
        )
    })
}

fn http_client(config: &ClientConfig) -> Result<Client> {
    Client::builder()
        .cookie_store(true)
        .timeout(config.request_timeout())
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| {
            classify(
                RawFailure::from(e),
                &ErrorContext::new(COMPONENT, "initialize"),
            )
        })
}

/// Telemetry sink sharing the client's cookie store
fn error_sink(client: &Client, base_url: &Url, config: &ClientConfig) -> Result<HttpErrorSink> {
    let endpoint = build_endpoint_url(base_url, &config.endpoints.error_log)
        .map_err(|e| classify(e, &ErrorContext::new(COMPONENT, "initialize")))?;

    Ok(HttpErrorSink::with_client(client.clone(), endpoint.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use profitwise_core::ErrorCategory;
    use serde_json::Value;
    use std::time::Duration;

    fn test_client(base_url: &str) -> DashboardClient {
        let mut config = ClientConfig::new().with_base_url(base_url);
        config.retry.base_delay_ms = 5;
        DashboardClient::new(config, Arc::new(ErrorLogger::default())).unwrap()
    }

    #[test]
    fn test_invalid_base_url_is_validation_error() {
        let config = ClientConfig::new().with_base_url("not a url");
        let error = DashboardClient::new(config, Arc::new(ErrorLogger::default())).unwrap_err();

        assert_eq!(error.category(), ErrorCategory::Validation);
        assert_eq!(error.details()["field"], "base_url");
    }

    #[test]
    fn test_from_config_in_development() {
        let client = DashboardClient::from_config(ClientConfig::new()).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/");
        assert!(client.logger().is_empty());
    }

    #[test]
    fn test_error_monitor_uses_configured_interval() {
        let mut config = ClientConfig::new();
        config.monitor_refresh_secs = 5;
        let client = DashboardClient::new(config, Arc::new(ErrorLogger::default())).unwrap();

        let monitor = client.error_monitor();
        assert_eq!(monitor.refresh_interval(), Duration::from_secs(5));

        client.logger().log(DashboardError::network(
            "offline",
            client.context("getAIInsights"),
        ));
        assert_eq!(monitor.refresh().total, 1);
    }

    #[tokio::test]
    async fn test_safe_call_wraps_opaque_failures_as_network() {
        let client = test_client("http://localhost:5000");

        let error = client
            .safe_call(
                || async { Err::<(), _>(RawFailure::Other("socket closed".to_string())) },
                client.context("loadWidget"),
                2,
            )
            .await
            .unwrap_err();

        assert_eq!(error.category(), ErrorCategory::Network);
        assert_eq!(error.context().component(), "DataService");
        assert_eq!(client.logger().len(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_network_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/ai-insights")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .expect(2)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let error = client.get_ai_insights().await.unwrap_err();

        assert_eq!(error.category(), ErrorCategory::Network);
        assert!(error.message().starts_with("Failed to decode response"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_json_sends_and_decodes() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/ai-insights")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"insights":["Raise prices"]}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let value: Value = client.get_json("/api/ai-insights").await.unwrap();
        assert_eq!(value["insights"][0], "Raise prices");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_base_url_path_prefix_is_kept() {
        let mut server = Server::new_async().await;
        let prefixed = server
            .mock("GET", "/backend/api/ai-insights")
            .with_status(200)
            .with_body(r#"{"insights":[]}"#)
            .create_async()
            .await;

        let client = test_client(&format!("{}/backend", server.url()));
        let value = client.get_ai_insights().await.unwrap();
        assert!(value["insights"].is_array());

        prefixed.assert_async().await;
    }

    #[tokio::test]
    async fn test_cookies_are_kept_between_calls() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/get-dashboard-state")
            .with_status(200)
            .with_header("set-cookie", "session=abc123; Path=/")
            .with_body("{}")
            .create_async()
            .await;
        let second = server
            .mock("GET", "/api/export-user-data")
            .match_header("cookie", "session=abc123")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let _: Value = client.get_json("/api/get-dashboard-state").await.unwrap();
        let _: Value = client.get_json("/api/export-user-data").await.unwrap();

        second.assert_async().await;
    }
}
