use profitwise_core::constants::{
    AI_MAX_RETRIES, DEFAULT_DEBOUNCE_MS, DEFAULT_MAX_RETRIES, DEFAULT_MONITOR_REFRESH_SECS,
    DEFAULT_RETRY_BASE_DELAY_MS,
};
use profitwise_monitor::{LoggerConfig, LoggerMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::retry::RetryConfig;

/// Deployment environment; selects the default backend base URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://profitwise-app-2024-9e182e64be35.herokuapp.com",
            Environment::Development => "http://localhost:5000",
        }
    }

    /// Parse an environment name. Anything other than "production" (or
    /// "prod") is development.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Paths of the backend endpoints, relative to the base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub dashboard_data: String,
    pub process_documents: String,
    pub save_dashboard_state: String,
    pub get_dashboard_state: String,
    pub export_user_data: String,
    pub import_user_data: String,
    pub ai_analysis: String,
    pub ai_insights: String,
    pub ai_chat: String,
    pub error_log: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            dashboard_data: "/api/dashboard-data".to_string(),
            process_documents: "/api/process-documents".to_string(),
            save_dashboard_state: "/api/save-dashboard-state".to_string(),
            get_dashboard_state: "/api/get-dashboard-state".to_string(),
            export_user_data: "/api/export-user-data".to_string(),
            import_user_data: "/api/import-user-data".to_string(),
            ai_analysis: "/api/ai-analysis".to_string(),
            ai_insights: "/api/ai-insights".to_string(),
            ai_chat: "/api/ai-chat".to_string(),
            error_log: "/api/error-log".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts for ordinary calls
    pub max_retries: usize,
    /// Attempts for AI calls
    pub ai_max_retries: usize,
    pub base_delay_ms: u64,
    /// Optional ceiling on a single backoff wait
    pub max_delay_ms: Option<u64>,
    /// Add up to ±10% random jitter to each wait
    pub jitter: bool,
    /// Optional limit on a single attempt
    pub attempt_timeout_secs: Option<u64>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            ai_max_retries: AI_MAX_RETRIES,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_delay_ms: None,
            jitter: false,
            attempt_timeout_secs: None,
        }
    }
}

/// Complete configuration for the dashboard client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub environment: Environment,
    /// Overrides the environment's default base URL
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Forward logged errors to the telemetry endpoint in production
    pub remote_log: bool,
    pub debounce_ms: u64,
    pub monitor_refresh_secs: u64,
    pub retry: RetrySettings,
    pub endpoints: EndpointConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            base_url: None,
            request_timeout_secs: 30,
            user_agent: format!("profitwise-client/{}", env!("CARGO_PKG_VERSION")),
            remote_log: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            monitor_refresh_secs: DEFAULT_MONITOR_REFRESH_SECS,
            retry: RetrySettings::default(),
            endpoints: EndpointConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_file<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&content)?)
    }

    pub fn to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Explicit base URL if set, otherwise the environment default
    pub fn resolved_base_url(&self) -> Result<Url, url::ParseError> {
        let raw = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.default_base_url());
        Url::parse(raw)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn monitor_refresh(&self) -> Duration {
        Duration::from_secs(self.monitor_refresh_secs)
    }

    /// Retry configuration for a call allowed `max_attempts` attempts
    pub fn retry_config(&self, max_attempts: usize) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            max_delay: self.retry.max_delay_ms.map(Duration::from_millis),
            jitter: self.retry.jitter,
            attempt_timeout: self.retry.attempt_timeout_secs.map(Duration::from_secs),
            ..RetryConfig::default()
        }
    }

    pub fn logger_config(&self) -> LoggerConfig {
        let mode = match (self.environment, self.remote_log) {
            (Environment::Production, true) => LoggerMode::Production,
            _ => LoggerMode::Development,
        };
        LoggerConfig {
            mode,
            client_info: self.user_agent.clone(),
            source_url: self
                .resolved_base_url()
                .map(|url| url.to_string())
                .unwrap_or_default(),
            ..LoggerConfig::default()
        }
    }
}
