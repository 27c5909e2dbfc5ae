use anyhow::Result;
use profitwise_client::{ClientConfig, Environment};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
    pub client: ClientSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
}

/// Backend the proxy routes forward to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// How the CLI builds its [`ClientConfig`]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientSettings {
    pub environment: Environment,
    pub base_url: Option<String>,
    /// TOML client configuration; takes precedence over `environment`
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Override with environment variables if present
        config.apply_overrides(|key| env::var(key).ok())?;

        Ok(config)
    }

    /// Apply `PROFITWISE_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind_address) = lookup("PROFITWISE_BIND_ADDRESS") {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = lookup("PROFITWISE_PORT") {
            self.server.port = port.parse()?;
        }

        // The proxy routes historically read FLASK_BACKEND_URL
        if let Some(upstream) =
            lookup("PROFITWISE_UPSTREAM_URL").or_else(|| lookup("FLASK_BACKEND_URL"))
        {
            self.upstream.base_url = upstream;
        }
        if let Some(timeout) = lookup("PROFITWISE_UPSTREAM_TIMEOUT") {
            self.upstream.timeout_secs = timeout.parse()?;
        }

        if let Some(environment) = lookup("PROFITWISE_ENV") {
            self.client.environment = Environment::from_name(&environment);
        }
        if let Some(base_url) = lookup("PROFITWISE_BASE_URL") {
            self.client.base_url = Some(base_url);
        }
        if let Some(path) = lookup("PROFITWISE_CLIENT_CONFIG") {
            self.client.config_path = Some(PathBuf::from(path));
        }

        if let Some(level) = lookup("PROFITWISE_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.bind_address.is_empty() {
            return Err(anyhow::anyhow!("Bind address cannot be empty"));
        }
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be greater than 0"));
        }

        Url::parse(&self.upstream.base_url).map_err(|e| {
            anyhow::anyhow!("Invalid upstream URL '{}': {}", self.upstream.base_url, e)
        })?;
        if self.upstream.timeout_secs == 0 {
            return Err(anyhow::anyhow!("Upstream timeout must be greater than 0"));
        }

        if let Some(base_url) = &self.client.base_url {
            Url::parse(base_url)
                .map_err(|e| anyhow::anyhow!("Invalid client base URL '{}': {}", base_url, e))?;
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(anyhow::anyhow!("Invalid log level: {}", self.logging.level)),
        }

        Ok(())
    }

    pub fn upstream_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.upstream.base_url)?)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.timeout_secs)
    }

    /// Client configuration for the CLI: the TOML file when one is set,
    /// otherwise the environment defaults. An explicit base URL wins either way.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let config = match &self.client.config_path {
            Some(path) => ClientConfig::from_file(path).map_err(|e| {
                anyhow::anyhow!("Failed to read client config {}: {}", path.display(), e)
            })?,
            None => ClientConfig::for_environment(self.client.environment),
        };

        Ok(match &self.client.base_url {
            Some(base_url) => config.with_base_url(base_url.clone()),
            None => config,
        })
    }
}
