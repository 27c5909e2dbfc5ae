use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

use crate::logger::LogEntry;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Error sink request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Error sink rejected entry with HTTP {0}")]
    Rejected(u16),
}

/// Remote destination for logged errors
#[async_trait]
pub trait ErrorSink: Send + Sync {
    async fn send(&self, entry: &LogEntry) -> Result<(), SinkError>;
}

/// Posts entries as JSON to the telemetry endpoint (`/api/error-log`)
#[derive(Debug, Clone)]
pub struct HttpErrorSink {
    client: Client,
    endpoint: String,
}

impl HttpErrorSink {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SinkError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ErrorSink for HttpErrorSink {
    async fn send(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let response = self.client.post(&self.endpoint).json(entry).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected(status.as_u16()));
        }
        trace!(endpoint = %self.endpoint, "Error entry delivered");
        Ok(())
    }
}
