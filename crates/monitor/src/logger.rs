use chrono::{DateTime, Utc};
use profitwise_core::{
    constants::{ERROR_LOG_CAPACITY, RECENT_ERRORS},
    DashboardError, ErrorCategory, ErrorContext, Severity,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, warn};

use crate::sink::ErrorSink;

/// One logged failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub error: DashboardError,
    pub timestamp: DateTime<Utc>,
    pub client_info: String,
    pub source_url: String,
}

/// Development echoes entries to the tracing output; production forwards
/// them to the remote sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerMode {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub capacity: usize,
    pub mode: LoggerMode,
    /// Identifies the client in each entry (user agent equivalent)
    pub client_info: String,
    /// Location the client was working against when the failure happened
    pub source_url: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            capacity: ERROR_LOG_CAPACITY,
            mode: LoggerMode::Development,
            client_info: format!("profitwise-client/{}", env!("CARGO_PKG_VERSION")),
            source_url: String::new(),
        }
    }
}

/// Point-in-time statistics over the log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorStats {
    pub total: usize,
    /// Newest entries, oldest first
    pub recent: Vec<LogEntry>,
    pub by_category: BTreeMap<ErrorCategory, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
}

/// Bounded FIFO of classified failures.
///
/// Construct one at startup and share it through `Arc`. `log` never fails and
/// never panics; remote delivery happens on a detached task.
pub struct ErrorLogger {
    entries: Mutex<VecDeque<LogEntry>>,
    config: LoggerConfig,
    sink: Option<Arc<dyn ErrorSink>>,
}

impl ErrorLogger {
    pub fn new(config: LoggerConfig) -> Self {
        debug!(
            capacity = config.capacity,
            mode = ?config.mode,
            "Creating error logger"
        );

        Self {
            entries: Mutex::new(VecDeque::with_capacity(config.capacity)),
            config,
            sink: None,
        }
    }

    pub fn with_sink(config: LoggerConfig, sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            sink: Some(sink),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Record a failure
    pub fn log(&self, error: DashboardError) {
        let entry = LogEntry {
            error,
            timestamp: Utc::now(),
            client_info: self.config.client_info.clone(),
            source_url: self.config.source_url.clone(),
        };

        match self.config.mode {
            LoggerMode::Development => {
                let context = entry.error.context();
                error!(
                    category = %entry.error.category(),
                    status = entry.error.status_code(),
                    component = %context.component(),
                    action = %context.action(),
                    "Dashboard error: {}",
                    entry.error.message()
                );
            }
            LoggerMode::Production => self.forward(entry.clone()),
        }

        let mut entries = self.lock_entries();
        entries.push_back(entry);
        while entries.len() > self.config.capacity {
            entries.pop_front();
        }
    }

    /// Fire-and-forget delivery. Failures end here and never reach `log`.
    fn forward(&self, entry: LogEntry) {
        let Some(sink) = self.sink.as_ref().map(Arc::clone) else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime available, skipping remote error delivery");
            return;
        };

        handle.spawn(async move {
            if let Err(e) = sink.send(&entry).await {
                warn!(error = %e, "Failed to send error to tracking service");
            }
        });
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock_entries().iter().cloned().collect()
    }

    pub fn stats(&self) -> ErrorStats {
        let entries = self.lock_entries();

        let mut by_category = BTreeMap::new();
        let mut by_severity = BTreeMap::new();
        for entry in entries.iter() {
            let category = entry.error.category();
            *by_category.entry(category).or_insert(0) += 1;
            *by_severity.entry(category.severity()).or_insert(0) += 1;
        }

        let skip = entries.len().saturating_sub(RECENT_ERRORS);
        ErrorStats {
            total: entries.len(),
            recent: entries.iter().skip(skip).cloned().collect(),
            by_category,
            by_severity,
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ErrorLogger {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}

impl std::fmt::Debug for ErrorLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorLogger")
            .field("config", &self.config)
            .field("len", &self.len())
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

/// Record panics as UNHANDLED entries, then defer to the previous hook
pub fn install_panic_hook(logger: Arc<ErrorLogger>) {
    let previous = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "Unhandled panic".to_string());

        let mut details = Map::new();
        if let Some(location) = info.location() {
            details.insert("filename".to_string(), Value::from(location.file()));
            details.insert("lineno".to_string(), Value::from(location.line()));
            details.insert("colno".to_string(), Value::from(location.column()));
        }

        logger.log(DashboardError::new(
            message,
            ErrorCategory::Unhandled,
            500,
            details,
            ErrorContext::new("Global", "unhandled_panic"),
        ));

        previous(info);
    }));
}
