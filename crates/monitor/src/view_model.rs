use chrono::{DateTime, Utc};
use profitwise_core::{
    constants::{DEFAULT_MONITOR_REFRESH_SECS, ERROR_LOG_FILE_PREFIX},
    ErrorCategory, ExportedFile, Severity,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::logger::{ErrorLogger, ErrorStats};

const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Display data for one entry of the monitor panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorView {
    pub category: ErrorCategory,
    pub severity: Severity,
    pub user_message: String,
    /// Only shown behind the "technical details" disclosure
    pub technical_details: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    stats: ErrorStats,
    refreshed_at: Option<DateTime<Utc>>,
}

/// Periodically copies logger statistics into a visible snapshot.
#[derive(Debug)]
pub struct ErrorMonitor {
    logger: Arc<ErrorLogger>,
    snapshot: Mutex<Snapshot>,
    refresh_interval: Duration,
}

impl ErrorMonitor {
    pub fn new(logger: Arc<ErrorLogger>) -> Self {
        Self::with_interval(logger, Duration::from_secs(DEFAULT_MONITOR_REFRESH_SECS))
    }

    /// Intervals shorter than one second are raised to one second
    pub fn with_interval(logger: Arc<ErrorLogger>, refresh_interval: Duration) -> Self {
        Self {
            logger,
            snapshot: Mutex::new(Snapshot::default()),
            refresh_interval: refresh_interval.max(MIN_REFRESH_INTERVAL),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn refresh(&self) -> ErrorStats {
        let stats = self.logger.stats();
        let mut snapshot = self.lock_snapshot();
        snapshot.stats = stats.clone();
        snapshot.refreshed_at = Some(Utc::now());
        stats
    }

    /// Currently visible statistics
    pub fn snapshot(&self) -> ErrorStats {
        self.lock_snapshot().stats.clone()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.lock_snapshot().refreshed_at
    }

    /// Reset the visible snapshot. The logger keeps its entries, so the next
    /// refresh shows them again.
    pub fn clear(&self) {
        *self.lock_snapshot() = Snapshot::default();
    }

    pub fn severity(category: ErrorCategory) -> Severity {
        category.severity()
    }

    /// Per-entry view data for the recent entries of the visible snapshot
    pub fn entry_views(&self) -> Vec<ErrorView> {
        self.lock_snapshot()
            .stats
            .recent
            .iter()
            .map(|entry| ErrorView {
                category: entry.error.category(),
                severity: Self::severity(entry.error.category()),
                user_message: entry.error.user_message(),
                technical_details: entry.error.technical_details(),
                timestamp: entry.timestamp,
            })
            .collect()
    }

    /// Serialize the visible snapshot as `profitwise-errors-<date>.json`
    pub fn export_log(&self) -> serde_json::Result<ExportedFile> {
        let stats = self.snapshot();
        ExportedFile::json(ERROR_LOG_FILE_PREFIX, &stats)
    }

    /// Refresh immediately, then every `refresh_interval` until `shutdown`
    /// fires.
    pub fn spawn_auto_refresh(self: Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.refresh_interval);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("Error monitor auto refresh stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let stats = self.refresh();
                        debug!(total = stats.total, "Error monitor refreshed");
                    }
                }
            }
        })
    }

    fn lock_snapshot(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profitwise_core::{DashboardError, ErrorContext};
    use serde_json::Map;

    fn log(logger: &ErrorLogger, category: ErrorCategory, message: &str) {
        logger.log(DashboardError::new(
            message,
            category,
            500,
            Map::new(),
            ErrorContext::new("DataService", "getDashboardState"),
        ));
    }

    #[test]
    fn test_snapshot_is_empty_until_refresh() {
        let logger = Arc::new(ErrorLogger::default());
        log(&logger, ErrorCategory::Network, "offline");
        let monitor = ErrorMonitor::new(Arc::clone(&logger));

        assert_eq!(monitor.snapshot().total, 0);
        assert!(monitor.last_refresh().is_none());

        let stats = monitor.refresh();
        assert_eq!(stats.total, 1);
        assert_eq!(monitor.snapshot().total, 1);
        assert!(monitor.last_refresh().is_some());
    }

    #[test]
    fn test_clear_only_resets_view() {
        let logger = Arc::new(ErrorLogger::default());
        log(&logger, ErrorCategory::Auth, "expired");
        let monitor = ErrorMonitor::new(Arc::clone(&logger));
        monitor.refresh();

        monitor.clear();
        assert_eq!(monitor.snapshot().total, 0);
        assert_eq!(logger.len(), 1);

        assert_eq!(monitor.refresh().total, 1);
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(ErrorMonitor::severity(ErrorCategory::Auth), Severity::High);
        assert_eq!(ErrorMonitor::severity(ErrorCategory::Authz), Severity::High);
        assert_eq!(ErrorMonitor::severity(ErrorCategory::Network), Severity::Medium);
        assert_eq!(ErrorMonitor::severity(ErrorCategory::AiAnalysis), Severity::Medium);
        assert_eq!(ErrorMonitor::severity(ErrorCategory::Validation), Severity::Low);
        assert_eq!(ErrorMonitor::severity(ErrorCategory::Database), Severity::Medium);
    }

    #[test]
    fn test_entry_views_hide_raw_message_from_user_text() {
        let logger = Arc::new(ErrorLogger::default());
        log(&logger, ErrorCategory::ExternalService, "upstream pool exhausted");
        let monitor = ErrorMonitor::new(Arc::clone(&logger));
        monitor.refresh();

        let views = monitor.entry_views();
        assert_eq!(views.len(), 1);
        assert!(!views[0].user_message.contains("pool exhausted"));
        assert!(views[0].technical_details.contains("pool exhausted"));
        assert_eq!(views[0].severity, Severity::Medium);
    }

    #[test]
    fn test_export_log_uses_visible_snapshot() {
        let logger = Arc::new(ErrorLogger::default());
        log(&logger, ErrorCategory::Network, "offline");
        let monitor = ErrorMonitor::new(Arc::clone(&logger));
        monitor.refresh();

        let file = monitor.export_log().unwrap();
        assert!(file.filename.starts_with("profitwise-errors-"));
        assert!(file.filename.ends_with(".json"));

        let value: serde_json::Value = serde_json::from_slice(&file.contents).unwrap();
        assert_eq!(value["total"], 1);
        assert_eq!(value["by_category"]["NETWORK_ERROR"], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_until_cancelled() {
        let logger = Arc::new(ErrorLogger::default());
        let monitor = Arc::new(ErrorMonitor::with_interval(
            Arc::clone(&logger),
            Duration::from_secs(30),
        ));
        let shutdown = CancellationToken::new();
        let handle = Arc::clone(&monitor).spawn_auto_refresh(shutdown.clone());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(monitor.snapshot().total, 0);
        assert!(monitor.last_refresh().is_some());

        log(&logger, ErrorCategory::Network, "offline");
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(monitor.snapshot().total, 0);

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(monitor.snapshot().total, 1);

        shutdown.cancel();
        handle.await.unwrap();

        log(&logger, ErrorCategory::Network, "still offline");
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(monitor.snapshot().total, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let logger = Arc::new(ErrorLogger::default());
        let monitor = Arc::new(ErrorMonitor::with_interval(
            Arc::clone(&logger),
            Duration::ZERO,
        ));
        assert_eq!(monitor.refresh_interval(), Duration::from_secs(1));

        let shutdown = CancellationToken::new();
        let handle = Arc::clone(&monitor).spawn_auto_refresh(shutdown.clone());

        log(&logger, ErrorCategory::Network, "offline");
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(monitor.snapshot().total, 1);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
