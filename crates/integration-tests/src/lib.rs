//! Shared helpers for the end-to-end tests

pub mod common;

// Re-export commonly used types for tests
pub use profitwise_client::{ClientConfig, DashboardClient, PersistenceController};
pub use profitwise_core::{ErrorCategory, PersistenceState};
pub use profitwise_monitor::{ErrorLogger, ErrorMonitor};
pub use serde_json::{json, Value};
pub use std::sync::Arc;
pub use std::time::Duration;
