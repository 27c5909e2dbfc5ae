//! Error log and error monitor for the dashboard core
//!
//! - [`ErrorLogger`]: bounded in-memory log with an optional remote sink
//! - [`ErrorMonitor`]: refreshable snapshot of the log for display

pub mod logger;
pub mod sink;
pub mod view_model;

pub use logger::{install_panic_hook, ErrorLogger, ErrorStats, LogEntry, LoggerConfig, LoggerMode};
pub use sink::{ErrorSink, HttpErrorSink, SinkError};
pub use view_model::{ErrorMonitor, ErrorView};
