//! Client core for the ProfitWi$e dashboard
//!
//! - [`DashboardClient`]: typed backend access with retries and a safe-call wrapper
//! - [`RetryPolicy`]: exponential backoff that classifies and logs failures
//! - [`PersistenceController`]: debounced, deduplicated state persistence

pub mod client;
pub mod config;
pub mod endpoints;
mod error_handling;
pub mod persistence;
pub mod retry;

pub use client::DashboardClient;
pub use config::{ClientConfig, EndpointConfig, Environment, RetrySettings};
pub use persistence::{PersistenceController, SaveOutcome, StateStore};
pub use retry::{RetryConfig, RetryPolicy};
