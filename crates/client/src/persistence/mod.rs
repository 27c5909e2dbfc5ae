//! Persistence of the dashboard view state
//!
//! [`PersistenceController`] coalesces rapid state changes into one delayed
//! save, skips saves whose payload did not change, and moves the state in
//! and out of backup files. Storage goes through [`StateStore`], which
//! [`DashboardClient`](crate::DashboardClient) implements against the
//! backend.

mod controller;

pub use controller::{PersistenceController, SaveOutcome};

use async_trait::async_trait;
use profitwise_core::{PersistenceState, Result};
use serde_json::Value;

/// Remote home of the persisted state
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    async fn save_state(&self, state: &PersistenceState) -> Result<()>;

    async fn load_state(&self) -> Result<Option<PersistenceState>>;

    /// Full backup document for the current user
    async fn export_state(&self) -> Result<Value>;

    async fn import_state(&self, data: &Value) -> Result<()>;
}
