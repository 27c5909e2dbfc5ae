use async_trait::async_trait;
use profitwise_core::{PersistenceState, Result};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::DashboardClient;
use crate::persistence::StateStore;

impl DashboardClient {
    pub async fn save_dashboard_state(&self, state: &PersistenceState) -> Result<Value> {
        let context = self.context("saveDashboardState");
        let path = self.config().endpoints.save_dashboard_state.as_str();

        self.safe_call_default(|| self.post_json::<_, Value>(path, Some(state)), context)
            .await
    }

    /// Saved state for the current session, or `None` when nothing usable
    /// is stored (null, a non-object, an empty object or a malformed state).
    pub async fn get_dashboard_state(&self) -> Result<Option<PersistenceState>> {
        let context = self.context("getDashboardState");
        let path = self.config().endpoints.get_dashboard_state.as_str();

        let value = self
            .safe_call_default(|| self.get_json::<Value>(path), context)
            .await?;

        Ok(state_from_value(value))
    }

    pub async fn export_user_data(&self) -> Result<Value> {
        let context = self.context("exportUserData");
        let path = self.config().endpoints.export_user_data.as_str();

        self.safe_call_default(|| self.get_json::<Value>(path), context)
            .await
    }

    pub async fn import_user_data(&self, data: &Value) -> Result<Value> {
        let context = self.context("importUserData");
        let path = self.config().endpoints.import_user_data.as_str();

        self.safe_call_default(|| self.post_json::<_, Value>(path, Some(data)), context)
            .await
    }
}

fn state_from_value(value: Value) -> Option<PersistenceState> {
    match value {
        Value::Object(map) if !map.is_empty() => {
            match serde_json::from_value(Value::Object(map)) {
                Ok(state) => Some(state),
                Err(e) => {
                    warn!(error = %e, "Ignoring malformed dashboard state");
                    None
                }
            }
        }
        _ => {
            debug!("No saved dashboard state");
            None
        }
    }
}

#[async_trait]
impl StateStore for DashboardClient {
    async fn save_state(&self, state: &PersistenceState) -> Result<()> {
        self.save_dashboard_state(state).await.map(|_| ())
    }

    async fn load_state(&self) -> Result<Option<PersistenceState>> {
        self.get_dashboard_state().await
    }

    async fn export_state(&self) -> Result<Value> {
        self.export_user_data().await
    }

    async fn import_state(&self, data: &Value) -> Result<()> {
        self.import_user_data(data).await.map(|_| ())
    }
}
