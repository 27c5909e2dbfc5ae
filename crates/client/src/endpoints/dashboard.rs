use profitwise_core::{DashboardData, Result};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::client::DashboardClient;

impl DashboardClient {
    /// Fetch the dashboard payload. Never fails: when every attempt fails
    /// the static fallback payload is returned instead.
    pub async fn fetch_dashboard_data(&self) -> DashboardData {
        let context = self.context("fetchDashboardData");
        let path = self.config().endpoints.dashboard_data.as_str();

        match self
            .safe_call_default(|| self.get_json::<DashboardData>(path), context)
            .await
        {
            Ok(data) => {
                debug!(business = %data.business_info.name, "Dashboard data fetched");
                data
            }
            Err(error) => {
                warn!(
                    category = %error.category(),
                    error = %error.message(),
                    "Falling back to static dashboard data"
                );
                DashboardData::fallback()
            }
        }
    }

    /// Submit documents for processing
    pub async fn process_documents(&self, documents: &[Value]) -> Result<Value> {
        let context = self.context("processDocuments");
        let path = self.config().endpoints.process_documents.as_str();
        let body = json!({ "documents": documents });

        self.safe_call_default(|| self.post_json::<_, Value>(path, Some(&body)), context)
            .await
    }
}
