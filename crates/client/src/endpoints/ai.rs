use profitwise_core::Result;
use serde_json::{json, Value};

use crate::client::DashboardClient;

// AI calls are slower and cost more per attempt, so they use
// `retry.ai_max_retries` instead of the default attempt count.
impl DashboardClient {
    pub async fn run_ai_analysis(&self) -> Result<Value> {
        let context = self.context("runAIAnalysis");
        let path = self.config().endpoints.ai_analysis.as_str();

        self.safe_call(
            || self.post_json::<Value, Value>(path, None),
            context,
            self.config().retry.ai_max_retries,
        )
        .await
    }

    pub async fn get_ai_insights(&self) -> Result<Value> {
        let context = self.context("getAIInsights");
        let path = self.config().endpoints.ai_insights.as_str();

        self.safe_call(
            || self.get_json::<Value>(path),
            context,
            self.config().retry.ai_max_retries,
        )
        .await
    }

    pub async fn send_ai_message(&self, message: &str) -> Result<Value> {
        let context = self.context("sendAIMessage");
        let path = self.config().endpoints.ai_chat.as_str();
        let body = json!({ "message": message });

        self.safe_call(
            || self.post_json::<_, Value>(path, Some(&body)),
            context,
            self.config().retry.ai_max_retries,
        )
        .await
    }
}
