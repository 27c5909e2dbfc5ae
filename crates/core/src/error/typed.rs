use super::{ApiErrorBody, ErrorCategory, ErrorContext};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// The single error type surfaced by the dashboard core.
///
/// Fields are private so the category cannot change after construction.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("[{category}] {message}")]
pub struct DashboardError {
    message: String,
    #[serde(rename = "error_code")]
    category: ErrorCategory,
    status_code: u16,
    #[serde(default)]
    details: Map<String, Value>,
    context: ErrorContext,
}

impl DashboardError {
    pub fn new(
        message: impl Into<String>,
        category: ErrorCategory,
        status_code: u16,
        details: Map<String, Value>,
        context: ErrorContext,
    ) -> Self {
        Self {
            message: message.into(),
            category,
            status_code,
            details,
            context,
        }
    }

    pub fn validation(
        message: impl Into<String>,
        field: Option<&str>,
        context: ErrorContext,
    ) -> Self {
        let mut details = Map::new();
        if let Some(field) = field {
            details.insert("field".to_string(), Value::String(field.to_string()));
        }
        Self::new(message, ErrorCategory::Validation, 400, details, context)
    }

    pub fn authentication(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::new(message, ErrorCategory::Auth, 401, Map::new(), context)
    }

    pub fn network(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::new(message, ErrorCategory::Network, 0, Map::new(), context)
    }

    pub fn not_found(resource: &str, context: ErrorContext) -> Self {
        let mut details = Map::new();
        details.insert("resource".to_string(), Value::String(resource.to_string()));
        Self::new(
            format!("{resource} not found"),
            ErrorCategory::NotFound,
            404,
            details,
            context,
        )
    }

    pub fn rate_limit(retry_after: Option<u64>, context: ErrorContext) -> Self {
        let mut details = Map::new();
        if let Some(secs) = retry_after {
            details.insert("retry_after".to_string(), Value::from(secs));
        }
        Self::new(
            "Too many requests. Please wait before trying again.",
            ErrorCategory::RateLimit,
            429,
            details,
            context,
        )
    }

    pub fn cancelled(context: ErrorContext) -> Self {
        Self::new(
            format!("{context} was cancelled"),
            ErrorCategory::Cancelled,
            0,
            Map::new(),
            context,
        )
    }

    /// Build from a structured backend error body
    pub fn from_api_body(body: ApiErrorBody, http_status: u16, context: ErrorContext) -> Self {
        let status_code = body.status_code.unwrap_or(http_status);
        let details = match body.details {
            Some(Value::Object(map)) => map,
            Some(Value::Null) | None => Map::new(),
            Some(other) => {
                let mut map = Map::new();
                map.insert("details".to_string(), other);
                map
            }
        };
        Self::new(body.message, body.error_code, status_code, details, context)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }

    /// Sentence safe to show to end users. Raw messages never leak here,
    /// except that validation failures name what to fix.
    pub fn user_message(&self) -> String {
        match self.category {
            ErrorCategory::Validation => format!("Please check your input: {}", self.message),
            other => other.user_message().to_string(),
        }
    }

    /// Text for the "technical details" disclosure
    pub fn technical_details(&self) -> String {
        let mut out = format!(
            "{} (status {}) in {} at {}: {}",
            self.category,
            self.status_code,
            self.context,
            self.context.timestamp().to_rfc3339(),
            self.message
        );
        if !self.details.is_empty() {
            out.push_str(&format!(" {}", Value::Object(self.details.clone())));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> ErrorContext {
        ErrorContext::new("DataService", "runAIAnalysis")
    }

    #[test]
    fn test_constructors_set_category_and_status() {
        assert_eq!(
            DashboardError::validation("bad", Some("email"), ctx()).status_code(),
            400
        );
        assert_eq!(
            DashboardError::authentication("nope", ctx()).category(),
            ErrorCategory::Auth
        );
        assert_eq!(DashboardError::network("down", ctx()).status_code(), 0);

        let not_found = DashboardError::not_found("Dashboard state", ctx());
        assert_eq!(not_found.message(), "Dashboard state not found");
        assert_eq!(not_found.details()["resource"], "Dashboard state");

        let limited = DashboardError::rate_limit(Some(30), ctx());
        assert_eq!(limited.details()["retry_after"], 30);
        assert!(limited.is_retryable());
    }

    #[test]
    fn test_from_api_body_prefers_body_status() {
        let body = ApiErrorBody {
            error: true,
            message: "Model overloaded".to_string(),
            error_code: ErrorCategory::AiAnalysis,
            details: Some(json!({"analysis_type": "cash_flow"})),
            timestamp: None,
            status_code: Some(502),
        };

        let error = DashboardError::from_api_body(body, 500, ctx());
        assert_eq!(error.category(), ErrorCategory::AiAnalysis);
        assert_eq!(error.status_code(), 502);
        assert_eq!(error.details()["analysis_type"], "cash_flow");
    }

    #[test]
    fn test_non_object_details_are_wrapped() {
        let body = ApiErrorBody {
            error: true,
            message: "x".to_string(),
            error_code: ErrorCategory::Database,
            details: Some(json!("disk full")),
            timestamp: None,
            status_code: None,
        };

        let error = DashboardError::from_api_body(body, 500, ctx());
        assert_eq!(error.status_code(), 500);
        assert_eq!(error.details()["details"], "disk full");
    }

    #[test]
    fn test_user_message_hides_raw_message() {
        let error = DashboardError::network("connection reset by peer at 10.0.0.4", ctx());
        assert!(!error.user_message().contains("10.0.0.4"));
        assert!(error.technical_details().contains("10.0.0.4"));

        let validation = DashboardError::validation("message is empty", None, ctx());
        assert_eq!(
            validation.user_message(),
            "Please check your input: message is empty"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(DashboardError::authentication("expired", ctx())).unwrap();
        assert_eq!(value["error_code"], "AUTH_ERROR");
        assert_eq!(value["status_code"], 401);
        assert_eq!(value["context"]["action"], "runAIAnalysis");
    }
}
