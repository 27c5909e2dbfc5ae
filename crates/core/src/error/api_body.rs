use super::ErrorCategory;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned by the upstream backend:
/// `{ error, message, error_code, details?, timestamp, status_code? }`.
///
/// `error_code` is required for a body to count as structured; every other
/// field is optional so partially-formed bodies still classify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    pub error_code: ErrorCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ApiErrorBody {
    /// Parse a response body, returning `None` for anything that is not a
    /// structured error (HTML error pages, empty bodies, plain text).
    pub fn parse(body: &str) -> Option<Self> {
        let trimmed = body.trim();
        if !trimmed.starts_with('{') {
            return None;
        }
        serde_json::from_str(trimmed).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_body() {
        let body = r#"{
            "error": true,
            "message": "Please log in",
            "error_code": "AUTH_ERROR",
            "details": {},
            "timestamp": "2024-05-01T10:00:00"
        }"#;

        let parsed = ApiErrorBody::parse(body).unwrap();
        assert!(parsed.error);
        assert_eq!(parsed.error_code, ErrorCategory::Auth);
        assert_eq!(parsed.status_code, None);
    }

    #[test]
    fn test_unknown_code_does_not_fail_parsing() {
        let parsed =
            ApiErrorBody::parse(r#"{"error": true, "message": "m", "error_code": "HTTP_ERROR", "status_code": 405}"#)
                .unwrap();
        assert_eq!(parsed.error_code, ErrorCategory::Unknown);
        assert_eq!(parsed.status_code, Some(405));
    }

    #[test]
    fn test_unstructured_bodies_are_rejected() {
        assert!(ApiErrorBody::parse("").is_none());
        assert!(ApiErrorBody::parse("<html>Bad Gateway</html>").is_none());
        assert!(ApiErrorBody::parse(r#"{"error": "Failed to fetch business data"}"#).is_none());
        assert!(ApiErrorBody::parse("{not json").is_none());
    }
}
