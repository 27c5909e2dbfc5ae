use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a failure happened. Built at the call site nearest the failure and
/// never mutated afterwards; a rethrow gets a fresh context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    component: String,
    action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    timestamp: DateTime<Utc>,
}

impl ErrorContext {
    pub fn new(component: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            action: action.into(),
            user_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn for_user(
        component: impl Into<String>,
        action: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::new(component, action)
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.component, self.action)
    }
}
