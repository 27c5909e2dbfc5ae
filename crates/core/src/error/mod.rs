mod api_body;
mod classify;
mod context;
mod typed;

pub use api_body::ApiErrorBody;
pub use classify::{classify, RawFailure};
pub use context::ErrorContext;
pub use typed::DashboardError;

use serde::{Deserialize, Serialize};

/// Closed set of failure kinds. Drives retry eligibility, severity and the
/// sentence shown to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCategory {
    Validation,
    Auth,
    Authz,
    Network,
    NotFound,
    RateLimit,
    AiAnalysis,
    ExternalService,
    Database,
    Component,
    Unhandled,
    Unknown,
    Cancelled,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 13] = [
        ErrorCategory::Validation,
        ErrorCategory::Auth,
        ErrorCategory::Authz,
        ErrorCategory::Network,
        ErrorCategory::NotFound,
        ErrorCategory::RateLimit,
        ErrorCategory::AiAnalysis,
        ErrorCategory::ExternalService,
        ErrorCategory::Database,
        ErrorCategory::Component,
        ErrorCategory::Unhandled,
        ErrorCategory::Unknown,
        ErrorCategory::Cancelled,
    ];

    /// Wire code used by the backend in `error_code`
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "VALIDATION_ERROR",
            ErrorCategory::Auth => "AUTH_ERROR",
            ErrorCategory::Authz => "AUTHZ_ERROR",
            ErrorCategory::Network => "NETWORK_ERROR",
            ErrorCategory::NotFound => "NOT_FOUND",
            ErrorCategory::RateLimit => "RATE_LIMIT_ERROR",
            ErrorCategory::AiAnalysis => "AI_ANALYSIS_ERROR",
            ErrorCategory::ExternalService => "EXTERNAL_SERVICE_ERROR",
            ErrorCategory::Database => "DATABASE_ERROR",
            ErrorCategory::Component => "COMPONENT_ERROR",
            ErrorCategory::Unhandled => "UNHANDLED_ERROR",
            ErrorCategory::Unknown => "UNKNOWN_ERROR",
            ErrorCategory::Cancelled => "CANCELLED",
        }
    }

    /// Parse a wire code. Never fails: anything unrecognised is `Unknown`.
    pub fn from_code(code: &str) -> Self {
        let normalized = code.trim().to_ascii_uppercase();
        let name = normalized.strip_suffix("_ERROR").unwrap_or(&normalized);

        match name {
            "VALIDATION" => ErrorCategory::Validation,
            "AUTH" => ErrorCategory::Auth,
            "AUTHZ" => ErrorCategory::Authz,
            "NETWORK" => ErrorCategory::Network,
            "NOT_FOUND" => ErrorCategory::NotFound,
            "RATE_LIMIT" => ErrorCategory::RateLimit,
            "AI_ANALYSIS" | "AI_SERVICE" => ErrorCategory::AiAnalysis,
            "EXTERNAL_SERVICE" => ErrorCategory::ExternalService,
            "DATABASE" => ErrorCategory::Database,
            "COMPONENT" => ErrorCategory::Component,
            "UNHANDLED" | "UNHANDLED_PROMISE_REJECTION" => ErrorCategory::Unhandled,
            "CANCELLED" => ErrorCategory::Cancelled,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether a failure of this kind may succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ErrorCategory::Validation
                | ErrorCategory::Auth
                | ErrorCategory::Authz
                | ErrorCategory::Cancelled
        )
    }

    pub fn severity(&self) -> Severity {
        match self {
            ErrorCategory::Auth | ErrorCategory::Authz => Severity::High,
            ErrorCategory::Network | ErrorCategory::AiAnalysis => Severity::Medium,
            ErrorCategory::Validation => Severity::Low,
            _ => Severity::Medium,
        }
    }

    /// Fixed sentence shown to end users for this category
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "Please check your input.",
            ErrorCategory::Auth => "Please log in to continue.",
            ErrorCategory::Authz => "You don't have permission to perform this action.",
            ErrorCategory::NotFound => "The requested information could not be found.",
            ErrorCategory::Network => {
                "Network connection issue. Please check your internet connection."
            }
            ErrorCategory::RateLimit => {
                "Too many requests. Please wait a moment before trying again."
            }
            ErrorCategory::AiAnalysis => {
                "AI analysis is temporarily unavailable. Please try again later."
            }
            ErrorCategory::ExternalService => {
                "A service is temporarily unavailable. Please try again in a few minutes."
            }
            ErrorCategory::Database => "There was a problem saving your data. Please try again.",
            ErrorCategory::Component => {
                "Part of the dashboard failed to load. Reloading the page usually fixes this."
            }
            ErrorCategory::Cancelled => "The request was cancelled.",
            ErrorCategory::Unhandled | ErrorCategory::Unknown => {
                "Something went wrong. Please try again or contact support if the problem persists."
            }
        }
    }
}

impl From<String> for ErrorCategory {
    fn from(code: String) -> Self {
        ErrorCategory::from_code(&code)
    }
}

impl From<ErrorCategory> for String {
    fn from(category: ErrorCategory) -> Self {
        category.code().to_string()
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Severity shown in the error monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DashboardError>;
