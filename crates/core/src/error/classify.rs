use super::{ApiErrorBody, DashboardError, ErrorCategory, ErrorContext};
use serde_json::{Map, Value};
use thiserror::Error;

/// A failure as observed at the edge, before classification
#[derive(Error, Debug)]
pub enum RawFailure {
    /// A response was received with a non-success status
    #[error("HTTP {status} {status_text}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
        retry_after: Option<u64>,
    },

    /// No response was received
    #[error("{message}")]
    Transport { message: String, timed_out: bool },

    /// A response was received but its body could not be decoded
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error(transparent)]
    Typed(#[from] DashboardError),

    #[error("{0}")]
    Other(String),
}

impl RawFailure {
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("")
                .to_string(),
            body: body.into(),
            retry_after: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: true,
        }
    }
}

impl From<reqwest::Error> for RawFailure {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return RawFailure::Decode {
                message: error.to_string(),
            };
        }
        match error.status() {
            Some(status) => RawFailure::http(status.as_u16(), ""),
            None => RawFailure::Transport {
                message: error.to_string(),
                timed_out: error.is_timeout(),
            },
        }
    }
}

impl From<serde_json::Error> for RawFailure {
    fn from(error: serde_json::Error) -> Self {
        RawFailure::Decode {
            message: error.to_string(),
        }
    }
}

/// Map any failure to exactly one category.
///
/// Order: already typed, structured backend body, HTTP status range,
/// transport failure (NETWORK), anything else (UNKNOWN).
pub fn classify(raw: RawFailure, context: &ErrorContext) -> DashboardError {
    match raw {
        RawFailure::Typed(error) => error,
        RawFailure::Http {
            status,
            status_text,
            body,
            retry_after,
        } => {
            if let Some(api_body) = ApiErrorBody::parse(&body) {
                return DashboardError::from_api_body(api_body, status, context.clone());
            }
            classify_status(status, &status_text, retry_after, context)
        }
        RawFailure::Transport { message, timed_out } => {
            let mut details = Map::new();
            if timed_out {
                details.insert("timeout".to_string(), Value::Bool(true));
            }
            DashboardError::new(message, ErrorCategory::Network, 0, details, context.clone())
        }
        RawFailure::Decode { message } => DashboardError::new(
            format!("Failed to decode response: {message}"),
            ErrorCategory::Unknown,
            0,
            Map::new(),
            context.clone(),
        ),
        RawFailure::Other(message) => DashboardError::new(
            message,
            ErrorCategory::Unknown,
            0,
            Map::new(),
            context.clone(),
        ),
    }
}

fn classify_status(
    status: u16,
    status_text: &str,
    retry_after: Option<u64>,
    context: &ErrorContext,
) -> DashboardError {
    let category = match status {
        401 => ErrorCategory::Auth,
        403 => ErrorCategory::Authz,
        404 => ErrorCategory::NotFound,
        429 => ErrorCategory::RateLimit,
        500..=599 => ErrorCategory::ExternalService,
        _ => ErrorCategory::Unknown,
    };

    let mut details = Map::new();
    if let Some(secs) = retry_after {
        details.insert("retry_after".to_string(), Value::from(secs));
    }

    DashboardError::new(
        format!("HTTP {status}: {status_text}").trim_end().to_string(),
        category,
        status,
        details,
        context.clone(),
    )
}
