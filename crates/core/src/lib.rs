pub mod constants;
pub mod error;
pub mod models;

pub use error::{
    classify, ApiErrorBody, DashboardError, ErrorCategory, ErrorContext, RawFailure, Result,
    Severity,
};

// Re-export commonly used models for convenience
pub use models::{
    dashboard::{
        AlertKind, Analytics, BusinessAlert, BusinessInfo, BusinessRecommendation,
        CustomerMetrics, DashboardData, FinancialMetrics, GrowthMetrics, OperationalMetrics,
        Reputation, SocialMedia,
    },
    export::ExportedFile,
    persistence::{InteractionEvent, PersistenceState, StatePatch},
};
