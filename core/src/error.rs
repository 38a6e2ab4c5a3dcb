use serde::Serialize;
use utoipa::ToSchema;

/// Parse failures for the small textual domain types (weekdays, ISO weeks,
/// scope modes, clock times). These surface as validation errors at the API
/// boundary, never as panics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("'{0}' is not a weekday code (expected MON..SUN)")]
    InvalidWeekday(String),
    #[error("'{0}' is not an ISO week (expected YYYY-Www, e.g. 2025-W43)")]
    InvalidWeek(String),
    #[error("'{0}' is not a scope mode (expected home_only, all_managed or specific)")]
    InvalidScopeMode(String),
    #[error("invalid time window: start {start} must be before end {end}, both within one day")]
    InvalidWindow { start: i32, end: i32 },
    #[error("'{0}' is not a clock time (expected H:MM, optionally with am/pm)")]
    InvalidClockTime(String),
}

/// Structured error response shared by every route. Carries enough context
/// for the calling agent to correct its request without a human reading logs.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Machine-readable error code (e.g. "validation_failed", "internal_error")
    pub error: String,
    /// Human/agent-readable description of what went wrong
    pub message: String,
    /// Which field caused the error (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The value that was received (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<serde_json::Value>,
    /// Request ID for tracing and debugging
    pub request_id: String,
    /// Hint about what the correct usage looks like
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

/// Error codes used across the API
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const NOT_FOUND: &str = "not_found";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const RATE_LIMITED: &str = "rate_limited";
}
