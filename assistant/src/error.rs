use rota_core::ParseError;

/// Pipeline failures that escape a turn. Clarifications are not errors and
/// never appear here; they flow through the outcome type instead.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Caller input that cannot be worked with (empty message, bad override,
    /// missing metric parameter, rejected ad-hoc template).
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// A metric template failed to compile. Raised at registry load, so a
    /// bad template stops the process at startup rather than mid-query.
    #[error("template '{name}' is invalid: {reason}")]
    Template { name: String, reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Persisted thread state that no longer deserializes, or state that
    /// fails to serialize on save.
    #[error("thread state error: {0}")]
    State(String),

    /// The fail-closed guard: a data-shaped result reported no reads.
    #[error("integrity violation: {0}")]
    Integrity(String),
}

impl AssistantError {
    pub fn validation(message: impl Into<String>) -> Self {
        AssistantError::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        AssistantError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl From<ParseError> for AssistantError {
    fn from(err: ParseError) -> Self {
        AssistantError::validation(err.to_string())
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        AssistantError::State(err.to_string())
    }
}
