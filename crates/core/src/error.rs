use crate::types::DbId;

/// Domain failures. The HTTP layer maps each variant to a status code.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Missing, tombstoned or owned by another user; callers cannot tell
    /// these apart.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A rule spanning several inputs or rows, such as an occupied slot.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Validation failure attributable to a single input field.
    #[error("Invalid {field}: {message}")]
    InvalidField { field: &'static str, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl CoreError {
    /// Shorthand for a field-scoped validation error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }
}
