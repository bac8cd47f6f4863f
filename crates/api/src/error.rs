use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rollcall_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses
/// of the form `{ "error", "code" [, "field"] }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A missing resource that has no id to report (e.g. "no current semester").
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Status, machine-readable code, message and optional offending field.
struct ErrorParts {
    status: StatusCode,
    code: &'static str,
    message: String,
    field: Option<&'static str>,
}

impl ErrorParts {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            field: None,
        }
    }

    fn with_field(mut self, field: Option<&'static str>) -> Self {
        self.field = field;
        self
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let parts = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => ErrorParts::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    ErrorParts::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::InvalidField { field, message } => {
                    ErrorParts::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.clone())
                        .with_field(Some(*field))
                }
                CoreError::Unauthorized(msg) => {
                    ErrorParts::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                ErrorParts::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::NotFound(msg) => {
                ErrorParts::new(StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone())
            }
        };

        let mut body = json!({
            "error": parts.message,
            "code": parts.code,
        });
        if let Some(field) = parts.field {
            body["field"] = json!(field);
        }

        (parts.status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP response.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations (`23505`) on a `uq_*` index map to 409.
/// - Check (`23514`) and foreign-key (`23503`) violations map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    match err {
        sqlx::Error::RowNotFound => {
            ErrorParts::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found")
        }
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                Some("23505") if constraint.starts_with("uq_") => {
                    let (field, message) = describe_unique_violation(constraint);
                    ErrorParts::new(StatusCode::CONFLICT, "CONFLICT", message).with_field(field)
                }
                Some("23514") => ErrorParts::new(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("Value violates check constraint: {constraint}"),
                ),
                Some("23503") => ErrorParts::new(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "Referenced record does not exist",
                ),
                _ => {
                    tracing::error!(error = %db_err, "Database error");
                    ErrorParts::internal()
                }
            }
        }
        other => {
            tracing::error!(error = %other, "Database error");
            ErrorParts::internal()
        }
    }
}

/// Human-readable message and input field for a known unique index.
fn describe_unique_violation(constraint: &str) -> (Option<&'static str>, String) {
    match constraint {
        "uq_semesters_user_name" => (
            Some("name"),
            "A semester with this name already exists.".to_string(),
        ),
        "uq_semesters_user_current" => (
            Some("is_current"),
            "Another semester is already marked as current.".to_string(),
        ),
        "uq_subjects_semester_name" => (
            Some("name"),
            "A subject with this name already exists in this semester.".to_string(),
        ),
        "uq_routines_semester" => (
            Some("semester_id"),
            "This semester already has a routine.".to_string(),
        ),
        "uq_attendance_records_slot" => (
            Some("start_time"),
            "An attendance record already exists for this subject, date and start time."
                .to_string(),
        ),
        "uq_users_username" => (Some("username"), "This username is taken.".to_string()),
        other => (
            None,
            format!("Duplicate value violates unique constraint: {other}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_field_carries_field_name() {
        let (status, body) =
            render(CoreError::invalid("end_date", "End date must be after start date.").into())
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field"], "end_date");
        assert_eq!(body["error"], "End date must be after start date.");
    }

    #[tokio::test]
    async fn plain_validation_has_no_field() {
        let (status, body) = render(CoreError::Validation("nope".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("field").is_none());
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, body) = render(
            CoreError::NotFound {
                entity: "Semester",
                id: 9,
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Semester with id 9 not found");
    }

    #[tokio::test]
    async fn row_not_found_is_404() {
        let (status, _) = render(AppError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unexpected_database_errors_are_sanitized() {
        let (status, body) = render(AppError::Database(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
    }

    #[test]
    fn known_unique_indexes_name_their_field() {
        assert_eq!(describe_unique_violation("uq_subjects_semester_name").0, Some("name"));
        assert_eq!(
            describe_unique_violation("uq_attendance_records_slot").0,
            Some("start_time")
        );
        assert_eq!(describe_unique_violation("uq_other").0, None);
    }
}
