//! Handlers for the `/subjects` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::error::CoreError;
use rollcall_core::schedule::{validate_credit, validate_min_percentage};
use rollcall_core::types::DbId;
use rollcall_db::models::subject::{CreateSubject, Subject, UpdateSubject};
use rollcall_db::repositories::{SoftDelete, SubjectRepo};

use crate::error::AppResult;
use crate::handlers::{owned_semester, owned_subject};
use crate::middleware::auth::AuthUser;
use crate::query::SemesterFilterParams;
use crate::state::AppState;

/// POST /api/v1/subjects
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateSubject>,
) -> AppResult<(StatusCode, Json<Subject>)> {
    owned_semester(&state.pool, input.semester_id, auth.user_id).await?;
    validate_credit(input.credit)?;
    if let Some(pct) = input.min_attendance_percentage {
        validate_min_percentage(pct)?;
    }

    let subject = SubjectRepo::create(&state.pool, &input).await?;
    tracing::info!(subject_id = subject.id, semester_id = subject.semester_id, "Created subject");
    Ok((StatusCode::CREATED, Json(subject)))
}

/// GET /api/v1/subjects
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<SemesterFilterParams>,
) -> AppResult<Json<Vec<Subject>>> {
    let subjects = SubjectRepo::list_for_user(&state.pool, auth.user_id, params.semester_id).await?;
    Ok(Json(subjects))
}

/// GET /api/v1/subjects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Subject>> {
    Ok(Json(owned_subject(&state.pool, id, auth.user_id).await?))
}

/// PUT /api/v1/subjects/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSubject>,
) -> AppResult<Json<Subject>> {
    owned_subject(&state.pool, id, auth.user_id).await?;
    if let Some(credit) = input.credit {
        validate_credit(credit)?;
    }
    if let Some(pct) = input.min_attendance_percentage {
        validate_min_percentage(pct)?;
    }

    let subject = SubjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Subject",
            id,
        })?;
    Ok(Json(subject))
}

/// DELETE /api/v1/subjects/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_subject(&state.pool, id, auth.user_id).await?;
    SubjectRepo::soft_delete(&state.pool, id).await?;
    tracing::info!(subject_id = id, "Deleted subject");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/subjects/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Subject>> {
    let found = SubjectRepo::find_for_user_include_deleted(&state.pool, id, auth.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Subject",
            id,
        })?;
    if found.deleted_at.is_some() {
        SubjectRepo::restore(&state.pool, id).await?;
    }
    Ok(Json(owned_subject(&state.pool, id, auth.user_id).await?))
}
