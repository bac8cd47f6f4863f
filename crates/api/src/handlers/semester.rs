//! Handlers for the `/semesters` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::error::CoreError;
use rollcall_core::schedule::validate_semester_dates;
use rollcall_core::types::DbId;
use rollcall_db::models::semester::{CreateSemester, Semester, UpdateSemester};
use rollcall_db::repositories::{SemesterRepo, SoftDelete};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::owned_semester;
use crate::middleware::auth::AuthUser;
use crate::query::IncludeDeletedParams;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SetCurrentResponse {
    pub message: String,
    pub semester: Semester,
}

/// POST /api/v1/semesters
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateSemester>,
) -> AppResult<(StatusCode, Json<Semester>)> {
    validate_semester_dates(input.start_date, input.end_date)?;
    let semester = SemesterRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(user_id = auth.user_id, semester_id = semester.id, "Created semester");
    Ok((StatusCode::CREATED, Json(semester)))
}

/// GET /api/v1/semesters
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<IncludeDeletedParams>,
) -> AppResult<Json<Vec<Semester>>> {
    let semesters =
        SemesterRepo::list_for_user(&state.pool, auth.user_id, params.include_deleted).await?;
    Ok(Json(semesters))
}

/// GET /api/v1/semesters/current
pub async fn current(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Semester>> {
    let semester = SemesterRepo::current(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No current semester set.".into()))?;
    Ok(Json(semester))
}

/// GET /api/v1/semesters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Semester>> {
    Ok(Json(owned_semester(&state.pool, id, auth.user_id).await?))
}

/// PUT /api/v1/semesters/{id}
///
/// Date checks run against the merged values so a one-sided change cannot
/// invert the range.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSemester>,
) -> AppResult<Json<Semester>> {
    let current = owned_semester(&state.pool, id, auth.user_id).await?;
    validate_semester_dates(
        input.start_date.unwrap_or(current.start_date),
        input.end_date.unwrap_or(current.end_date),
    )?;

    let semester = SemesterRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Semester",
            id,
        })?;
    Ok(Json(semester))
}

/// DELETE /api/v1/semesters/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if SemesterRepo::soft_delete_for_user(&state.pool, id, auth.user_id).await? {
        tracing::info!(user_id = auth.user_id, semester_id = id, "Deleted semester");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound {
            entity: "Semester",
            id,
        }
        .into())
    }
}

/// POST /api/v1/semesters/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Semester>> {
    let found = SemesterRepo::find_for_user_include_deleted(&state.pool, id, auth.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Semester",
            id,
        })?;
    if found.deleted_at.is_some() {
        SemesterRepo::restore(&state.pool, id).await?;
    }
    Ok(Json(owned_semester(&state.pool, id, auth.user_id).await?))
}

/// POST /api/v1/semesters/{id}/set-current
pub async fn set_current(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<SetCurrentResponse>> {
    let semester = SemesterRepo::set_current(&state.pool, auth.user_id, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Semester",
            id,
        })?;
    Ok(Json(SetCurrentResponse {
        message: format!("'{}' is now the current semester.", semester.name),
        semester,
    }))
}
