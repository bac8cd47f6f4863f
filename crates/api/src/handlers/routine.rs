//! Handlers for the `/routines` resource, including class generation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::models::routine::{CreateRoutine, Routine, RoutineWithEntries, UpdateRoutine};
use rollcall_db::models::routine_entry::{
    BulkCreateRoutineEntries, CreateRoutineEntry, RoutineEntryDetail,
};
use rollcall_db::repositories::{RoutineEntryRepo, RoutineRepo, SoftDelete};
use serde::{Deserialize, Serialize};

use crate::engine::generation::{self, GenerationRun};
use crate::engine::{schedule, today};
use crate::error::AppResult;
use crate::handlers::{owned_routine, owned_semester};
use crate::middleware::auth::AuthUser;
use crate::query::SemesterFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /routines/{id}/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct BulkCreatedEntries {
    pub message: String,
    pub entries: Vec<RoutineEntryDetail>,
}

/// POST /api/v1/routines
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateRoutine>,
) -> AppResult<(StatusCode, Json<Routine>)> {
    owned_semester(&state.pool, input.semester_id, auth.user_id).await?;
    let routine = RoutineRepo::create(&state.pool, &input).await?;
    tracing::info!(routine_id = routine.id, semester_id = routine.semester_id, "Created routine");
    Ok((StatusCode::CREATED, Json(routine)))
}

/// GET /api/v1/routines
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<SemesterFilterParams>,
) -> AppResult<Json<Vec<Routine>>> {
    let routines = RoutineRepo::list_for_user(&state.pool, auth.user_id, params.semester_id).await?;
    Ok(Json(routines))
}

/// GET /api/v1/routines/{id}
///
/// The routine with its entries grouped Monday through Sunday.
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<RoutineWithEntries>> {
    let routine = owned_routine(&state.pool, id, auth.user_id).await?;
    let entries = RoutineEntryRepo::list_details_by_routine(&state.pool, id).await?;
    Ok(Json(RoutineWithEntries::group(routine, entries)))
}

/// PUT /api/v1/routines/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoutine>,
) -> AppResult<Json<Routine>> {
    owned_routine(&state.pool, id, auth.user_id).await?;
    let routine = RoutineRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Routine",
            id,
        })?;
    Ok(Json(routine))
}

/// DELETE /api/v1/routines/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_routine(&state.pool, id, auth.user_id).await?;
    RoutineRepo::soft_delete(&state.pool, id).await?;
    tracing::info!(routine_id = id, "Deleted routine");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// POST /api/v1/routines/{id}/entries
pub async fn create_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CreateRoutineEntry>,
) -> AppResult<(StatusCode, Json<RoutineEntryDetail>)> {
    let routine = owned_routine(&state.pool, id, auth.user_id).await?;
    let entry = schedule::create_entry(&state.pool, &routine, auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST /api/v1/routines/{id}/entries/bulk
pub async fn bulk_create_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<BulkCreateRoutineEntries>,
) -> AppResult<(StatusCode, Json<BulkCreatedEntries>)> {
    let routine = owned_routine(&state.pool, id, auth.user_id).await?;
    let entries =
        schedule::create_entries(&state.pool, &routine, auth.user_id, &input.entries).await?;
    Ok((
        StatusCode::CREATED,
        Json(BulkCreatedEntries {
            message: format!("Created {} routine entries.", entries.len()),
            entries,
        }),
    ))
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// POST /api/v1/routines/{id}/generate
pub async fn generate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<GenerateRange>,
) -> AppResult<Json<DataResponse<GenerationRun>>> {
    let routine = owned_routine(&state.pool, id, auth.user_id).await?;
    let run = generation::generate_for_range(
        &state.pool,
        &routine,
        input.start_date,
        input.end_date,
        state.config.max_generation_days,
    )
    .await?;
    Ok(Json(DataResponse { data: run }))
}

/// POST /api/v1/routines/{id}/generate-today
pub async fn generate_today(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<GenerationRun>>> {
    let routine = owned_routine(&state.pool, id, auth.user_id).await?;
    let run = generation::generate_for_date(&state.pool, &routine, today()).await?;
    Ok(Json(DataResponse { data: run }))
}
