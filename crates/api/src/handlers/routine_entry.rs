//! Handlers for the `/routine-entries` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::types::DbId;
use rollcall_db::models::routine_entry::{RoutineEntryDetail, UpdateRoutineEntry};
use rollcall_db::repositories::{RoutineEntryRepo, SoftDelete};

use crate::engine::schedule;
use crate::error::AppResult;
use crate::handlers::{owned_entry, owned_routine};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// PUT /api/v1/routine-entries/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoutineEntry>,
) -> AppResult<Json<RoutineEntryDetail>> {
    let current = owned_entry(&state.pool, id, auth.user_id).await?;
    let routine = owned_routine(&state.pool, current.routine_id, auth.user_id).await?;
    let entry = schedule::update_entry(&state.pool, &routine, &current, auth.user_id, &input).await?;
    Ok(Json(entry))
}

/// DELETE /api/v1/routine-entries/{id}
///
/// Records already generated from the entry stay; they simply lose the
/// back-reference if the entry is later purged.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_entry(&state.pool, id, auth.user_id).await?;
    RoutineEntryRepo::soft_delete(&state.pool, id).await?;
    tracing::info!(entry_id = id, "Deleted routine entry");
    Ok(StatusCode::NO_CONTENT)
}
