//! Handlers for the `/attendance` resource.
//!
//! Besides CRUD this covers the bulk mutations (status update, mark-a-day),
//! ad-hoc classes, the daily view and the month calendar.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, Months, NaiveDate};
use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::models::attendance_record::{
    AttendanceFilter, AttendanceRecord, AttendanceRecordDetail, BulkStatusUpdate, CalendarDay,
    CreateAdhocRecord, CreateAttendanceRecord, MarkDay, UpdateAttendanceRecord,
};
use rollcall_db::repositories::{AttendanceRecordRepo, RoutineRepo, SoftDelete};
use serde::{Deserialize, Serialize};

use crate::engine::generation::{self, GenerationRun};
use crate::engine::today;
use crate::error::{AppError, AppResult};
use crate::handlers::{owned_entry, owned_record, owned_semester, owned_subject_with_semester};
use crate::middleware::auth::AuthUser;
use crate::query::{CalendarParams, SemesterFilterParams};
use crate::response::{DataResponse, UpdatedResponse};
use crate::state::AppState;

/// Body of `POST /attendance/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateForSemester {
    pub semester_id: DbId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub count: usize,
    pub records: Vec<AttendanceRecordDetail>,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<CalendarDay>,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/attendance
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<AttendanceFilter>,
) -> AppResult<Json<Vec<AttendanceRecordDetail>>> {
    let records = AttendanceRecordRepo::list(&state.pool, auth.user_id, &filter).await?;
    Ok(Json(records))
}

/// POST /api/v1/attendance
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateAttendanceRecord>,
) -> AppResult<(StatusCode, Json<AttendanceRecord>)> {
    let (subject, semester) =
        owned_subject_with_semester(&state.pool, input.subject_id, auth.user_id).await?;
    if let Some(entry_id) = input.routine_entry_id {
        let entry = owned_entry(&state.pool, entry_id, auth.user_id).await?;
        if entry.subject_id != subject.id {
            return Err(CoreError::invalid(
                "routine_entry_id",
                "Routine entry does not belong to this subject.",
            )
            .into());
        }
    }

    let record = generation::create_record(&state.pool, &subject, &semester, input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/attendance/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<AttendanceRecord>> {
    Ok(Json(owned_record(&state.pool, id, auth.user_id).await?))
}

/// PUT /api/v1/attendance/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAttendanceRecord>,
) -> AppResult<Json<AttendanceRecord>> {
    owned_record(&state.pool, id, auth.user_id).await?;
    let record = AttendanceRecordRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "AttendanceRecord",
            id,
        })?;
    Ok(Json(record))
}

/// DELETE /api/v1/attendance/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_record(&state.pool, id, auth.user_id).await?;
    AttendanceRecordRepo::soft_delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/attendance/{id}/restore
///
/// Fails with 409 if another live record has taken the slot meanwhile.
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<AttendanceRecord>> {
    let found = AttendanceRecordRepo::find_for_user_include_deleted(&state.pool, id, auth.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "AttendanceRecord",
            id,
        })?;
    if found.deleted_at.is_some() {
        AttendanceRecordRepo::restore(&state.pool, id).await?;
    }
    Ok(Json(owned_record(&state.pool, id, auth.user_id).await?))
}

// ---------------------------------------------------------------------------
// Bulk mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/attendance/bulk-update
///
/// All listed records change or none do.
pub async fn bulk_update(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<BulkStatusUpdate>,
) -> AppResult<Json<UpdatedResponse>> {
    if input.record_ids.is_empty() {
        return Err(CoreError::invalid("record_ids", "At least one record id is required.").into());
    }

    let updated = AttendanceRecordRepo::bulk_update_status(
        &state.pool,
        auth.user_id,
        &input.record_ids,
        input.status,
    )
    .await?
    .ok_or_else(|| {
        CoreError::invalid("record_ids", "One or more records were not found.")
    })?;

    tracing::info!(user_id = auth.user_id, updated, status = %input.status, "Bulk updated attendance");
    Ok(Json(UpdatedResponse { updated }))
}

/// POST /api/v1/attendance/mark-day
///
/// Marking a day `cancelled` also flags its records as a holiday.
pub async fn mark_day(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<MarkDay>,
) -> AppResult<Json<UpdatedResponse>> {
    let semester = owned_semester(&state.pool, input.semester_id, auth.user_id).await?;
    let updated =
        AttendanceRecordRepo::mark_day(&state.pool, semester.id, input.date, input.status).await?;

    tracing::info!(semester_id = semester.id, date = %input.date, status = %input.status, updated, "Marked day");
    Ok(Json(UpdatedResponse { updated }))
}

/// POST /api/v1/attendance/adhoc
pub async fn adhoc(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateAdhocRecord>,
) -> AppResult<(StatusCode, Json<AttendanceRecord>)> {
    let (subject, semester) =
        owned_subject_with_semester(&state.pool, input.subject_id, auth.user_id).await?;
    let record = generation::create_adhoc(&state.pool, &subject, &semester, input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// GET /api/v1/attendance/today
///
/// With `?semester_id=`, today's classes are generated from the semester's
/// routine before listing.
pub async fn today_records(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<SemesterFilterParams>,
) -> AppResult<Json<TodayResponse>> {
    let date = today();
    if let Some(semester_id) = params.semester_id {
        let semester = owned_semester(&state.pool, semester_id, auth.user_id).await?;
        generation::generate_daily_for_semester(&state.pool, &semester, date).await?;
    }

    let filter = AttendanceFilter {
        semester_id: params.semester_id,
        date: Some(date),
        ..Default::default()
    };
    let records = AttendanceRecordRepo::list(&state.pool, auth.user_id, &filter).await?;
    Ok(Json(TodayResponse {
        date,
        count: records.len(),
        records,
    }))
}

/// First and last day of a calendar month.
fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CoreError::invalid("month", "Month must be between 1 and 12."))?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| AppError::BadRequest("Date out of range".into()))?;
    Ok((start, end))
}

/// GET /api/v1/attendance/calendar
pub async fn calendar(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<CalendarParams>,
) -> AppResult<Json<CalendarResponse>> {
    let now = today();
    let year = params.year.unwrap_or(now.year());
    let month = params.month.unwrap_or(now.month());
    let (start_date, end_date) = month_bounds(year, month)?;

    let days = AttendanceRecordRepo::calendar(
        &state.pool,
        auth.user_id,
        start_date,
        end_date,
        params.semester_id,
    )
    .await?;
    Ok(Json(CalendarResponse {
        year,
        month,
        start_date,
        end_date,
        days,
    }))
}

/// POST /api/v1/attendance/generate
pub async fn generate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<GenerateForSemester>,
) -> AppResult<Json<DataResponse<GenerationRun>>> {
    let semester = owned_semester(&state.pool, input.semester_id, auth.user_id).await?;
    let routine = RoutineRepo::find_by_semester(&state.pool, semester.id)
        .await?
        .ok_or_else(|| AppError::BadRequest("No routine found for this semester.".into()))?;

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

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn month_bounds_cover_whole_month() {
        let (start, end) = month_bounds(2024, 2).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (_, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn month_thirteen_is_rejected() {
        assert_matches!(
            month_bounds(2025, 13),
            Err(AppError::Core(CoreError::InvalidField { field: "month", .. }))
        );
    }
}
