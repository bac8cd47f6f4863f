//! Read-only analytics endpoints hanging off `/semesters/{id}` and
//! `/subjects/{id}`.

use axum::extract::{Path, Query, State};
use axum::Json;
use rollcall_core::alerts::Alert;
use rollcall_core::analytics::{SemesterAnalytics, SubjectAnalytics};
use rollcall_core::trends::{Granularity, TrendPoint, DEFAULT_TREND_MONTHS, DEFAULT_TREND_WEEKS};
use rollcall_core::types::DbId;
use rollcall_db::models::attendance_record::HistoryItem;
use rollcall_db::repositories::AttendanceRecordRepo;
use serde::Serialize;

use crate::engine::generation::{self, GenerationRun};
use crate::engine::{analytics, today};
use crate::error::AppResult;
use crate::handlers::{owned_semester, owned_subject, owned_subject_with_semester};
use crate::middleware::auth::AuthUser;
use crate::query::{DateBoundsParams, MonthlyTrendParams, WeeklyTrendParams};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub semester_id: DbId,
    pub semester_name: String,
    pub alert_count: usize,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Serialize)]
pub struct WeeklyTrendsResponse {
    pub subject_id: DbId,
    pub subject_name: String,
    pub weeks_count: u32,
    pub trends: Vec<TrendPoint>,
}

#[derive(Debug, Serialize)]
pub struct MonthlyTrendsResponse {
    pub subject_id: DbId,
    pub subject_name: String,
    pub months_count: u32,
    pub trends: Vec<TrendPoint>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub subject_id: DbId,
    pub subject_name: String,
    pub count: usize,
    pub history: Vec<HistoryItem>,
}

// ---------------------------------------------------------------------------
// Semester scope
// ---------------------------------------------------------------------------

/// GET /api/v1/semesters/{id}/analytics
pub async fn semester(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<SemesterAnalytics>> {
    let semester = owned_semester(&state.pool, id, auth.user_id).await?;
    let result = analytics::semester_analytics(&state.pool, &semester, today()).await?;
    Ok(Json(result))
}

/// GET /api/v1/semesters/{id}/alerts
pub async fn alerts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<AlertsResponse>> {
    let semester = owned_semester(&state.pool, id, auth.user_id).await?;
    let alerts = analytics::alerts(&state.pool, &semester, today()).await?;
    Ok(Json(AlertsResponse {
        semester_id: semester.id,
        semester_name: semester.name,
        alert_count: alerts.len(),
        alerts,
    }))
}

/// POST /api/v1/semesters/{id}/generate-today
///
/// Outside the semester's range, or without a routine, nothing is created.
pub async fn generate_today(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<GenerationRun>>> {
    let semester = owned_semester(&state.pool, id, auth.user_id).await?;
    let run = generation::generate_daily_for_semester(&state.pool, &semester, today()).await?;
    Ok(Json(DataResponse { data: run }))
}

// ---------------------------------------------------------------------------
// Subject scope
// ---------------------------------------------------------------------------

/// GET /api/v1/subjects/{id}/analytics
pub async fn subject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<SubjectAnalytics>> {
    let (subject, semester) = owned_subject_with_semester(&state.pool, id, auth.user_id).await?;
    let result = analytics::subject_analytics(&state.pool, &subject, &semester, today()).await?;
    Ok(Json(result))
}

/// GET /api/v1/subjects/{id}/trends/weekly
pub async fn weekly_trends(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<WeeklyTrendParams>,
) -> AppResult<Json<WeeklyTrendsResponse>> {
    let subject = owned_subject(&state.pool, id, auth.user_id).await?;
    let weeks = params.weeks.unwrap_or(DEFAULT_TREND_WEEKS);
    let trends =
        analytics::trends(&state.pool, &subject, Granularity::Week, weeks, today()).await?;
    Ok(Json(WeeklyTrendsResponse {
        subject_id: subject.id,
        subject_name: subject.name,
        weeks_count: weeks,
        trends,
    }))
}

/// GET /api/v1/subjects/{id}/trends/monthly
pub async fn monthly_trends(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<MonthlyTrendParams>,
) -> AppResult<Json<MonthlyTrendsResponse>> {
    let subject = owned_subject(&state.pool, id, auth.user_id).await?;
    let months = params.months.unwrap_or(DEFAULT_TREND_MONTHS);
    let trends =
        analytics::trends(&state.pool, &subject, Granularity::Month, months, today()).await?;
    Ok(Json(MonthlyTrendsResponse {
        subject_id: subject.id,
        subject_name: subject.name,
        months_count: months,
        trends,
    }))
}

/// GET /api/v1/subjects/{id}/history
pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<DateBoundsParams>,
) -> AppResult<Json<HistoryResponse>> {
    let subject = owned_subject(&state.pool, id, auth.user_id).await?;
    let history =
        AttendanceRecordRepo::history(&state.pool, subject.id, params.start_date, params.end_date)
            .await?;
    Ok(Json(HistoryResponse {
        subject_id: subject.id,
        subject_name: subject.name,
        count: history.len(),
        history,
    }))
}
