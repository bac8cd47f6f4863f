//! Aggregated landing view for a semester.

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use rollcall_core::alerts::{build_alerts, Alert};
use rollcall_core::analytics::{SemesterOverview, SemesterSummary, SubjectAnalytics};
use rollcall_db::models::attendance_record::{AttendanceFilter, AttendanceRecordDetail};
use rollcall_db::models::semester::Semester;
use rollcall_db::repositories::{AttendanceRecordRepo, SemesterRepo};
use serde::Serialize;

use crate::engine::{analytics, today};
use crate::error::AppResult;
use crate::handlers::owned_semester;
use crate::middleware::auth::AuthUser;
use crate::query::SemesterFilterParams;
use crate::state::AppState;

/// Alerts shown on the dashboard, most severe first.
const DASHBOARD_ALERT_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
pub struct TodayClasses {
    pub date: NaiveDate,
    pub count: usize,
    pub classes: Vec<AttendanceRecordDetail>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DashboardResponse {
    Empty {
        has_data: bool,
        message: &'static str,
    },
    Semester {
        has_data: bool,
        semester: SemesterSummary,
        overview: SemesterOverview,
        subjects: Vec<SubjectAnalytics>,
        alerts: Vec<Alert>,
        today: TodayClasses,
    },
}

/// The explicitly requested semester, else the current one, else the most
/// recently started one.
async fn pick_semester(
    state: &AppState,
    auth: AuthUser,
    requested: SemesterFilterParams,
) -> AppResult<Option<Semester>> {
    if let Some(id) = requested.semester_id {
        return owned_semester(&state.pool, id, auth.user_id).await.map(Some);
    }
    if let Some(current) = SemesterRepo::current(&state.pool, auth.user_id).await? {
        return Ok(Some(current));
    }
    let all = SemesterRepo::list_for_user(&state.pool, auth.user_id, false).await?;
    Ok(all.into_iter().next())
}

/// GET /api/v1/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<SemesterFilterParams>,
) -> AppResult<Json<DashboardResponse>> {
    let Some(semester) = pick_semester(&state, auth, params).await? else {
        return Ok(Json(DashboardResponse::Empty {
            has_data: false,
            message: "No semesters found. Please create a semester first.",
        }));
    };

    let date = today();
    let summary = analytics::semester_analytics(&state.pool, &semester, date).await?;
    let mut alerts = build_alerts(&summary.subjects);
    alerts.truncate(DASHBOARD_ALERT_LIMIT);

    let filter = AttendanceFilter {
        semester_id: Some(semester.id),
        date: Some(date),
        ..Default::default()
    };
    let classes = AttendanceRecordRepo::list(&state.pool, auth.user_id, &filter).await?;

    Ok(Json(DashboardResponse::Semester {
        has_data: true,
        semester: summary.semester,
        overview: summary.overview,
        subjects: summary.subjects,
        alerts,
        today: TodayClasses {
            date,
            count: classes.len(),
            classes,
        },
    }))
}
