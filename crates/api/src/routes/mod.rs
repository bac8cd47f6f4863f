pub mod attendance;
pub mod dashboard;
pub mod health;
pub mod routine;
pub mod routine_entry;
pub mod semester;
pub mod subject;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree. Every route requires a bearer token.
///
/// ```text
/// /semesters                         list, create
/// /semesters/current                 current semester
/// /semesters/{id}                    get, update, delete
/// /semesters/{id}/restore            restore (POST)
/// /semesters/{id}/set-current        make current (POST)
/// /semesters/{id}/analytics          semester analytics
/// /semesters/{id}/alerts             shortage and borderline alerts
/// /semesters/{id}/generate-today     daily generation (POST)
///
/// /subjects                          list (?semester_id), create
/// /subjects/{id}                     get, update, delete
/// /subjects/{id}/restore             restore (POST)
/// /subjects/{id}/analytics           subject analytics
/// /subjects/{id}/trends/weekly       weekly trend (?weeks)
/// /subjects/{id}/trends/monthly      monthly trend (?months)
/// /subjects/{id}/history             timeline (?start_date, ?end_date)
///
/// /routines                          list (?semester_id), create
/// /routines/{id}                     get with entries, update, delete
/// /routines/{id}/entries             add entry (POST)
/// /routines/{id}/entries/bulk        add entries atomically (POST)
/// /routines/{id}/generate            generate a date range (POST)
/// /routines/{id}/generate-today      generate today (POST)
///
/// /routine-entries/{id}              update, delete
///
/// /attendance                        list (filters), create
/// /attendance/today                  today's records (?semester_id)
/// /attendance/calendar               per-day totals (?year, ?month, ?semester_id)
/// /attendance/bulk-update            set status on many records (POST)
/// /attendance/mark-day               set status on a whole day (POST)
/// /attendance/adhoc                  extra class (POST)
/// /attendance/generate               generate a semester range (POST)
/// /attendance/{id}                   get, update, delete
/// /attendance/{id}/restore           restore (POST)
///
/// /dashboard                         landing view (?semester_id)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/semesters", semester::router())
        .nest("/subjects", subject::router())
        .nest("/routines", routine::router())
        .nest("/routine-entries", routine_entry::router())
        .nest("/attendance", attendance::router())
        .nest("/dashboard", dashboard::router())
}
