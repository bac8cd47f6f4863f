//! Request handlers.
//!
//! Each submodule serves one resource. Handlers resolve the acting user's
//! rows through the ownership-scoped lookups below, then delegate to the
//! repositories or to [`crate::engine`]. A row owned by someone else is
//! reported exactly like a missing one.

pub mod analytics;
pub mod attendance;
pub mod dashboard;
pub mod routine;
pub mod routine_entry;
pub mod semester;
pub mod subject;

use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::models::attendance_record::AttendanceRecord;
use rollcall_db::models::routine::Routine;
use rollcall_db::models::routine_entry::RoutineEntry;
use rollcall_db::models::semester::Semester;
use rollcall_db::models::subject::Subject;
use rollcall_db::repositories::{
    AttendanceRecordRepo, RoutineEntryRepo, RoutineRepo, SemesterRepo, SubjectRepo,
};
use rollcall_db::DbPool;

use crate::error::{AppError, AppResult};

fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

// ---------------------------------------------------------------------------
// Ownership-scoped lookups
// ---------------------------------------------------------------------------

pub(crate) async fn owned_semester(pool: &DbPool, id: DbId, user_id: DbId) -> AppResult<Semester> {
    SemesterRepo::find_for_user(pool, id, user_id)
        .await?
        .ok_or_else(|| not_found("Semester", id))
}

pub(crate) async fn owned_subject(pool: &DbPool, id: DbId, user_id: DbId) -> AppResult<Subject> {
    SubjectRepo::find_for_user(pool, id, user_id)
        .await?
        .ok_or_else(|| not_found("Subject", id))
}

/// A subject together with the semester that scopes its analytics.
pub(crate) async fn owned_subject_with_semester(
    pool: &DbPool,
    id: DbId,
    user_id: DbId,
) -> AppResult<(Subject, Semester)> {
    let subject = owned_subject(pool, id, user_id).await?;
    let semester = owned_semester(pool, subject.semester_id, user_id).await?;
    Ok((subject, semester))
}

pub(crate) async fn owned_routine(pool: &DbPool, id: DbId, user_id: DbId) -> AppResult<Routine> {
    RoutineRepo::find_for_user(pool, id, user_id)
        .await?
        .ok_or_else(|| not_found("Routine", id))
}

pub(crate) async fn owned_entry(pool: &DbPool, id: DbId, user_id: DbId) -> AppResult<RoutineEntry> {
    RoutineEntryRepo::find_for_user(pool, id, user_id)
        .await?
        .ok_or_else(|| not_found("RoutineEntry", id))
}

pub(crate) async fn owned_record(
    pool: &DbPool,
    id: DbId,
    user_id: DbId,
) -> AppResult<AttendanceRecord> {
    AttendanceRecordRepo::find_for_user(pool, id, user_id)
        .await?
        .ok_or_else(|| not_found("AttendanceRecord", id))
}
