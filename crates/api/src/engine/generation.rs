//! Class generation engine.
//!
//! Routine generation never fails on an occupied slot: the insert is a no-op
//! and the slot is left out of the result. Ad-hoc creation, in contrast,
//! reports a duplicate slot as a validation error.

use chrono::NaiveDate;
use rollcall_core::error::CoreError;
use rollcall_core::generation::{
    daily_generation_date, plan_for_date, plan_for_range, resolve_session_timing,
    validate_generation_range, PlannedClass, RoutineSlot,
};
use rollcall_core::schedule::{ensure_date_in_semester, AttendanceKind, AttendanceStatus};
use rollcall_core::types::DbId;
use rollcall_db::models::attendance_record::{
    AttendanceRecord, CreateAdhocRecord, CreateAttendanceRecord, NewAttendanceRecord,
};
use rollcall_db::models::routine::Routine;
use rollcall_db::models::semester::Semester;
use rollcall_db::models::subject::Subject;
use rollcall_db::repositories::{AttendanceRecordRepo, RoutineEntryRepo, RoutineRepo};
use rollcall_db::DbPool;
use serde::Serialize;
use sqlx::PgConnection;

use crate::error::AppResult;

/// Outcome of a generation request.
#[derive(Debug, Serialize)]
pub struct GenerationRun {
    pub message: String,
    pub count: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub records: Vec<AttendanceRecord>,
}

impl GenerationRun {
    fn new(start_date: NaiveDate, end_date: NaiveDate, records: Vec<AttendanceRecord>) -> Self {
        Self {
            message: format!("Generated {} class sessions.", records.len()),
            count: records.len(),
            start_date,
            end_date,
            records,
        }
    }
}

// ---------------------------------------------------------------------------
// Routine generation
// ---------------------------------------------------------------------------

async fn load_slots(pool: &DbPool, routine_id: DbId) -> Result<Vec<RoutineSlot>, sqlx::Error> {
    let entries = RoutineEntryRepo::list_by_routine(pool, routine_id).await?;
    Ok(entries.iter().map(|e| e.routine_slot()).collect())
}

/// Insert planned sessions, returning only those that were actually created.
async fn materialize(
    conn: &mut PgConnection,
    planned: &[PlannedClass],
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let mut created = Vec::with_capacity(planned.len());
    for class in planned {
        if let Some(record) = AttendanceRecordRepo::insert_generated(&mut *conn, class).await? {
            created.push(record);
        }
    }
    Ok(created)
}

/// Create the sessions `routine` implies on `date`.
///
/// Running it twice for the same date creates nothing the second time.
pub async fn generate_for_date(
    pool: &DbPool,
    routine: &Routine,
    date: NaiveDate,
) -> AppResult<GenerationRun> {
    let slots = load_slots(pool, routine.id).await?;
    let planned = plan_for_date(&slots, date);

    let mut tx = pool.begin().await?;
    let created = materialize(&mut tx, &planned).await?;
    tx.commit().await?;

    tracing::info!(
        routine_id = routine.id,
        %date,
        planned = planned.len(),
        created = created.len(),
        "Generated classes for date"
    );
    Ok(GenerationRun::new(date, date, created))
}

/// Create the sessions `routine` implies on every date of `[start, end]`.
///
/// The range is checked against `max_days` first. All inserts share one
/// transaction, so a failure leaves no partial range behind.
pub async fn generate_for_range(
    pool: &DbPool,
    routine: &Routine,
    start: NaiveDate,
    end: NaiveDate,
    max_days: i64,
) -> AppResult<GenerationRun> {
    validate_generation_range(start, end, max_days)?;

    let slots = load_slots(pool, routine.id).await?;
    let planned = plan_for_range(&slots, start, end);

    let mut tx = pool.begin().await?;
    let created = materialize(&mut tx, &planned).await?;
    tx.commit().await?;

    tracing::info!(
        routine_id = routine.id,
        %start,
        %end,
        planned = planned.len(),
        created = created.len(),
        "Generated classes for range"
    );
    Ok(GenerationRun::new(start, end, created))
}

/// Generate today's sessions for a semester's routine.
///
/// Produces nothing when the semester has no routine or `today` falls
/// outside the semester.
pub async fn generate_daily_for_semester(
    pool: &DbPool,
    semester: &Semester,
    today: NaiveDate,
) -> AppResult<GenerationRun> {
    let Some(routine) = RoutineRepo::find_by_semester(pool, semester.id).await? else {
        tracing::debug!(semester_id = semester.id, "No routine, skipping daily generation");
        return Ok(GenerationRun::new(today, today, Vec::new()));
    };

    match daily_generation_date(today, semester.start_date, semester.end_date) {
        Some(date) => generate_for_date(pool, &routine, date).await,
        None => Ok(GenerationRun::new(today, today, Vec::new())),
    }
}

// ---------------------------------------------------------------------------
// Manual records
// ---------------------------------------------------------------------------

/// Unique index guarding one live record per (subject, date, start time).
const SLOT_INDEX: &str = "uq_attendance_records_slot";

fn duplicate_slot(subject: &Subject, input: &NewAttendanceRecord) -> CoreError {
    let at = input
        .start_time
        .map(|t| format!(" at {}", t.format("%H:%M")))
        .unwrap_or_default();
    CoreError::Validation(format!(
        "An attendance record already exists for {} on {}{at}",
        subject.name, input.date
    ))
}

fn is_slot_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some(SLOT_INDEX))
}

/// The slot check and the insert are separate statements, so a concurrent
/// insert can still win the slot; that loss surfaces as the same validation
/// error as a slot found taken up front.
async fn insert_manual(
    pool: &DbPool,
    subject: &Subject,
    semester: &Semester,
    input: NewAttendanceRecord,
) -> AppResult<AttendanceRecord> {
    if AttendanceRecordRepo::slot_taken(pool, subject.id, input.date, input.start_time).await? {
        return Err(duplicate_slot(subject, &input).into());
    }
    ensure_date_in_semester(input.date, semester.start_date, semester.end_date)?;

    match AttendanceRecordRepo::create(pool, &input).await {
        Ok(record) => Ok(record),
        Err(e) if is_slot_violation(&e) => {
            tracing::debug!(subject_id = subject.id, date = %input.date, "Lost slot race");
            Err(duplicate_slot(subject, &input).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Create an extra class outside the weekly routine.
///
/// Fails when the slot is taken or the date lies outside the semester.
pub async fn create_adhoc(
    pool: &DbPool,
    subject: &Subject,
    semester: &Semester,
    input: CreateAdhocRecord,
) -> AppResult<AttendanceRecord> {
    let timing = resolve_session_timing(
        AttendanceKind::Adhoc,
        input.start_time,
        input.end_time,
        input.duration_minutes,
    )?;

    let record = insert_manual(
        pool,
        subject,
        semester,
        NewAttendanceRecord {
            subject_id: subject.id,
            routine_entry_id: None,
            date: input.date,
            status: input.status.unwrap_or(AttendanceStatus::Absent),
            attendance_type: AttendanceKind::Adhoc,
            start_time: timing.start_time,
            end_time: timing.end_time,
            duration_minutes: timing.duration_minutes,
            notes: input.notes,
            is_holiday: false,
        },
    )
    .await?;

    tracing::info!(
        record_id = record.id,
        subject_id = subject.id,
        date = %record.date,
        "Created ad-hoc class"
    );
    Ok(record)
}

/// Create a record through the general attendance endpoint.
///
/// Same checks as [`create_adhoc`]; the time rule only binds ad-hoc records.
pub async fn create_record(
    pool: &DbPool,
    subject: &Subject,
    semester: &Semester,
    input: CreateAttendanceRecord,
) -> AppResult<AttendanceRecord> {
    let kind = input.attendance_type.unwrap_or(AttendanceKind::Routine);
    let timing = resolve_session_timing(
        kind,
        input.start_time,
        input.end_time,
        input.duration_minutes,
    )?;

    let record = insert_manual(
        pool,
        subject,
        semester,
        NewAttendanceRecord {
            subject_id: subject.id,
            routine_entry_id: input.routine_entry_id,
            date: input.date,
            status: input.status.unwrap_or(AttendanceStatus::Absent),
            attendance_type: kind,
            start_time: timing.start_time,
            end_time: timing.end_time,
            duration_minutes: timing.duration_minutes,
            notes: input.notes,
            is_holiday: input.is_holiday,
        },
    )
    .await?;

    tracing::info!(record_id = record.id, subject_id = subject.id, "Created attendance record");
    Ok(record)
}
