//! Repository for the `attendance_records` table.

use chrono::{NaiveDate, NaiveTime};
use rollcall_core::generation::PlannedClass;
use rollcall_core::schedule::{AttendanceKind, AttendanceStatus};
use rollcall_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::attendance_record::{
    AttendanceFilter, AttendanceRecord, AttendanceRecordDetail, CalendarDay, HistoryItem,
    NewAttendanceRecord, StatusCountRow, UpdateAttendanceRecord,
};
use crate::repositories::SoftDelete;

const COLUMNS: &str = "id, subject_id, routine_entry_id, date, status, attendance_type, \
                       start_time, end_time, duration_minutes, notes, is_holiday, \
                       deleted_at, created_at, updated_at";

const AR_COLUMNS: &str = "ar.id, ar.subject_id, ar.routine_entry_id, ar.date, ar.status, \
                          ar.attendance_type, ar.start_time, ar.end_time, ar.duration_minutes, \
                          ar.notes, ar.is_holiday, ar.deleted_at, ar.created_at, ar.updated_at";

/// Joins that scope `ar` to the user in `$1` through live subjects and
/// semesters.
const OWNED_JOIN: &str = "JOIN subjects sub ON sub.id = ar.subject_id AND sub.deleted_at IS NULL \
                          JOIN semesters sem ON sem.id = sub.semester_id \
                               AND sem.deleted_at IS NULL AND sem.user_id = $1";

pub struct AttendanceRecordRepo;

impl SoftDelete for AttendanceRecordRepo {
    const TABLE: &'static str = "attendance_records";
}

impl AttendanceRecordRepo {
    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a routine-generated session unless its slot is already taken.
    ///
    /// Returns `None` when a live record already occupies
    /// `(subject_id, date, start_time)`; the unique index makes this safe
    /// under concurrent generation.
    pub async fn insert_generated(
        conn: &mut PgConnection,
        class: &PlannedClass,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance_records
                (subject_id, routine_entry_id, date, status, attendance_type,
                 start_time, end_time, duration_minutes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (subject_id, date, start_time) WHERE deleted_at IS NULL DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(class.subject_id)
            .bind(class.routine_entry_id)
            .bind(class.date)
            .bind(AttendanceStatus::Absent.as_str())
            .bind(AttendanceKind::Routine.as_str())
            .bind(class.start_time)
            .bind(class.end_time)
            .bind(class.duration_minutes)
            .fetch_optional(conn)
            .await
    }

    /// Insert a manually created record. Validation happens upstream.
    pub async fn create(
        pool: &PgPool,
        input: &NewAttendanceRecord,
    ) -> Result<AttendanceRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance_records
                (subject_id, routine_entry_id, date, status, attendance_type,
                 start_time, end_time, duration_minutes, notes, is_holiday)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(input.subject_id)
            .bind(input.routine_entry_id)
            .bind(input.date)
            .bind(input.status.as_str())
            .bind(input.attendance_type.as_str())
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.duration_minutes)
            .bind(&input.notes)
            .bind(input.is_holiday)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAttendanceRecord,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE attendance_records SET
                status = COALESCE($2, status),
                notes = COALESCE($3, notes),
                is_holiday = COALESCE($4, is_holiday)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(id)
            .bind(input.status.map(AttendanceStatus::as_str))
            .bind(&input.notes)
            .bind(input.is_holiday)
            .fetch_optional(pool)
            .await
    }

    /// Set `status` on every listed record, all or nothing.
    ///
    /// Returns `None` without touching anything if any id is missing,
    /// tombstoned or owned by someone else. Duplicate ids count once.
    pub async fn bulk_update_status(
        pool: &PgPool,
        user_id: DbId,
        record_ids: &[DbId],
        status: AttendanceStatus,
    ) -> Result<Option<u64>, sqlx::Error> {
        let mut ids = record_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut tx = pool.begin().await?;

        let locked: Vec<(DbId,)> = sqlx::query_as(&format!(
            "SELECT ar.id FROM attendance_records ar {OWNED_JOIN} \
             WHERE ar.id = ANY($2) AND ar.deleted_at IS NULL \
             FOR UPDATE OF ar"
        ))
        .bind(user_id)
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;

        if locked.len() != ids.len() {
            tx.rollback().await?;
            return Ok(None);
        }

        let result = sqlx::query(
            "UPDATE attendance_records SET status = $2 \
             WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(&ids)
        .bind(status.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(result.rows_affected()))
    }

    /// Set `status` on every live record of the semester's live subjects on
    /// `date`. Cancelling a day also flags the records as a holiday.
    pub async fn mark_day(
        pool: &PgPool,
        semester_id: DbId,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE attendance_records SET
                status = $3,
                is_holiday = CASE WHEN $3 = 'cancelled' THEN true ELSE is_holiday END
             WHERE date = $2 AND deleted_at IS NULL
               AND subject_id IN (
                   SELECT id FROM subjects WHERE semester_id = $1 AND deleted_at IS NULL)",
        )
        .bind(semester_id)
        .bind(date)
        .bind(status.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Find a live record reachable by `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {AR_COLUMNS} FROM attendance_records ar {OWNED_JOIN} \
             WHERE ar.id = $2 AND ar.deleted_at IS NULL"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(user_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Like [`Self::find_for_user`] but also returns a tombstoned record.
    pub async fn find_for_user_include_deleted(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {AR_COLUMNS} FROM attendance_records ar {OWNED_JOIN} WHERE ar.id = $2"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(user_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a live record already occupies the slot.
    ///
    /// Without a start time any live record of the subject on that date
    /// counts as a clash.
    pub async fn slot_taken(
        pool: &PgPool,
        subject_id: DbId,
        date: NaiveDate,
        start_time: Option<NaiveTime>,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS ( \
                 SELECT 1 FROM attendance_records \
                 WHERE subject_id = $1 AND date = $2 AND deleted_at IS NULL \
                   AND ($3::time IS NULL OR start_time = $3))",
        )
        .bind(subject_id)
        .bind(date)
        .bind(start_time)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Live records visible to `user_id`, newest date first.
    pub async fn list(
        pool: &PgPool,
        user_id: DbId,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecordDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {AR_COLUMNS}, sub.name AS subject_name, sub.color AS subject_color \
             FROM attendance_records ar {OWNED_JOIN} \
             WHERE ar.deleted_at IS NULL \
               AND ($2::bigint IS NULL OR ar.subject_id = $2) \
               AND ($3::bigint IS NULL OR sub.semester_id = $3) \
               AND ($4::date IS NULL OR ar.date = $4) \
               AND ($5::date IS NULL OR ar.date >= $5) \
               AND ($6::date IS NULL OR ar.date <= $6) \
               AND ($7::text IS NULL OR ar.status = $7) \
               AND ($8::text IS NULL OR ar.attendance_type = $8) \
             ORDER BY ar.date DESC, ar.start_time NULLS LAST, ar.id"
        );
        sqlx::query_as::<_, AttendanceRecordDetail>(&query)
            .bind(user_id)
            .bind(filter.subject_id)
            .bind(filter.semester_id)
            .bind(filter.date)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.status.map(AttendanceStatus::as_str))
            .bind(filter.attendance_type.map(AttendanceKind::as_str))
            .fetch_all(pool)
            .await
    }

    /// Per-day status totals between `start` and `end` inclusive.
    pub async fn calendar(
        pool: &PgPool,
        user_id: DbId,
        start: NaiveDate,
        end: NaiveDate,
        semester_id: Option<DbId>,
    ) -> Result<Vec<CalendarDay>, sqlx::Error> {
        let query = format!(
            "SELECT ar.date, \
                    COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE ar.status = 'present') AS present, \
                    COUNT(*) FILTER (WHERE ar.status = 'absent') AS absent, \
                    COUNT(*) FILTER (WHERE ar.status = 'cancelled') AS cancelled \
             FROM attendance_records ar {OWNED_JOIN} \
             WHERE ar.deleted_at IS NULL AND ar.date BETWEEN $2 AND $3 \
               AND ($4::bigint IS NULL OR sub.semester_id = $4) \
             GROUP BY ar.date \
             ORDER BY ar.date"
        );
        sqlx::query_as::<_, CalendarDay>(&query)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .bind(semester_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Analytics inputs
    // -----------------------------------------------------------------------

    /// Live record counts per status for one subject inside `[start, end]`.
    pub async fn status_counts(
        pool: &PgPool,
        subject_id: DbId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<StatusCountRow>, sqlx::Error> {
        sqlx::query_as::<_, StatusCountRow>(
            "SELECT status, COUNT(*) AS count FROM attendance_records \
             WHERE subject_id = $1 AND deleted_at IS NULL AND date BETWEEN $2 AND $3 \
             GROUP BY status",
        )
        .bind(subject_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }

    /// `(date, status)` of every live record of a subject inside
    /// `[start, end]`, oldest first.
    pub async fn dated_statuses(
        pool: &PgPool,
        subject_id: DbId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, AttendanceStatus)>, sqlx::Error> {
        let rows: Vec<(NaiveDate, String)> = sqlx::query_as(
            "SELECT date, status FROM attendance_records \
             WHERE subject_id = $1 AND deleted_at IS NULL AND date BETWEEN $2 AND $3 \
             ORDER BY date",
        )
        .bind(subject_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;
        rows.into_iter()
            .map(|(date, status)| {
                status
                    .parse()
                    .map(|status| (date, status))
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))
            })
            .collect()
    }

    /// A subject's records, newest first, optionally bounded by date.
    pub async fn history(
        pool: &PgPool,
        subject_id: DbId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<HistoryItem>, sqlx::Error> {
        sqlx::query_as::<_, HistoryItem>(
            "SELECT id, date, status, attendance_type, start_time, end_time, duration_minutes, \
                    notes, is_holiday \
             FROM attendance_records \
             WHERE subject_id = $1 AND deleted_at IS NULL \
               AND ($2::date IS NULL OR date >= $2) \
               AND ($3::date IS NULL OR date <= $3) \
             ORDER BY date DESC, start_time DESC NULLS LAST, id DESC",
        )
        .bind(subject_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }

    /// Number of live records for a subject. Used by tests and diagnostics.
    pub async fn count_for_subject(pool: &PgPool, subject_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM attendance_records WHERE subject_id = $1 AND deleted_at IS NULL",
        )
        .bind(subject_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
