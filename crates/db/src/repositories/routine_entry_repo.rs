//! Repository for the `routine_entries` table.

use rollcall_core::schedule::{DayOfWeek, WeeklySlot};
use rollcall_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::routine_entry::{
    CreateRoutineEntry, RoutineEntry, RoutineEntryDetail, UpdateRoutineEntry,
};
use crate::repositories::SoftDelete;

const COLUMNS: &str = "id, routine_id, subject_id, day_of_week, start_time, end_time, \
                       room, notes, deleted_at, created_at, updated_at";

/// Entry columns plus the joined subject fields of [`RoutineEntryDetail`].
const DETAIL_COLUMNS: &str = "e.id, e.routine_id, e.subject_id, e.day_of_week, e.start_time, \
                              e.end_time, e.room, e.notes, e.deleted_at, e.created_at, \
                              e.updated_at, sub.name AS subject_name, \
                              sub.color AS subject_color, \
                              (EXTRACT(EPOCH FROM (e.end_time - e.start_time)) / 60)::int4 \
                                  AS duration_minutes";

pub struct RoutineEntryRepo;

impl SoftDelete for RoutineEntryRepo {
    const TABLE: &'static str = "routine_entries";
}

impl RoutineEntryRepo {
    /// Insert an entry. The caller has already validated the slot.
    pub async fn insert(
        conn: &mut PgConnection,
        routine_id: DbId,
        input: &CreateRoutineEntry,
    ) -> Result<RoutineEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO routine_entries
                (routine_id, subject_id, day_of_week, start_time, end_time, room, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RoutineEntry>(&query)
            .bind(routine_id)
            .bind(input.subject_id)
            .bind(input.day_of_week.index())
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(&input.room)
            .bind(&input.notes)
            .fetch_one(conn)
            .await
    }

    /// Apply an update with an already validated merged slot.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        slot: &WeeklySlot,
        input: &UpdateRoutineEntry,
    ) -> Result<Option<RoutineEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE routine_entries SET
                subject_id = COALESCE($2, subject_id),
                day_of_week = $3,
                start_time = $4,
                end_time = $5,
                room = COALESCE($6, room),
                notes = COALESCE($7, notes)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RoutineEntry>(&query)
            .bind(id)
            .bind(input.subject_id)
            .bind(slot.day.index())
            .bind(slot.start_time)
            .bind(slot.end_time)
            .bind(&input.room)
            .bind(&input.notes)
            .fetch_optional(conn)
            .await
    }

    /// Find a live entry on a live routine owned by `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<RoutineEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM routine_entries WHERE id = $1 AND deleted_at IS NULL \
               AND routine_id IN ( \
                   SELECT r.id FROM routines r \
                   JOIN semesters sem ON sem.id = r.semester_id \
                   WHERE sem.user_id = $2 AND r.deleted_at IS NULL AND sem.deleted_at IS NULL)"
        );
        sqlx::query_as::<_, RoutineEntry>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Live entries of a routine ordered by weekday then start time.
    pub async fn list_by_routine(
        pool: &PgPool,
        routine_id: DbId,
    ) -> Result<Vec<RoutineEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM routine_entries \
             WHERE routine_id = $1 AND deleted_at IS NULL \
             ORDER BY day_of_week, start_time, id"
        );
        sqlx::query_as::<_, RoutineEntry>(&query)
            .bind(routine_id)
            .fetch_all(pool)
            .await
    }

    /// Live entries of a routine with subject details, weekday then start time.
    pub async fn list_details_by_routine(
        pool: &PgPool,
        routine_id: DbId,
    ) -> Result<Vec<RoutineEntryDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM routine_entries e \
             JOIN subjects sub ON sub.id = e.subject_id \
             WHERE e.routine_id = $1 AND e.deleted_at IS NULL \
             ORDER BY e.day_of_week, e.start_time, e.id"
        );
        sqlx::query_as::<_, RoutineEntryDetail>(&query)
            .bind(routine_id)
            .fetch_all(pool)
            .await
    }

    /// Live entries on one weekday of a routine, for the overlap check.
    ///
    /// `exclude_id` leaves out the entry being updated.
    pub async fn list_day(
        conn: &mut PgConnection,
        routine_id: DbId,
        day: DayOfWeek,
        exclude_id: Option<DbId>,
    ) -> Result<Vec<RoutineEntryDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM routine_entries e \
             JOIN subjects sub ON sub.id = e.subject_id \
             WHERE e.routine_id = $1 AND e.day_of_week = $2 AND e.deleted_at IS NULL \
               AND ($3::bigint IS NULL OR e.id <> $3) \
             ORDER BY e.start_time, e.id"
        );
        sqlx::query_as::<_, RoutineEntryDetail>(&query)
            .bind(routine_id)
            .bind(day.index())
            .bind(exclude_id)
            .fetch_all(conn)
            .await
    }

    /// Weekdays on which `subject_id` is scheduled in its semester's live
    /// routine, one element per entry.
    pub async fn days_for_subject(
        pool: &PgPool,
        subject_id: DbId,
    ) -> Result<Vec<DayOfWeek>, sqlx::Error> {
        let rows: Vec<(i16,)> = sqlx::query_as(
            "SELECT e.day_of_week FROM routine_entries e \
             JOIN routines r ON r.id = e.routine_id \
             JOIN subjects sub ON sub.id = e.subject_id AND sub.semester_id = r.semester_id \
             WHERE e.subject_id = $1 AND e.deleted_at IS NULL AND r.deleted_at IS NULL",
        )
        .bind(subject_id)
        .fetch_all(pool)
        .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(day,)| DayOfWeek::from_index(day))
            .collect())
    }
}
