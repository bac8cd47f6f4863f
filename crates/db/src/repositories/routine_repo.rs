//! Repository for the `routines` table.

use rollcall_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::routine::{CreateRoutine, Routine, UpdateRoutine, DEFAULT_ROUTINE_NAME};
use crate::repositories::SoftDelete;

const COLUMNS: &str = "id, semester_id, name, is_active, deleted_at, created_at, updated_at";

const R_COLUMNS: &str =
    "r.id, r.semester_id, r.name, r.is_active, r.deleted_at, r.created_at, r.updated_at";

pub struct RoutineRepo;

impl SoftDelete for RoutineRepo {
    const TABLE: &'static str = "routines";
}

impl RoutineRepo {
    pub async fn create(pool: &PgPool, input: &CreateRoutine) -> Result<Routine, sqlx::Error> {
        let query = format!(
            "INSERT INTO routines (semester_id, name, is_active)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Routine>(&query)
            .bind(input.semester_id)
            .bind(input.name.as_deref().unwrap_or(DEFAULT_ROUTINE_NAME))
            .bind(input.is_active.unwrap_or(true))
            .fetch_one(pool)
            .await
    }

    /// Find a live routine whose live semester belongs to `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Routine>, sqlx::Error> {
        let query = format!(
            "SELECT {R_COLUMNS} FROM routines r \
             JOIN semesters sem ON sem.id = r.semester_id \
             WHERE r.id = $1 AND sem.user_id = $2 \
               AND r.deleted_at IS NULL AND sem.deleted_at IS NULL"
        );
        sqlx::query_as::<_, Routine>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// The live routine of a semester, if one exists.
    pub async fn find_by_semester(
        pool: &PgPool,
        semester_id: DbId,
    ) -> Result<Option<Routine>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM routines WHERE semester_id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Routine>(&query)
            .bind(semester_id)
            .fetch_optional(pool)
            .await
    }

    /// Live routines across the user's live semesters.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        semester_id: Option<DbId>,
    ) -> Result<Vec<Routine>, sqlx::Error> {
        let query = format!(
            "SELECT {R_COLUMNS} FROM routines r \
             JOIN semesters sem ON sem.id = r.semester_id \
             WHERE sem.user_id = $1 AND ($2::bigint IS NULL OR r.semester_id = $2) \
               AND r.deleted_at IS NULL AND sem.deleted_at IS NULL \
             ORDER BY r.created_at DESC, r.id DESC"
        );
        sqlx::query_as::<_, Routine>(&query)
            .bind(user_id)
            .bind(semester_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRoutine,
    ) -> Result<Option<Routine>, sqlx::Error> {
        let query = format!(
            "UPDATE routines SET
                name = COALESCE($2, name),
                is_active = COALESCE($3, is_active)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Routine>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Take a row lock on the routine for the rest of the transaction.
    ///
    /// Entry writes hold this lock so that two concurrent inserts on the same
    /// routine cannot both pass the overlap check. Returns `false` if the
    /// routine is not live.
    pub async fn lock(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM routines WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(row.is_some())
    }
}
