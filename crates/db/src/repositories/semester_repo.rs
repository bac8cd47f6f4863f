//! Repository for the `semesters` table.

use rollcall_core::schedule::SemesterStatus;
use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::semester::{CreateSemester, Semester, UpdateSemester};
use crate::repositories::SoftDelete;

const COLUMNS: &str = "id, user_id, name, start_date, end_date, status, is_current, \
                       deleted_at, created_at, updated_at";

pub struct SemesterRepo;

impl SoftDelete for SemesterRepo {
    const TABLE: &'static str = "semesters";
}

impl SemesterRepo {
    /// Insert a semester for `user_id`.
    ///
    /// When `is_current` is set, the user's other semesters lose the flag in
    /// the same transaction.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateSemester,
    ) -> Result<Semester, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if input.is_current {
            sqlx::query(
                "UPDATE semesters SET is_current = false \
                 WHERE user_id = $1 AND is_current = true",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!(
            "INSERT INTO semesters (user_id, name, start_date, end_date, status, is_current)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let semester = sqlx::query_as::<_, Semester>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.status.unwrap_or(SemesterStatus::Active).as_str())
            .bind(input.is_current)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(semester)
    }

    /// Find a live semester owned by `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Semester>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM semesters \
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Semester>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a semester owned by `user_id`, tombstoned or not. Used by restore.
    pub async fn find_for_user_include_deleted(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Semester>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM semesters WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Semester>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// The user's semesters, latest start date first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        include_deleted: bool,
    ) -> Result<Vec<Semester>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM semesters \
             WHERE user_id = $1 AND ($2 OR deleted_at IS NULL) \
             ORDER BY start_date DESC, id DESC"
        );
        sqlx::query_as::<_, Semester>(&query)
            .bind(user_id)
            .bind(include_deleted)
            .fetch_all(pool)
            .await
    }

    /// Update a live semester. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSemester,
    ) -> Result<Option<Semester>, sqlx::Error> {
        let query = format!(
            "UPDATE semesters SET
                name = COALESCE($2, name),
                start_date = COALESCE($3, start_date),
                end_date = COALESCE($4, end_date),
                status = COALESCE($5, status)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Semester>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.status.map(SemesterStatus::as_str))
            .fetch_optional(pool)
            .await
    }

    /// Make `id` the user's only current semester.
    ///
    /// Returns `None` (and changes nothing) if the semester is not a live row
    /// owned by `user_id`.
    pub async fn set_current(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Semester>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE semesters SET is_current = false \
             WHERE user_id = $1 AND is_current = true AND id <> $2",
        )
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE semesters SET is_current = true \
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        let semester = sqlx::query_as::<_, Semester>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        match semester {
            Some(semester) => {
                tx.commit().await?;
                Ok(Some(semester))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }

    /// The user's current semester, if one is flagged.
    pub async fn current(pool: &PgPool, user_id: DbId) -> Result<Option<Semester>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM semesters \
             WHERE user_id = $1 AND is_current = true AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Semester>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Tombstone a semester and drop its current flag so a restore cannot
    /// collide with a semester made current in the meantime.
    pub async fn soft_delete_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE semesters SET deleted_at = NOW(), is_current = false \
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
