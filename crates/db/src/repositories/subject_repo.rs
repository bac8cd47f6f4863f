//! Repository for the `subjects` table.

use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::subject::{
    CreateSubject, Subject, UpdateSubject, DEFAULT_COLOR, DEFAULT_MIN_ATTENDANCE,
};
use crate::repositories::SoftDelete;

/// `NUMERIC` columns are cast so they decode as `f64`.
const COLUMNS: &str = "id, semester_id, name, code, credit::float8 AS credit, \
                       min_attendance_percentage::float8 AS min_attendance_percentage, \
                       color, deleted_at, created_at, updated_at";

/// Same columns, qualified for queries joining `semesters sem`.
const SUB_COLUMNS: &str = "sub.id, sub.semester_id, sub.name, sub.code, \
                           sub.credit::float8 AS credit, \
                           sub.min_attendance_percentage::float8 AS min_attendance_percentage, \
                           sub.color, sub.deleted_at, sub.created_at, sub.updated_at";

pub struct SubjectRepo;

impl SoftDelete for SubjectRepo {
    const TABLE: &'static str = "subjects";
}

impl SubjectRepo {
    pub async fn create(pool: &PgPool, input: &CreateSubject) -> Result<Subject, sqlx::Error> {
        let query = format!(
            "INSERT INTO subjects (semester_id, name, code, credit, min_attendance_percentage, color)
             VALUES ($1, $2, $3, $4::numeric, $5::numeric, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subject>(&query)
            .bind(input.semester_id)
            .bind(&input.name)
            .bind(&input.code)
            .bind(input.credit)
            .bind(input.min_attendance_percentage.unwrap_or(DEFAULT_MIN_ATTENDANCE))
            .bind(input.color.as_deref().unwrap_or(DEFAULT_COLOR))
            .fetch_one(pool)
            .await
    }

    /// Find a live subject whose live semester belongs to `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Subject>, sqlx::Error> {
        let query = format!(
            "SELECT {SUB_COLUMNS} FROM subjects sub \
             JOIN semesters sem ON sem.id = sub.semester_id \
             WHERE sub.id = $1 AND sem.user_id = $2 \
               AND sub.deleted_at IS NULL AND sem.deleted_at IS NULL"
        );
        sqlx::query_as::<_, Subject>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Like [`Self::find_for_user`] but also returns a tombstoned subject.
    pub async fn find_for_user_include_deleted(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Subject>, sqlx::Error> {
        let query = format!(
            "SELECT {SUB_COLUMNS} FROM subjects sub \
             JOIN semesters sem ON sem.id = sub.semester_id \
             WHERE sub.id = $1 AND sem.user_id = $2 AND sem.deleted_at IS NULL"
        );
        sqlx::query_as::<_, Subject>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Live subjects of a semester ordered by name.
    pub async fn list_by_semester(
        pool: &PgPool,
        semester_id: DbId,
    ) -> Result<Vec<Subject>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subjects \
             WHERE semester_id = $1 AND deleted_at IS NULL \
             ORDER BY name, id"
        );
        sqlx::query_as::<_, Subject>(&query)
            .bind(semester_id)
            .fetch_all(pool)
            .await
    }

    /// Live subjects across the user's live semesters, optionally narrowed to
    /// one semester.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        semester_id: Option<DbId>,
    ) -> Result<Vec<Subject>, sqlx::Error> {
        let query = format!(
            "SELECT {SUB_COLUMNS} FROM subjects sub \
             JOIN semesters sem ON sem.id = sub.semester_id \
             WHERE sem.user_id = $1 AND ($2::bigint IS NULL OR sub.semester_id = $2) \
               AND sub.deleted_at IS NULL AND sem.deleted_at IS NULL \
             ORDER BY sub.name, sub.id"
        );
        sqlx::query_as::<_, Subject>(&query)
            .bind(user_id)
            .bind(semester_id)
            .fetch_all(pool)
            .await
    }

    /// Update a live subject. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSubject,
    ) -> Result<Option<Subject>, sqlx::Error> {
        let query = format!(
            "UPDATE subjects SET
                name = COALESCE($2, name),
                code = COALESCE($3, code),
                credit = COALESCE($4::numeric, credit),
                min_attendance_percentage = COALESCE($5::numeric, min_attendance_percentage),
                color = COALESCE($6, color)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subject>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.code)
            .bind(input.credit)
            .bind(input.min_attendance_percentage)
            .bind(&input.color)
            .fetch_optional(pool)
            .await
    }
}
