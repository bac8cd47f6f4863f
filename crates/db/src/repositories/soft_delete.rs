//! Soft-delete capability shared by entity repositories.
//!
//! A row is tombstoned when `deleted_at IS NOT NULL`. Implementors only name
//! their table; the queries are the same for every entity.

use std::future::Future;

use rollcall_core::types::DbId;
use sqlx::PgPool;

pub trait SoftDelete {
    /// Table holding the entity. Must have `id` and `deleted_at` columns.
    const TABLE: &'static str;

    /// Tombstone a live row. Returns `true` if a row was marked deleted.
    fn soft_delete(pool: &PgPool, id: DbId) -> impl Future<Output = Result<bool, sqlx::Error>> + Send {
        async move {
            let query = format!(
                "UPDATE {} SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
                Self::TABLE
            );
            let result = sqlx::query(&query).bind(id).execute(pool).await?;
            Ok(result.rows_affected() > 0)
        }
    }

    /// Clear the tombstone. Returns `true` if a row was restored.
    fn restore(pool: &PgPool, id: DbId) -> impl Future<Output = Result<bool, sqlx::Error>> + Send {
        async move {
            let query = format!(
                "UPDATE {} SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
                Self::TABLE
            );
            let result = sqlx::query(&query).bind(id).execute(pool).await?;
            Ok(result.rows_affected() > 0)
        }
    }

    /// `Some(true)` for a tombstoned row, `Some(false)` for a live one and
    /// `None` when no row has this id.
    fn is_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> impl Future<Output = Result<Option<bool>, sqlx::Error>> + Send {
        async move {
            let query = format!(
                "SELECT deleted_at IS NOT NULL FROM {} WHERE id = $1",
                Self::TABLE
            );
            let row: Option<(bool,)> = sqlx::query_as(&query).bind(id).fetch_optional(pool).await?;
            Ok(row.map(|(deleted,)| deleted))
        }
    }

    /// Permanently remove a row. Returns `true` if a row was removed.
    fn hard_delete(pool: &PgPool, id: DbId) -> impl Future<Output = Result<bool, sqlx::Error>> + Send {
        async move {
            let query = format!("DELETE FROM {} WHERE id = $1", Self::TABLE);
            let result = sqlx::query(&query).bind(id).execute(pool).await?;
            Ok(result.rows_affected() > 0)
        }
    }
}
