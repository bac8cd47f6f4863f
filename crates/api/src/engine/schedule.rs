//! Routine entry writes.
//!
//! Every write locks the routine row first, so the overlap check and the
//! insert or update run against a stable set of entries.

use rollcall_core::error::CoreError;
use rollcall_core::schedule::{ensure_batch_has_no_overlap, ensure_no_overlap, WeeklySlot};
use rollcall_core::types::DbId;
use rollcall_db::models::routine::Routine;
use rollcall_db::models::routine_entry::{
    CreateRoutineEntry, RoutineEntry, RoutineEntryDetail, UpdateRoutineEntry,
};
use rollcall_db::models::subject::Subject;
use rollcall_db::repositories::{RoutineEntryRepo, RoutineRepo, SubjectRepo};
use rollcall_db::DbPool;
use sqlx::PgConnection;

use crate::error::AppResult;

/// Resolve a subject for a routine entry: owned by the user and part of the
/// routine's semester.
async fn subject_for_routine(
    pool: &DbPool,
    routine: &Routine,
    subject_id: DbId,
    user_id: DbId,
) -> AppResult<Subject> {
    let subject = SubjectRepo::find_for_user(pool, subject_id, user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Subject",
            id: subject_id,
        })?;
    if subject.semester_id != routine.semester_id {
        return Err(CoreError::invalid(
            "subject_id",
            "Subject must belong to the same semester as the routine.",
        )
        .into());
    }
    Ok(subject)
}

/// Lock the routine for the rest of the transaction.
async fn lock_routine(conn: &mut PgConnection, routine: &Routine) -> AppResult<()> {
    if !RoutineRepo::lock(conn, routine.id).await? {
        return Err(CoreError::NotFound {
            entity: "Routine",
            id: routine.id,
        }
        .into());
    }
    Ok(())
}

/// Check `slot` against the live entries of its weekday.
async fn check_overlap(
    conn: &mut PgConnection,
    routine_id: DbId,
    slot: &WeeklySlot,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    let existing: Vec<(String, WeeklySlot)> =
        RoutineEntryRepo::list_day(conn, routine_id, slot.day, exclude_id)
            .await?
            .into_iter()
            .map(|d| (d.subject_name, d.entry.slot()))
            .collect();
    ensure_no_overlap(slot, &existing)?;
    Ok(())
}

fn detail(entry: RoutineEntry, subject: &Subject) -> RoutineEntryDetail {
    let duration_minutes = entry.slot().duration_minutes();
    RoutineEntryDetail {
        entry,
        subject_name: subject.name.clone(),
        subject_color: subject.color.clone(),
        duration_minutes,
    }
}

pub async fn create_entry(
    pool: &DbPool,
    routine: &Routine,
    user_id: DbId,
    input: &CreateRoutineEntry,
) -> AppResult<RoutineEntryDetail> {
    let slot = input.slot()?;
    let subject = subject_for_routine(pool, routine, input.subject_id, user_id).await?;

    let mut tx = pool.begin().await?;
    lock_routine(&mut tx, routine).await?;
    check_overlap(&mut tx, routine.id, &slot, None).await?;
    let entry = RoutineEntryRepo::insert(&mut tx, routine.id, input).await?;
    tx.commit().await?;

    tracing::info!(routine_id = routine.id, entry_id = entry.id, day = %slot.day, "Created routine entry");
    Ok(detail(entry, &subject))
}

/// Create all `inputs` or none of them.
///
/// Entries are checked against each other as well as against the routine.
pub async fn create_entries(
    pool: &DbPool,
    routine: &Routine,
    user_id: DbId,
    inputs: &[CreateRoutineEntry],
) -> AppResult<Vec<RoutineEntryDetail>> {
    let mut prepared = Vec::with_capacity(inputs.len());
    for input in inputs {
        let slot = input.slot()?;
        let subject = subject_for_routine(pool, routine, input.subject_id, user_id).await?;
        prepared.push((input, slot, subject));
    }

    let labelled: Vec<(String, WeeklySlot)> = prepared
        .iter()
        .map(|(_, slot, subject)| (subject.name.clone(), *slot))
        .collect();
    ensure_batch_has_no_overlap(&labelled)?;

    let mut tx = pool.begin().await?;
    lock_routine(&mut tx, routine).await?;
    let mut created = Vec::with_capacity(prepared.len());
    for (input, slot, subject) in &prepared {
        check_overlap(&mut tx, routine.id, slot, None).await?;
        let entry = RoutineEntryRepo::insert(&mut tx, routine.id, input).await?;
        created.push(detail(entry, subject));
    }
    tx.commit().await?;

    tracing::info!(routine_id = routine.id, created = created.len(), "Bulk created routine entries");
    Ok(created)
}

/// Apply a partial update, re-running the overlap check on the merged slot
/// while excluding the entry itself.
pub async fn update_entry(
    pool: &DbPool,
    routine: &Routine,
    current: &RoutineEntry,
    user_id: DbId,
    input: &UpdateRoutineEntry,
) -> AppResult<RoutineEntryDetail> {
    let slot = input.merged_slot(current)?;
    let subject_id = input.subject_id.unwrap_or(current.subject_id);
    let subject = subject_for_routine(pool, routine, subject_id, user_id).await?;

    let mut tx = pool.begin().await?;
    lock_routine(&mut tx, routine).await?;
    check_overlap(&mut tx, routine.id, &slot, Some(current.id)).await?;
    let entry = RoutineEntryRepo::update(&mut tx, current.id, &slot, input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "RoutineEntry",
            id: current.id,
        })?;
    tx.commit().await?;

    tracing::info!(entry_id = entry.id, "Updated routine entry");
    Ok(detail(entry, &subject))
}
