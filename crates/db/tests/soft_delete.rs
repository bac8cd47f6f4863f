//! Soft-delete and restore behaviour across entity repositories.
//!
//! - Tombstoned rows are hidden from ownership-scoped lookups and lists
//! - Restore makes them visible again
//! - Soft-delete is idempotent (second call returns `false`)
//! - Unique names only apply among live rows

use chrono::NaiveDate;
use rollcall_db::models::semester::CreateSemester;
use rollcall_db::models::subject::CreateSubject;
use rollcall_db::repositories::{SemesterRepo, SoftDelete, SubjectRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn new_semester(name: &str) -> CreateSemester {
    CreateSemester {
        name: name.to_string(),
        start_date: d(2026, 1, 1),
        end_date: d(2026, 5, 31),
        status: None,
        is_current: false,
    }
}

fn new_subject(semester_id: i64, name: &str) -> CreateSubject {
    CreateSubject {
        semester_id,
        name: name.to_string(),
        code: None,
        credit: 3.0,
        min_attendance_percentage: None,
        color: None,
    }
}

// ---------------------------------------------------------------------------
// Semesters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_deleted_semester_is_hidden_then_restored(pool: PgPool) {
    let user = UserRepo::create(&pool, "ada").await.unwrap();
    let sem = SemesterRepo::create(&pool, user.id, &new_semester("Spring"))
        .await
        .unwrap();

    assert!(SemesterRepo::soft_delete(&pool, sem.id).await.unwrap());
    assert!(!SemesterRepo::soft_delete(&pool, sem.id).await.unwrap());
    assert_eq!(SemesterRepo::is_deleted(&pool, sem.id).await.unwrap(), Some(true));

    assert!(SemesterRepo::find_for_user(&pool, sem.id, user.id)
        .await
        .unwrap()
        .is_none());
    assert!(SemesterRepo::list_for_user(&pool, user.id, false)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        SemesterRepo::list_for_user(&pool, user.id, true)
            .await
            .unwrap()
            .len(),
        1
    );

    assert!(SemesterRepo::restore(&pool, sem.id).await.unwrap());
    assert!(SemesterRepo::find_for_user(&pool, sem.id, user.id)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn semester_is_invisible_to_other_users(pool: PgPool) {
    let owner = UserRepo::create(&pool, "owner").await.unwrap();
    let other = UserRepo::create(&pool, "other").await.unwrap();
    let sem = SemesterRepo::create(&pool, owner.id, &new_semester("Spring"))
        .await
        .unwrap();

    assert!(SemesterRepo::find_for_user(&pool, sem.id, other.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn semester_name_is_reusable_after_soft_delete(pool: PgPool) {
    let user = UserRepo::create(&pool, "ada").await.unwrap();
    let first = SemesterRepo::create(&pool, user.id, &new_semester("Spring"))
        .await
        .unwrap();

    let dup = SemesterRepo::create(&pool, user.id, &new_semester("Spring")).await;
    assert!(dup.is_err());

    SemesterRepo::soft_delete(&pool, first.id).await.unwrap();
    SemesterRepo::create(&pool, user.id, &new_semester("Spring"))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn set_current_leaves_exactly_one_current(pool: PgPool) {
    let user = UserRepo::create(&pool, "ada").await.unwrap();
    let mut input = new_semester("Fall");
    input.is_current = true;
    let fall = SemesterRepo::create(&pool, user.id, &input).await.unwrap();
    let spring = SemesterRepo::create(&pool, user.id, &new_semester("Spring"))
        .await
        .unwrap();
    assert!(fall.is_current);

    let updated = SemesterRepo::set_current(&pool, user.id, spring.id)
        .await
        .unwrap()
        .unwrap();
    assert!(updated.is_current);

    let current = SemesterRepo::current(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(current.id, spring.id);

    let fall = SemesterRepo::find_for_user(&pool, fall.id, user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!fall.is_current);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn set_current_on_foreign_semester_changes_nothing(pool: PgPool) {
    let user = UserRepo::create(&pool, "ada").await.unwrap();
    let other = UserRepo::create(&pool, "bob").await.unwrap();
    let mut input = new_semester("Fall");
    input.is_current = true;
    let fall = SemesterRepo::create(&pool, user.id, &input).await.unwrap();
    let foreign = SemesterRepo::create(&pool, other.id, &new_semester("Theirs"))
        .await
        .unwrap();

    assert!(SemesterRepo::set_current(&pool, user.id, foreign.id)
        .await
        .unwrap()
        .is_none());
    let current = SemesterRepo::current(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(current.id, fall.id);
}

// ---------------------------------------------------------------------------
// Subjects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn subject_defaults_and_soft_delete(pool: PgPool) {
    let user = UserRepo::create(&pool, "ada").await.unwrap();
    let sem = SemesterRepo::create(&pool, user.id, &new_semester("Spring"))
        .await
        .unwrap();
    let subject = SubjectRepo::create(&pool, &new_subject(sem.id, "Physics"))
        .await
        .unwrap();

    assert_eq!(subject.min_attendance_percentage, 75.0);
    assert_eq!(subject.color, "#3B82F6");
    assert_eq!(subject.min_required().to_string(), "75.00");

    assert!(SubjectRepo::soft_delete(&pool, subject.id).await.unwrap());
    assert!(SubjectRepo::list_by_semester(&pool, sem.id)
        .await
        .unwrap()
        .is_empty());
    assert!(SubjectRepo::find_for_user_include_deleted(&pool, subject.id, user.id)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn subjects_of_deleted_semester_are_unreachable(pool: PgPool) {
    let user = UserRepo::create(&pool, "ada").await.unwrap();
    let sem = SemesterRepo::create(&pool, user.id, &new_semester("Spring"))
        .await
        .unwrap();
    let subject = SubjectRepo::create(&pool, &new_subject(sem.id, "Physics"))
        .await
        .unwrap();

    SemesterRepo::soft_delete_for_user(&pool, sem.id, user.id)
        .await
        .unwrap();
    assert!(SubjectRepo::find_for_user(&pool, subject.id, user.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn subject_percentage_outside_range_is_rejected(pool: PgPool) {
    let user = UserRepo::create(&pool, "ada").await.unwrap();
    let sem = SemesterRepo::create(&pool, user.id, &new_semester("Spring"))
        .await
        .unwrap();
    let mut input = new_subject(sem.id, "Physics");
    input.min_attendance_percentage = Some(120.0);

    let err = SubjectRepo::create(&pool, &input).await.unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("ck_subjects_min_attendance"));
}
