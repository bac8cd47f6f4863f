//! HTTP-level tests for routines, their entries and class generation.

mod common;

use axum::http::StatusCode;
use common::{
    add_entry, build_test_app, create_routine, create_semester, create_subject, create_user, d,
    expect_json, get_auth, post_json,
};
use rollcall_api::engine::generation::generate_for_range;
use rollcall_db::repositories::RoutineRepo;
use serde_json::{json, Value};
use sqlx::PgPool;

const MONDAY: i16 = 0;
const TUESDAY: i16 = 1;

struct Setup {
    token: String,
    app: axum::Router,
    semester_id: i64,
    subject_id: i64,
    routine_id: i64,
}

/// A January 2026 semester with one subject and an empty routine.
async fn setup(pool: PgPool) -> Setup {
    let (_, token) = create_user(&pool, "ada").await;
    let app = build_test_app(pool);
    let semester = create_semester(&app, &token, "Winter", d(2026, 1, 1), d(2026, 1, 31)).await;
    let semester_id = semester["id"].as_i64().unwrap();
    let subject = create_subject(&app, &token, semester_id, "Physics").await;
    let routine = create_routine(&app, &token, semester_id).await;
    Setup {
        subject_id: subject["id"].as_i64().unwrap(),
        routine_id: routine["id"].as_i64().unwrap(),
        token,
        app,
        semester_id,
    }
}

async fn routine_detail(s: &Setup) -> Value {
    let response = get_auth(
        s.app.clone(),
        &format!("/api/v1/routines/{}", s.routine_id),
        &s.token,
    )
    .await;
    expect_json(response, StatusCode::OK).await
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn overlapping_entry_is_rejected_but_touching_is_fine(pool: PgPool) {
    let s = setup(pool).await;

    let first = add_entry(
        &s.app,
        &s.token,
        s.routine_id,
        s.subject_id,
        MONDAY,
        "09:00:00",
        "10:00:00",
    )
    .await;
    let first = expect_json(first, StatusCode::CREATED).await;
    assert_eq!(first["duration_minutes"], 60);
    assert_eq!(first["subject_name"], "Physics");

    let clash = add_entry(
        &s.app,
        &s.token,
        s.routine_id,
        s.subject_id,
        MONDAY,
        "09:30:00",
        "10:30:00",
    )
    .await;
    let clash = expect_json(clash, StatusCode::BAD_REQUEST).await;
    assert_eq!(clash["code"], "VALIDATION_ERROR");

    let touching = add_entry(
        &s.app,
        &s.token,
        s.routine_id,
        s.subject_id,
        MONDAY,
        "10:00:00",
        "11:00:00",
    )
    .await;
    assert_eq!(touching.status(), StatusCode::CREATED);

    let other_day = add_entry(
        &s.app,
        &s.token,
        s.routine_id,
        s.subject_id,
        TUESDAY,
        "09:30:00",
        "10:30:00",
    )
    .await;
    assert_eq!(other_day.status(), StatusCode::CREATED);

    let detail = routine_detail(&s).await;
    let days = detail["entries_by_day"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["day_name"], "Monday");
    let monday = days[0]["entries"].as_array().unwrap();
    assert_eq!(monday.len(), 2);
    assert_eq!(monday[0]["start_time"], "09:00:00");
    assert_eq!(monday[1]["start_time"], "10:00:00");
    assert_eq!(days[1]["entries"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn entry_must_end_after_it_starts(pool: PgPool) {
    let s = setup(pool).await;
    let response = add_entry(
        &s.app,
        &s.token,
        s.routine_id,
        s.subject_id,
        MONDAY,
        "10:00:00",
        "10:00:00",
    )
    .await;
    expect_json(response, StatusCode::BAD_REQUEST).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn entry_subject_must_share_the_semester(pool: PgPool) {
    let s = setup(pool).await;
    let other = create_semester(&s.app, &s.token, "Summer", d(2026, 6, 1), d(2026, 8, 31)).await;
    let foreign = create_subject(&s.app, &s.token, other["id"].as_i64().unwrap(), "Art").await;

    let response = add_entry(
        &s.app,
        &s.token,
        s.routine_id,
        foreign["id"].as_i64().unwrap(),
        MONDAY,
        "09:00:00",
        "10:00:00",
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["field"], "subject_id");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_create_is_all_or_nothing(pool: PgPool) {
    let s = setup(pool).await;
    let uri = format!("/api/v1/routines/{}/entries/bulk", s.routine_id);

    let clashing = json!({ "entries": [
        { "subject_id": s.subject_id, "day_of_week": MONDAY, "start_time": "09:00:00", "end_time": "10:00:00" },
        { "subject_id": s.subject_id, "day_of_week": TUESDAY, "start_time": "09:00:00", "end_time": "10:00:00" },
        { "subject_id": s.subject_id, "day_of_week": MONDAY, "start_time": "09:45:00", "end_time": "10:45:00" },
    ]});
    let response = post_json(s.app.clone(), &uri, &s.token, clashing).await;
    expect_json(response, StatusCode::BAD_REQUEST).await;

    let detail = routine_detail(&s).await;
    assert!(detail["entries_by_day"]
        .as_array()
        .unwrap()
        .iter()
        .all(|day| day["entries"].as_array().unwrap().is_empty()));

    let clean = json!({ "entries": [
        { "subject_id": s.subject_id, "day_of_week": MONDAY, "start_time": "09:00:00", "end_time": "10:00:00" },
        { "subject_id": s.subject_id, "day_of_week": MONDAY, "start_time": "10:00:00", "end_time": "11:30:00" },
    ]});
    let response = post_json(s.app.clone(), &uri, &s.token, clean).await;
    let json = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(json["entries"].as_array().unwrap().len(), 2);
    assert_eq!(json["message"], "Created 2 routine entries.");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn one_routine_per_semester(pool: PgPool) {
    let s = setup(pool).await;
    let response = post_json(
        s.app.clone(),
        "/api/v1/routines",
        &s.token,
        json!({ "semester_id": s.semester_id }),
    )
    .await;
    let json = expect_json(response, StatusCode::CONFLICT).await;
    assert_eq!(json["field"], "semester_id");
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn generation_is_idempotent(pool: PgPool) {
    let s = setup(pool).await;
    // 2026-01-05 and 2026-01-12 are Mondays.
    add_entry(&s.app, &s.token, s.routine_id, s.subject_id, MONDAY, "09:00:00", "10:00:00").await;
    let uri = format!("/api/v1/routines/{}/generate", s.routine_id);
    let range = json!({ "start_date": "2026-01-05", "end_date": "2026-01-18" });

    let first = expect_json(
        post_json(s.app.clone(), &uri, &s.token, range.clone()).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(first["data"]["count"], 2);
    assert_eq!(first["data"]["message"], "Generated 2 class sessions.");
    let records = first["data"]["records"].as_array().unwrap();
    assert!(records
        .iter()
        .all(|r| r["status"] == "absent" && r["attendance_type"] == "routine"));

    let second = expect_json(
        post_json(s.app.clone(), &uri, &s.token, range).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(second["data"]["count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn generation_range_is_capped(pool: PgPool) {
    let s = setup(pool).await;
    let uri = format!("/api/v1/routines/{}/generate", s.routine_id);

    let too_long = json!({ "start_date": "2026-01-01", "end_date": "2026-04-02" });
    let json = expect_json(
        post_json(s.app.clone(), &uri, &s.token, too_long).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["field"], "end_date");

    let backwards = json!({ "start_date": "2026-01-10", "end_date": "2026-01-09" });
    expect_json(
        post_json(s.app.clone(), &uri, &s.token, backwards).await,
        StatusCode::BAD_REQUEST,
    )
    .await;

    // Exactly 90 days apart is still allowed.
    let at_cap = json!({ "start_date": "2026-01-01", "end_date": "2026-04-01" });
    let response = post_json(s.app.clone(), &uri, &s.token, at_cap).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn overlapping_generation_runs_never_duplicate_a_slot(pool: PgPool) {
    let s = setup(pool.clone()).await;
    add_entry(&s.app, &s.token, s.routine_id, s.subject_id, MONDAY, "09:00:00", "10:00:00").await;
    add_entry(&s.app, &s.token, s.routine_id, s.subject_id, TUESDAY, "13:00:00", "14:00:00").await;
    let routine = RoutineRepo::find_by_semester(&pool, s.semester_id)
        .await
        .unwrap()
        .unwrap();

    // January 2026 has four Mondays and four Tuesdays; the runs share 10..=20.
    let (early, late) = tokio::join!(
        generate_for_range(&pool, &routine, d(2026, 1, 1), d(2026, 1, 20), 90),
        generate_for_range(&pool, &routine, d(2026, 1, 10), d(2026, 1, 31), 90),
    );
    let (early, late) = (early.unwrap(), late.unwrap());
    assert_eq!(early.count + late.count, 8);

    let duplicated: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM (
             SELECT 1 FROM attendance_records
             WHERE subject_id = $1 AND deleted_at IS NULL
             GROUP BY subject_id, date, start_time
             HAVING count(*) > 1
         ) d",
    )
    .bind(s.subject_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(duplicated, 0);

    let total: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM attendance_records WHERE subject_id = $1 AND deleted_at IS NULL",
    )
    .bind(s.subject_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(total, 8);
}
