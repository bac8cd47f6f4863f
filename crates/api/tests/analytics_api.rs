//! End-to-end analytics: subject and semester summaries, alerts, trends,
//! history and the dashboard, computed over a semester that started nine
//! days ago.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{
    add_entry, build_test_app, create_routine, create_semester, create_subject, create_user,
    days_ago, days_ahead, expect_json, get_auth, post_empty, post_json, today,
};
use serde_json::{json, Value};
use sqlx::PgPool;

struct Scenario {
    token: String,
    app: Router,
    semester_id: i64,
    physics_id: i64,
    history_id: i64,
}

/// Physics meets every day and has 10 sessions so far: 7 present,
/// 1 cancelled, 2 absent. History has no routine slots at all.
async fn scenario(pool: PgPool) -> Scenario {
    let (_, token) = create_user(&pool, "ada").await;
    let app = build_test_app(pool);

    let semester = create_semester(&app, &token, "Current", days_ago(9), days_ahead(30)).await;
    let semester_id = semester["id"].as_i64().unwrap();
    let physics = create_subject(&app, &token, semester_id, "Physics").await;
    let physics_id = physics["id"].as_i64().unwrap();
    let history = create_subject(&app, &token, semester_id, "History").await;
    let routine = create_routine(&app, &token, semester_id).await;
    let routine_id = routine["id"].as_i64().unwrap();

    for day in 0..7 {
        let response = add_entry(
            &app,
            &token,
            routine_id,
            physics_id,
            day,
            "09:00:00",
            "10:00:00",
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let generated = expect_json(
        post_json(
            app.clone(),
            &format!("/api/v1/routines/{routine_id}/generate"),
            &token,
            json!({ "start_date": days_ago(9), "end_date": today() }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(generated["data"]["count"], 10);

    let ids: Vec<i64> = generated["data"]["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    for (chunk, status) in [(&ids[..7], "present"), (&ids[7..8], "cancelled")] {
        let response = post_json(
            app.clone(),
            "/api/v1/attendance/bulk-update",
            &token,
            json!({ "record_ids": chunk, "status": status }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    Scenario {
        token,
        app,
        semester_id,
        physics_id,
        history_id: history["id"].as_i64().unwrap(),
    }
}

async fn fetch(s: &Scenario, uri: &str) -> Value {
    expect_json(get_auth(s.app.clone(), uri, &s.token).await, StatusCode::OK).await
}

// ---------------------------------------------------------------------------
// Subject and semester analytics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn subject_analytics_counts_conducted_classes(pool: PgPool) {
    let s = scenario(pool).await;
    let json = fetch(&s, &format!("/api/v1/subjects/{}/analytics", s.physics_id)).await;

    assert_eq!(json["subject_name"], "Physics");
    assert_eq!(json["total_conducted"], 9);
    assert_eq!(json["total_attended"], 7);
    assert_eq!(json["total_absent"], 2);
    assert_eq!(json["total_cancelled"], 1);
    assert_eq!(json["attendance_percentage"], "77.78");
    assert_eq!(json["min_required_percentage"], "75.00");
    assert_eq!(json["status"], "borderline");
    assert_eq!(json["classes_can_miss"], 0);
    assert_eq!(json["classes_need_to_attend"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn subject_without_classes_is_safe(pool: PgPool) {
    let s = scenario(pool).await;
    let json = fetch(&s, &format!("/api/v1/subjects/{}/analytics", s.history_id)).await;

    assert_eq!(json["total_conducted"], 0);
    assert_eq!(json["attendance_percentage"], "100.00");
    assert_eq!(json["status"], "safe");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn semester_analytics_rolls_up_subjects(pool: PgPool) {
    let s = scenario(pool).await;
    let json = fetch(&s, &format!("/api/v1/semesters/{}/analytics", s.semester_id)).await;

    assert_eq!(json["semester"]["name"], "Current");
    assert_eq!(json["overview"]["total_subjects"], 2);
    assert_eq!(json["overview"]["overall_attendance"], "77.78");
    assert_eq!(json["overview"]["subjects_safe"], 1);
    assert_eq!(json["overview"]["subjects_borderline"], 1);
    assert_eq!(json["overview"]["subjects_shortage"], 0);
    assert_eq!(json["subjects"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn alerts_list_borderline_subject(pool: PgPool) {
    let s = scenario(pool).await;
    let json = fetch(&s, &format!("/api/v1/semesters/{}/alerts", s.semester_id)).await;

    assert_eq!(json["semester_name"], "Current");
    assert_eq!(json["alert_count"], 1);
    let alert = &json["alerts"][0];
    assert_eq!(alert["type"], "borderline");
    assert_eq!(alert["severity"], "medium");
    assert_eq!(alert["subject_id"].as_i64(), Some(s.physics_id));
    assert_eq!(alert["classes_can_miss"], 0);
    assert_eq!(
        alert["message"],
        "Near minimum! Current: 77.78%, Required: 75.00%"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_more_classes_raises_shortage(pool: PgPool) {
    let s = scenario(pool).await;
    let records = fetch(
        &s,
        &format!("/api/v1/attendance?subject_id={}&status=present", s.physics_id),
    )
    .await;
    let two: Vec<i64> = records.as_array().unwrap()[..2]
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    post_json(
        s.app.clone(),
        "/api/v1/attendance/bulk-update",
        &s.token,
        json!({ "record_ids": two, "status": "absent" }),
    )
    .await;

    let json = fetch(&s, &format!("/api/v1/subjects/{}/analytics", s.physics_id)).await;
    assert_eq!(json["attendance_percentage"], "55.56");
    assert_eq!(json["status"], "shortage");
    assert!(json["classes_need_to_attend"].as_i64().unwrap() > 0);

    let alerts = fetch(&s, &format!("/api/v1/semesters/{}/alerts", s.semester_id)).await;
    assert_eq!(alerts["alerts"][0]["type"], "shortage");
    assert_eq!(alerts["alerts"][0]["severity"], "high");
}

// ---------------------------------------------------------------------------
// Trends and history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn weekly_trend_covers_every_record(pool: PgPool) {
    let s = scenario(pool).await;
    let json = fetch(&s, &format!("/api/v1/subjects/{}/trends/weekly", s.physics_id)).await;

    assert_eq!(json["weeks_count"], 8);
    let points = json["trends"].as_array().unwrap();
    let sum = |key: &str| points.iter().map(|p| p[key].as_i64().unwrap()).sum::<i64>();
    assert_eq!(sum("present"), 7);
    assert_eq!(sum("cancelled"), 1);
    assert_eq!(sum("conducted"), 9);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn monthly_trend_honours_requested_months(pool: PgPool) {
    let s = scenario(pool).await;
    let json = fetch(
        &s,
        &format!("/api/v1/subjects/{}/trends/monthly?months=2", s.physics_id),
    )
    .await;

    assert_eq!(json["months_count"], 2);
    let points = json["trends"].as_array().unwrap();
    assert!(!points.is_empty());
    assert!(points.len() <= 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn history_is_newest_first(pool: PgPool) {
    let s = scenario(pool).await;
    let json = fetch(&s, &format!("/api/v1/subjects/{}/history", s.physics_id)).await;

    assert_eq!(json["count"], 10);
    assert_eq!(json["history"][0]["date"], json!(today()));

    let bounded = fetch(
        &s,
        &format!(
            "/api/v1/subjects/{}/history?start_date={}&end_date={}",
            s.physics_id,
            days_ago(2),
            today()
        ),
    )
    .await;
    assert_eq!(bounded["count"], 3);
}

// ---------------------------------------------------------------------------
// Today and dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn todays_classes_are_not_generated_twice(pool: PgPool) {
    let s = scenario(pool).await;

    let run = expect_json(
        post_empty(
            s.app.clone(),
            &format!("/api/v1/semesters/{}/generate-today", s.semester_id),
            &s.token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(run["data"]["count"], 0);

    let json = fetch(&s, &format!("/api/v1/attendance/today?semester_id={}", s.semester_id)).await;
    assert_eq!(json["date"], json!(today()));
    assert_eq!(json["count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_without_semesters(pool: PgPool) {
    let (_, token) = create_user(&pool, "newcomer").await;
    let app = build_test_app(pool);

    let json = expect_json(get_auth(app, "/api/v1/dashboard", &token).await, StatusCode::OK).await;
    assert_eq!(json["has_data"], false);
    assert_eq!(
        json["message"],
        "No semesters found. Please create a semester first."
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_falls_back_to_latest_semester(pool: PgPool) {
    let s = scenario(pool).await;
    let json = fetch(&s, "/api/v1/dashboard").await;

    assert_eq!(json["has_data"], true);
    assert_eq!(json["semester"]["id"].as_i64(), Some(s.semester_id));
    assert_eq!(json["overview"]["total_subjects"], 2);
    assert_eq!(json["alerts"].as_array().unwrap().len(), 1);
    assert_eq!(json["today"]["count"], 1);
    assert_eq!(json["today"]["classes"][0]["subject_name"], "Physics");
}
