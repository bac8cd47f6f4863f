#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use chrono::{Days, NaiveDate};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use rollcall_api::auth::jwt::{generate_access_token, JwtConfig};
use rollcall_api::config::ServerConfig;
use rollcall_api::router::build_app_router;
use rollcall_api::state::AppState;
use rollcall_db::repositories::UserRepo;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_generation_days: 90,
        jwt: JwtConfig {
            secret: "test-secret-do-not-use-in-production".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router, with the production middleware stack,
/// on top of the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

/// Insert a user and return `(user_id, bearer_token)`.
pub async fn create_user(pool: &PgPool, username: &str) -> (i64, String) {
    let user = UserRepo::create(pool, username).await.unwrap();
    let token = generate_access_token(user.id, &test_config().jwt).unwrap();
    (user.id, token)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn today() -> NaiveDate {
    rollcall_api::engine::today()
}

pub fn days_ago(n: u64) -> NaiveDate {
    today().checked_sub_days(Days::new(n)).unwrap()
}

pub fn days_ahead(n: u64) -> NaiveDate {
    today().checked_add_days(Days::new(n)).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

/// POST without a body, for action endpoints like `/restore`.
pub async fn post_empty(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status, then return the parsed body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    let actual = response.status();
    let json = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Fixtures through the API
// ---------------------------------------------------------------------------

pub async fn create_semester(
    app: &Router,
    token: &str,
    name: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Value {
    let response = post_json(
        app.clone(),
        "/api/v1/semesters",
        token,
        serde_json::json!({ "name": name, "start_date": start, "end_date": end }),
    )
    .await;
    expect_json(response, StatusCode::CREATED).await
}

pub async fn create_subject(app: &Router, token: &str, semester_id: i64, name: &str) -> Value {
    let response = post_json(
        app.clone(),
        "/api/v1/subjects",
        token,
        serde_json::json!({ "semester_id": semester_id, "name": name, "credit": 3.0 }),
    )
    .await;
    expect_json(response, StatusCode::CREATED).await
}

pub async fn create_routine(app: &Router, token: &str, semester_id: i64) -> Value {
    let response = post_json(
        app.clone(),
        "/api/v1/routines",
        token,
        serde_json::json!({ "semester_id": semester_id }),
    )
    .await;
    expect_json(response, StatusCode::CREATED).await
}

/// Add a weekly slot; `day` is 0 for Monday through 6 for Sunday.
pub async fn add_entry(
    app: &Router,
    token: &str,
    routine_id: i64,
    subject_id: i64,
    day: i16,
    start: &str,
    end: &str,
) -> Response<Body> {
    post_json(
        app.clone(),
        &format!("/api/v1/routines/{routine_id}/entries"),
        token,
        serde_json::json!({
            "subject_id": subject_id,
            "day_of_week": day,
            "start_time": start,
            "end_time": end,
        }),
    )
    .await
}
