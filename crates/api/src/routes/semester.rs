//! Route definitions for the `/semesters` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{analytics, semester};
use crate::state::AppState;

/// Routes mounted at `/semesters`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create
/// GET    /current               -> current
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete
/// POST   /{id}/restore          -> restore
/// POST   /{id}/set-current      -> set_current
/// GET    /{id}/analytics        -> analytics::semester
/// GET    /{id}/alerts           -> analytics::alerts
/// POST   /{id}/generate-today   -> analytics::generate_today
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(semester::list).post(semester::create))
        .route("/current", get(semester::current))
        .route(
            "/{id}",
            get(semester::get_by_id)
                .put(semester::update)
                .delete(semester::delete),
        )
        .route("/{id}/restore", post(semester::restore))
        .route("/{id}/set-current", post(semester::set_current))
        .route("/{id}/analytics", get(analytics::semester))
        .route("/{id}/alerts", get(analytics::alerts))
        .route("/{id}/generate-today", post(analytics::generate_today))
}
