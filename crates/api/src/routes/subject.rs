//! Route definitions for the `/subjects` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{analytics, subject};
use crate::state::AppState;

/// Routes mounted at `/subjects`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete
/// POST   /{id}/restore          -> restore
/// GET    /{id}/analytics        -> analytics::subject
/// GET    /{id}/trends/weekly    -> analytics::weekly_trends
/// GET    /{id}/trends/monthly   -> analytics::monthly_trends
/// GET    /{id}/history          -> analytics::history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(subject::list).post(subject::create))
        .route(
            "/{id}",
            get(subject::get_by_id)
                .put(subject::update)
                .delete(subject::delete),
        )
        .route("/{id}/restore", post(subject::restore))
        .route("/{id}/analytics", get(analytics::subject))
        .route("/{id}/trends/weekly", get(analytics::weekly_trends))
        .route("/{id}/trends/monthly", get(analytics::monthly_trends))
        .route("/{id}/history", get(analytics::history))
}
