//! Route definitions for the `/routines` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::routine;
use crate::state::AppState;

/// Routes mounted at `/routines`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete
/// POST   /{id}/entries          -> create_entry
/// POST   /{id}/entries/bulk     -> bulk_create_entries
/// POST   /{id}/generate         -> generate
/// POST   /{id}/generate-today   -> generate_today
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(routine::list).post(routine::create))
        .route(
            "/{id}",
            get(routine::get_by_id)
                .put(routine::update)
                .delete(routine::delete),
        )
        .route("/{id}/entries", post(routine::create_entry))
        .route("/{id}/entries/bulk", post(routine::bulk_create_entries))
        .route("/{id}/generate", post(routine::generate))
        .route("/{id}/generate-today", post(routine::generate_today))
}
