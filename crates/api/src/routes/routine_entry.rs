//! Route definitions for the `/routine-entries` resource.
//!
//! Entries are created through `/routines/{id}/entries`.

use axum::routing::put;
use axum::Router;

use crate::handlers::routine_entry;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        put(routine_entry::update).delete(routine_entry::delete),
    )
}
