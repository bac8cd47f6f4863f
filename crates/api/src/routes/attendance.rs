//! Route definitions for the `/attendance` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::attendance;
use crate::state::AppState;

/// Routes mounted at `/attendance`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /today           -> today_records
/// GET    /calendar        -> calendar
/// POST   /bulk-update     -> bulk_update
/// POST   /mark-day        -> mark_day
/// POST   /adhoc           -> adhoc
/// POST   /generate        -> generate
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete
/// POST   /{id}/restore    -> restore
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(attendance::list).post(attendance::create))
        .route("/today", get(attendance::today_records))
        .route("/calendar", get(attendance::calendar))
        .route("/bulk-update", post(attendance::bulk_update))
        .route("/mark-day", post(attendance::mark_day))
        .route("/adhoc", post(attendance::adhoc))
        .route("/generate", post(attendance::generate))
        .route(
            "/{id}",
            get(attendance::get_by_id)
                .put(attendance::update)
                .delete(attendance::delete),
        )
        .route("/{id}/restore", post(attendance::restore))
}
