//! Response envelopes shared across handlers.

use serde::Serialize;

/// `{ "data": ... }` envelope for computed (non-CRUD) results.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Number of rows touched by a bulk mutation.
#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub updated: u64,
}
