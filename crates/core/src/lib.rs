//! Domain logic for the rollcall attendance tracker.
//!
//! Nothing in here touches the database or HTTP. The `db` and `api` crates
//! feed rows in and serialize the results out.

pub mod alerts;
pub mod analytics;
pub mod error;
pub mod generation;
pub mod percentage;
pub mod schedule;
pub mod trends;
pub mod types;
