//! rollcall HTTP API: semesters, subjects, weekly routines, attendance
//! records and the analytics computed over them.
//!
//! The binary in `main.rs` is a thin wrapper; everything it serves is built
//! by [`router::build_app_router`], which the integration tests also use.

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
