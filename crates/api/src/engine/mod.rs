//! Orchestration of the pure `rollcall_core` planners and calculators over
//! the repositories.
//!
//! - [`generation`] -- materializes routine slots into attendance records.
//! - [`analytics`] -- subject and semester statistics, alerts and trends.
//! - [`schedule`] -- routine entry writes with the overlap check.

pub mod analytics;
pub mod generation;
pub mod schedule;

use chrono::{Local, NaiveDate};

/// The calendar date engines treat as "today", in the server's local
/// timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
