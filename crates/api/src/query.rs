//! Shared query parameter types for API handlers.

use chrono::NaiveDate;
use rollcall_core::types::DbId;
use serde::Deserialize;

/// `?include_deleted=true` on list endpoints of soft-deletable entities.
#[derive(Debug, Deserialize)]
pub struct IncludeDeletedParams {
    #[serde(default)]
    pub include_deleted: bool,
}

/// `?semester_id=` narrowing for subject and routine listings.
#[derive(Debug, Deserialize)]
pub struct SemesterFilterParams {
    pub semester_id: Option<DbId>,
}

/// `?weeks=` for weekly trends.
#[derive(Debug, Deserialize)]
pub struct WeeklyTrendParams {
    pub weeks: Option<u32>,
}

/// `?months=` for monthly trends.
#[derive(Debug, Deserialize)]
pub struct MonthlyTrendParams {
    pub months: Option<u32>,
}

/// Optional `?start_date=&end_date=` bounds.
#[derive(Debug, Deserialize)]
pub struct DateBoundsParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// `?year=&month=&semester_id=` for the attendance calendar. Year and month
/// default to the current ones.
#[derive(Debug, Deserialize)]
pub struct CalendarParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub semester_id: Option<DbId>,
}
