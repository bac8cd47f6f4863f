//! Semester model and DTOs.

use chrono::NaiveDate;
use rollcall_core::analytics::SemesterSummary;
use rollcall_core::schedule::SemesterStatus;
use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `semesters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Semester {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: SemesterStatus,
    pub is_current: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Semester {
    pub fn summary(&self) -> SemesterSummary {
        SemesterSummary {
            id: self.id,
            name: self.name.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSemester {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Defaults to `active`.
    pub status: Option<SemesterStatus>,
    #[serde(default)]
    pub is_current: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSemester {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<SemesterStatus>,
}
