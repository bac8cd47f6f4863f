//! Subject model and DTOs.

use rollcall_core::analytics::SubjectInfo;
use rollcall_core::percentage::Percentage;
use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_MIN_ATTENDANCE: f64 = 75.0;
pub const DEFAULT_COLOR: &str = "#3B82F6";

/// A row from the `subjects` table. `NUMERIC` columns are read as `float8`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subject {
    pub id: DbId,
    pub semester_id: DbId,
    pub name: String,
    pub code: Option<String>,
    pub credit: f64,
    pub min_attendance_percentage: f64,
    pub color: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subject {
    pub fn min_required(&self) -> Percentage {
        Percentage::from_f64(self.min_attendance_percentage)
    }

    pub fn info(&self) -> SubjectInfo {
        SubjectInfo {
            id: self.id,
            name: self.name.clone(),
            code: self.code.clone(),
            min_required: self.min_required(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubject {
    pub semester_id: DbId,
    pub name: String,
    pub code: Option<String>,
    pub credit: f64,
    /// Defaults to 75.00.
    pub min_attendance_percentage: Option<f64>,
    /// Defaults to `#3B82F6`.
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubject {
    pub name: Option<String>,
    pub code: Option<String>,
    pub credit: Option<f64>,
    pub min_attendance_percentage: Option<f64>,
    pub color: Option<String>,
}
