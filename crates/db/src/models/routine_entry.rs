//! Routine entry model and DTOs.

use chrono::NaiveTime;
use rollcall_core::error::CoreError;
use rollcall_core::generation::RoutineSlot;
use rollcall_core::schedule::{DayOfWeek, WeeklySlot};
use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `routine_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoutineEntry {
    pub id: DbId,
    pub routine_id: DbId,
    pub subject_id: DbId,
    #[sqlx(try_from = "i16")]
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: Option<String>,
    pub notes: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RoutineEntry {
    /// Rows satisfy `start_time < end_time` through a table constraint.
    pub fn slot(&self) -> WeeklySlot {
        WeeklySlot {
            day: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }

    pub fn routine_slot(&self) -> RoutineSlot {
        RoutineSlot {
            entry_id: self.id,
            subject_id: self.subject_id,
            slot: self.slot(),
        }
    }
}

/// An entry joined with its subject for display.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoutineEntryDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: RoutineEntry,
    pub subject_name: String,
    pub subject_color: String,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoutineEntry {
    pub subject_id: DbId,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: Option<String>,
    pub notes: Option<String>,
}

impl CreateRoutineEntry {
    pub fn slot(&self) -> Result<WeeklySlot, CoreError> {
        WeeklySlot::new(self.day_of_week, self.start_time, self.end_time)
    }
}

/// Several entries created against one routine in a single transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkCreateRoutineEntries {
    pub entries: Vec<CreateRoutineEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoutineEntry {
    pub subject_id: Option<DbId>,
    pub day_of_week: Option<DayOfWeek>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub room: Option<String>,
    pub notes: Option<String>,
}

impl UpdateRoutineEntry {
    /// The slot this entry would occupy after applying the update.
    pub fn merged_slot(&self, current: &RoutineEntry) -> Result<WeeklySlot, CoreError> {
        WeeklySlot::new(
            self.day_of_week.unwrap_or(current.day_of_week),
            self.start_time.unwrap_or(current.start_time),
            self.end_time.unwrap_or(current.end_time),
        )
    }
}
