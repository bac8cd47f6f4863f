//! Routine model and DTOs.

use rollcall_core::schedule::DayOfWeek;
use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::routine_entry::RoutineEntryDetail;

pub const DEFAULT_ROUTINE_NAME: &str = "Weekly Routine";

/// A row from the `routines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Routine {
    pub id: DbId,
    pub semester_id: DbId,
    pub name: String,
    pub is_active: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoutine {
    pub semester_id: DbId,
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoutine {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// Entries of one weekday, ordered by start time.
#[derive(Debug, Clone, Serialize)]
pub struct DaySchedule {
    pub day_of_week: DayOfWeek,
    pub day_name: &'static str,
    pub entries: Vec<RoutineEntryDetail>,
}

/// A routine with its live entries grouped Monday through Sunday.
#[derive(Debug, Clone, Serialize)]
pub struct RoutineWithEntries {
    #[serde(flatten)]
    pub routine: Routine,
    pub entries_by_day: Vec<DaySchedule>,
}

impl RoutineWithEntries {
    /// Group `entries` by weekday. Input order within a day is preserved, so
    /// callers pass entries sorted by start time. Every weekday is present,
    /// possibly empty.
    pub fn group(routine: Routine, entries: Vec<RoutineEntryDetail>) -> Self {
        let mut entries_by_day: Vec<DaySchedule> = DayOfWeek::ALL
            .iter()
            .map(|&day| DaySchedule {
                day_of_week: day,
                day_name: day.label(),
                entries: Vec::new(),
            })
            .collect();
        for entry in entries {
            entries_by_day[entry.entry.day_of_week.index() as usize]
                .entries
                .push(entry);
        }
        Self {
            routine,
            entries_by_day,
        }
    }
}
