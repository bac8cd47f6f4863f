//! Attendance record model, DTOs and aggregate rows.

use chrono::{NaiveDate, NaiveTime};
use rollcall_core::schedule::{AttendanceKind, AttendanceStatus};
use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `attendance_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceRecord {
    pub id: DbId,
    pub subject_id: DbId,
    pub routine_entry_id: Option<DbId>,
    pub date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: AttendanceStatus,
    #[sqlx(try_from = "String")]
    pub attendance_type: AttendanceKind,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub is_holiday: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A record joined with its subject for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceRecordDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub subject_name: String,
    pub subject_color: String,
}

/// Fully validated values for a manual insert.
#[derive(Debug, Clone)]
pub struct NewAttendanceRecord {
    pub subject_id: DbId,
    pub routine_entry_id: Option<DbId>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub attendance_type: AttendanceKind,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub is_holiday: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAttendanceRecord {
    pub subject_id: DbId,
    pub routine_entry_id: Option<DbId>,
    pub date: NaiveDate,
    /// Defaults to `absent`.
    pub status: Option<AttendanceStatus>,
    /// Defaults to `routine`.
    pub attendance_type: Option<AttendanceKind>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_holiday: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdhocRecord {
    pub subject_id: DbId,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    /// Defaults to `absent`.
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAttendanceRecord {
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
    pub is_holiday: Option<bool>,
}

/// Filters for listing records. All optional; combined with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceFilter {
    pub subject_id: Option<DbId>,
    pub semester_id: Option<DbId>,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    pub attendance_type: Option<AttendanceKind>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkStatusUpdate {
    pub record_ids: Vec<DbId>,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkDay {
    pub semester_id: DbId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Count of records per status, as returned by grouped queries.
#[derive(Debug, Clone, FromRow)]
pub struct StatusCountRow {
    #[sqlx(try_from = "String")]
    pub status: AttendanceStatus,
    pub count: i64,
}

/// Per-day status totals for the calendar view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub cancelled: i64,
}

/// One entry of a subject's attendance timeline.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HistoryItem {
    pub id: DbId,
    pub date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: AttendanceStatus,
    #[sqlx(try_from = "String")]
    pub attendance_type: AttendanceKind,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub is_holiday: bool,
}
