//! Class generation planning.
//!
//! Turns weekly routine slots into concrete per-date class sessions. The
//! planner is pure: it says *which* sessions a date should have, and the
//! storage layer decides which of them already exist.

use chrono::{Days, NaiveDate, NaiveTime};

use crate::error::CoreError;
use crate::schedule::{duration_minutes, validate_time_range, AttendanceKind, DayOfWeek, WeeklySlot};
use crate::types::DbId;

/// Default cap on the span of a single generate-for-range request.
pub const DEFAULT_MAX_GENERATION_DAYS: i64 = 90;

/// A routine entry reduced to what generation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutineSlot {
    pub entry_id: DbId,
    pub subject_id: DbId,
    pub slot: WeeklySlot,
}

/// A session that should exist on `date`, before it is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedClass {
    pub routine_entry_id: DbId,
    pub subject_id: DbId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Sessions implied by `slots` on a single date, in slot order.
pub fn plan_for_date(slots: &[RoutineSlot], date: NaiveDate) -> Vec<PlannedClass> {
    let day = DayOfWeek::of(date);
    slots
        .iter()
        .filter(|s| s.slot.day == day)
        .map(|s| PlannedClass {
            routine_entry_id: s.entry_id,
            subject_id: s.subject_id,
            date,
            start_time: s.slot.start_time,
            end_time: s.slot.end_time,
            duration_minutes: s.slot.duration_minutes(),
        })
        .collect()
}

/// Every calendar date from `start` to `end`, both inclusive.
///
/// Yields nothing when `start > end`.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), |d| d.checked_add_days(Days::new(1)))
        .take_while(move |d| *d <= end)
}

/// Sessions implied by `slots` over an inclusive date range, ordered by date.
pub fn plan_for_range(slots: &[RoutineSlot], start: NaiveDate, end: NaiveDate) -> Vec<PlannedClass> {
    dates_between(start, end)
        .flat_map(|date| plan_for_date(slots, date))
        .collect()
}

/// The date daily generation should run for, if `today` is inside the
/// semester.
pub fn daily_generation_date(
    today: NaiveDate,
    semester_start: NaiveDate,
    semester_end: NaiveDate,
) -> Option<NaiveDate> {
    (semester_start..=semester_end)
        .contains(&today)
        .then_some(today)
}

/// Caller-side checks for a generate-for-range request.
///
/// The span is measured as `end - start` in days, so a 90-day cap admits
/// 91 calendar dates.
pub fn validate_generation_range(
    start: NaiveDate,
    end: NaiveDate,
    max_days: i64,
) -> Result<(), CoreError> {
    if start > end {
        return Err(CoreError::invalid(
            "end_date",
            "Start date must be before or equal to end date.",
        ));
    }
    if (end - start).num_days() > max_days {
        return Err(CoreError::invalid(
            "end_date",
            format!("Cannot generate more than {max_days} days at once."),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Manual / ad-hoc timing
// ---------------------------------------------------------------------------

/// Validated timing for a manually created session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
}

/// Check the time fields of a manually created record and fill in the
/// duration when both ends are known.
///
/// Ad-hoc sessions must carry a start/end pair or an explicit duration.
pub fn resolve_session_timing(
    kind: AttendanceKind,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    duration: Option<i32>,
) -> Result<SessionTiming, CoreError> {
    if let Some(minutes) = duration {
        if minutes <= 0 {
            return Err(CoreError::invalid(
                "duration_minutes",
                "Duration must be a positive number of minutes.",
            ));
        }
    }

    let has_pair = start_time.is_some() && end_time.is_some();
    if kind == AttendanceKind::Adhoc && !has_pair && duration.is_none() {
        return Err(CoreError::Validation(
            "Ad-hoc classes must have either start/end times or duration.".to_string(),
        ));
    }

    let duration_minutes = match (start_time, end_time) {
        (Some(start), Some(end)) => {
            validate_time_range(start, end)?;
            duration.or(Some(duration_minutes(start, end)))
        }
        _ => duration,
    };

    Ok(SessionTiming {
        start_time,
        end_time,
        duration_minutes,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
