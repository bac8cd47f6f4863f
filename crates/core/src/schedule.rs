//! Schedule vocabulary: weekdays, status enums, time-slot validation.
//!
//! Enum values are stored in the database as their lowercase string forms
//! (or `0..=6` for weekdays), so every enum here has a matching `as_str` /
//! `FromStr` pair.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Day of week
// ---------------------------------------------------------------------------

/// Day of the week, Monday = 0 through Sunday = 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    pub fn from_index(index: i16) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> i16 {
        self as i16
    }

    pub fn of(date: NaiveDate) -> Self {
        // num_days_from_monday is always 0..=6.
        Self::ALL[date.weekday().num_days_from_monday() as usize]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

impl TryFrom<i16> for DayOfWeek {
    type Error = CoreError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::from_index(value).ok_or_else(|| {
            CoreError::invalid("day_of_week", format!("must be 0..6 (Monday=0), got {value}"))
        })
    }
}

impl From<DayOfWeek> for i16 {
    fn from(day: DayOfWeek) -> Self {
        day.index()
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// String-backed enums
// ---------------------------------------------------------------------------

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(CoreError::invalid(
                        $field,
                        format!("unknown value '{other}'"),
                    )),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Lifecycle label of a semester. Informational only.
    SemesterStatus, "status" {
        Active => "active",
        Completed => "completed",
        Upcoming => "upcoming",
    }
}

string_enum! {
    /// Outcome of a single class session.
    AttendanceStatus, "status" {
        Present => "present",
        Absent => "absent",
        Cancelled => "cancelled",
    }
}

string_enum! {
    /// How a session came to exist.
    AttendanceKind, "attendance_type" {
        Routine => "routine",
        Adhoc => "adhoc",
    }
}

// ---------------------------------------------------------------------------
// Time validation
// ---------------------------------------------------------------------------

pub fn validate_time_range(start: NaiveTime, end: NaiveTime) -> Result<(), CoreError> {
    if start >= end {
        return Err(CoreError::invalid(
            "end_time",
            "End time must be after start time.",
        ));
    }
    Ok(())
}

/// Whole minutes between two times of the same day.
pub fn duration_minutes(start: NaiveTime, end: NaiveTime) -> i32 {
    (end - start).num_minutes() as i32
}

/// Half-open interval overlap: `[a_start, a_end)` vs `[b_start, b_end)`.
///
/// Touching endpoints (`09:00-10:00` and `10:00-11:00`) do not overlap.
pub fn intervals_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// A recurring weekly time slot with a validated `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySlot {
    pub day: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl WeeklySlot {
    pub fn new(day: DayOfWeek, start_time: NaiveTime, end_time: NaiveTime) -> Result<Self, CoreError> {
        validate_time_range(start_time, end_time)?;
        Ok(Self {
            day,
            start_time,
            end_time,
        })
    }

    pub fn overlaps(&self, other: &WeeklySlot) -> bool {
        self.day == other.day
            && intervals_overlap(self.start_time, self.end_time, other.start_time, other.end_time)
    }

    pub fn duration_minutes(&self) -> i32 {
        duration_minutes(self.start_time, self.end_time)
    }

    fn time_label(&self) -> String {
        format!(
            "{}-{}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Reject `candidate` if it overlaps any of the `existing` slots.
///
/// `existing` pairs each slot with a display label (the subject name) used in
/// the error message. The caller excludes the entry being updated.
pub fn ensure_no_overlap(
    candidate: &WeeklySlot,
    existing: &[(String, WeeklySlot)],
) -> Result<(), CoreError> {
    match existing.iter().find(|(_, slot)| candidate.overlaps(slot)) {
        Some((label, slot)) => Err(CoreError::Validation(format!(
            "This time slot overlaps with {label} ({})",
            slot.time_label()
        ))),
        None => Ok(()),
    }
}

/// Pairwise overlap check within a batch of new slots.
pub fn ensure_batch_has_no_overlap(batch: &[(String, WeeklySlot)]) -> Result<(), CoreError> {
    for (i, (first_label, first)) in batch.iter().enumerate() {
        for (second_label, second) in &batch[i + 1..] {
            if first.overlaps(second) {
                return Err(CoreError::Validation(format!(
                    "Entries overlap on {}: {first_label} and {second_label}",
                    first.day
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Semester / subject field rules
// ---------------------------------------------------------------------------

pub fn validate_semester_dates(start: NaiveDate, end: NaiveDate) -> Result<(), CoreError> {
    if start >= end {
        return Err(CoreError::invalid(
            "end_date",
            "End date must be after start date.",
        ));
    }
    Ok(())
}

/// The date must fall inside the inclusive semester range.
pub fn ensure_date_in_semester(
    date: NaiveDate,
    semester_start: NaiveDate,
    semester_end: NaiveDate,
) -> Result<(), CoreError> {
    if date < semester_start {
        return Err(CoreError::invalid(
            "date",
            format!("Date is before semester start ({semester_start})"),
        ));
    }
    if date > semester_end {
        return Err(CoreError::invalid(
            "date",
            format!("Date is after semester end ({semester_end})"),
        ));
    }
    Ok(())
}

pub fn validate_min_percentage(value: f64) -> Result<(), CoreError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(CoreError::invalid(
            "min_attendance_percentage",
            format!("must be between 0 and 100, got {value}"),
        ));
    }
    Ok(())
}

pub fn validate_credit(value: f64) -> Result<(), CoreError> {
    if !(0.0..=10.0).contains(&value) {
        return Err(CoreError::invalid(
            "credit",
            format!("must be between 0 and 10, got {value}"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(day: DayOfWeek, start: (u32, u32), end: (u32, u32)) -> WeeklySlot {
        WeeklySlot::new(day, t(start.0, start.1), t(end.0, end.1)).unwrap()
    }

    // -----------------------------------------------------------------------
    // DayOfWeek
    // -----------------------------------------------------------------------

    #[test]
    fn monday_is_zero() {
        let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(DayOfWeek::of(monday), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::Monday.index(), 0);
        assert_eq!(DayOfWeek::Sunday.index(), 6);
    }

    #[test]
    fn day_index_out_of_range_is_rejected() {
        assert_eq!(DayOfWeek::from_index(7), None);
        assert_eq!(DayOfWeek::from_index(-1), None);
        assert_matches!(
            DayOfWeek::try_from(9),
            Err(CoreError::InvalidField { field: "day_of_week", .. })
        );
    }

    // -----------------------------------------------------------------------
    // String enums
    // -----------------------------------------------------------------------

    #[test]
    fn status_parses_lowercase_names() {
        assert_eq!("present".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Present);
        assert_eq!("adhoc".parse::<AttendanceKind>().unwrap(), AttendanceKind::Adhoc);
        assert_eq!(SemesterStatus::Upcoming.as_str(), "upcoming");
    }

    #[test]
    fn unknown_status_names_the_field() {
        assert_matches!(
            "late".parse::<AttendanceStatus>(),
            Err(CoreError::InvalidField { field: "status", .. })
        );
    }

    // -----------------------------------------------------------------------
    // Overlap detection
    // -----------------------------------------------------------------------

    #[test]
    fn overlapping_slots_are_rejected() {
        let existing = vec![(
            "Physics".to_string(),
            slot(DayOfWeek::Monday, (9, 0), (10, 0)),
        )];
        let candidate = slot(DayOfWeek::Monday, (9, 30), (10, 30));
        let err = ensure_no_overlap(&candidate, &existing).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("Physics (09:00-10:00)"));
    }

    #[test]
    fn touching_slots_do_not_overlap() {
        let existing = vec![(
            "Physics".to_string(),
            slot(DayOfWeek::Monday, (9, 0), (10, 0)),
        )];
        let candidate = slot(DayOfWeek::Monday, (10, 0), (11, 0));
        assert!(ensure_no_overlap(&candidate, &existing).is_ok());
    }

    #[test]
    fn same_times_on_different_days_do_not_overlap() {
        let existing = vec![(
            "Physics".to_string(),
            slot(DayOfWeek::Monday, (9, 0), (10, 0)),
        )];
        let candidate = slot(DayOfWeek::Tuesday, (9, 0), (10, 0));
        assert!(ensure_no_overlap(&candidate, &existing).is_ok());
    }

    #[test]
    fn batch_overlap_names_the_day() {
        let batch = vec![
            ("Math".to_string(), slot(DayOfWeek::Friday, (8, 0), (9, 30))),
            ("Art".to_string(), slot(DayOfWeek::Friday, (9, 0), (10, 0))),
        ];
        let err = ensure_batch_has_no_overlap(&batch).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("Friday: Math and Art"));
    }

    #[test]
    fn slot_requires_start_before_end() {
        assert_matches!(
            WeeklySlot::new(DayOfWeek::Monday, t(10, 0), t(10, 0)),
            Err(CoreError::InvalidField { field: "end_time", .. })
        );
    }

    #[test]
    fn duration_is_whole_minutes() {
        assert_eq!(slot(DayOfWeek::Monday, (9, 0), (10, 15)).duration_minutes(), 75);
    }

    // -----------------------------------------------------------------------
    // Semester rules
    // -----------------------------------------------------------------------

    #[test]
    fn semester_end_must_follow_start() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_matches!(
            validate_semester_dates(d, d),
            Err(CoreError::InvalidField { field: "end_date", .. })
        );
    }

    #[test]
    fn date_outside_semester_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert!(ensure_date_in_semester(start, start, end).is_ok());
        assert!(ensure_date_in_semester(end, start, end).is_ok());
        assert_matches!(
            ensure_date_in_semester(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(), start, end),
            Err(CoreError::InvalidField { field: "date", message }) if message.contains("after semester end")
        );
    }

    #[test]
    fn percentage_and_credit_bounds() {
        assert!(validate_min_percentage(0.0).is_ok());
        assert!(validate_min_percentage(100.0).is_ok());
        assert!(validate_min_percentage(100.5).is_err());
        assert!(validate_credit(10.0).is_ok());
        assert!(validate_credit(-0.5).is_err());
    }
}
