//! Attendance analytics.
//!
//! Counts come in from storage (marked records per status) and from the
//! routine (expected sessions per weekday). Sessions the routine implies but
//! nobody marked count as absences; cancelled sessions leave the denominator.

use chrono::NaiveDate;
use serde::Serialize;

use crate::generation::dates_between;
use crate::percentage::Percentage;
use crate::schedule::{AttendanceStatus, DayOfWeek};
use crate::types::DbId;

/// Distance above the minimum, inclusive, that still counts as borderline
/// (five percentage points).
pub const BORDERLINE_MARGIN: Percentage = Percentage::from_hundredths(500);

// ---------------------------------------------------------------------------
// Standing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Standing {
    Safe,
    Borderline,
    Shortage,
}

impl Standing {
    pub fn classify(percentage: Percentage, min_required: Percentage) -> Self {
        if percentage < min_required {
            Self::Shortage
        } else if percentage.hundredths() - min_required.hundredths()
            <= BORDERLINE_MARGIN.hundredths()
        {
            Self::Borderline
        } else {
            Self::Safe
        }
    }
}

// ---------------------------------------------------------------------------
// Expected classes
// ---------------------------------------------------------------------------

/// Inclusive date window analytics looks at: semester start through
/// `min(today, semester end)`. `None` when the semester has not started.
pub fn analytics_window(
    semester_start: NaiveDate,
    semester_end: NaiveDate,
    today: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let end = today.min(semester_end);
    (semester_start <= end).then_some((semester_start, end))
}

/// Routine entries per weekday for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekdayHistogram([i64; 7]);

impl WeekdayHistogram {
    pub fn from_days(days: impl IntoIterator<Item = DayOfWeek>) -> Self {
        let mut counts = [0; 7];
        for day in days {
            counts[day.index() as usize] += 1;
        }
        Self(counts)
    }

    pub fn on(&self, day: DayOfWeek) -> i64 {
        self.0[day.index() as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }
}

/// Sessions the routine implies between `start` and `end` inclusive.
pub fn count_expected_classes(histogram: &WeekdayHistogram, start: NaiveDate, end: NaiveDate) -> i64 {
    if histogram.is_empty() {
        return 0;
    }
    dates_between(start, end)
        .map(|date| histogram.on(DayOfWeek::of(date)))
        .sum()
}

// ---------------------------------------------------------------------------
// Subject analytics
// ---------------------------------------------------------------------------

/// Marked records per status inside the analytics window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub present: i64,
    pub absent: i64,
    pub cancelled: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: AttendanceStatus, count: i64) {
        match status {
            AttendanceStatus::Present => self.present += count,
            AttendanceStatus::Absent => self.absent += count,
            AttendanceStatus::Cancelled => self.cancelled += count,
        }
    }

    pub fn marked(&self) -> i64 {
        self.present + self.absent + self.cancelled
    }
}

/// Subject identity and policy needed to build its analytics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectInfo {
    pub id: DbId,
    pub name: String,
    pub code: Option<String>,
    pub min_required: Percentage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectAnalytics {
    pub subject_id: DbId,
    pub subject_name: String,
    pub subject_code: Option<String>,
    pub total_conducted: i64,
    pub total_attended: i64,
    pub total_absent: i64,
    pub total_cancelled: i64,
    pub attendance_percentage: Percentage,
    pub min_required_percentage: Percentage,
    pub status: Standing,
    /// `None` means there is no limit (minimum of 0%).
    pub classes_can_miss: Option<i64>,
    /// `None` means the minimum can never be reached (100% after a miss).
    pub classes_need_to_attend: Option<i64>,
}

/// Combine marked counts with the expected session count.
pub fn subject_analytics(info: &SubjectInfo, counts: StatusCounts, expected: i64) -> SubjectAnalytics {
    let unmarked = (expected - counts.marked()).max(0);
    let total_absent = counts.absent + unmarked;
    let total_conducted = expected - counts.cancelled;
    let total_attended = counts.present;

    let (attendance_percentage, status) = match Percentage::from_ratio(total_attended, total_conducted) {
        Some(pct) => (pct, Standing::classify(pct, info.min_required)),
        None => (Percentage::HUNDRED, Standing::Safe),
    };

    SubjectAnalytics {
        subject_id: info.id,
        subject_name: info.name.clone(),
        subject_code: info.code.clone(),
        total_conducted,
        total_attended,
        total_absent,
        total_cancelled: counts.cancelled,
        attendance_percentage,
        min_required_percentage: info.min_required,
        status,
        classes_can_miss: classes_can_miss(total_attended, total_conducted, info.min_required),
        classes_need_to_attend: classes_needed(total_attended, total_conducted, info.min_required),
    }
}

// ---------------------------------------------------------------------------
// Margins
// ---------------------------------------------------------------------------

const FULL: i64 = Percentage::HUNDRED.hundredths();

/// Largest `n` such that `present / (total + n) >= min`.
///
/// `None` when the minimum is zero or below (no limit).
pub fn classes_can_miss(present: i64, total: i64, min: Percentage) -> Option<i64> {
    let h = min.hundredths();
    if h <= 0 {
        return None;
    }
    if h >= FULL {
        return Some(0);
    }
    let slack = present * FULL - h * total;
    Some(slack.div_euclid(h).max(0))
}

/// Smallest whole `n` such that `(present + n) / (total + n) >= min`, with
/// exact boundaries rounded up to the next class.
///
/// `None` when the minimum is 100% and already missed (unreachable).
pub fn classes_needed(present: i64, total: i64, min: Percentage) -> Option<i64> {
    if total == 0 {
        return Some(0);
    }
    let h = min.hundredths();
    if present * FULL >= h * total {
        return Some(0);
    }
    if h >= FULL {
        return None;
    }
    let deficit = h * total - present * FULL;
    Some(deficit.div_euclid(FULL - h) + 1)
}

// ---------------------------------------------------------------------------
// Semester analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemesterSummary {
    pub id: DbId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemesterOverview {
    pub total_subjects: usize,
    pub overall_attendance: Percentage,
    pub subjects_safe: usize,
    pub subjects_borderline: usize,
    pub subjects_shortage: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemesterAnalytics {
    pub semester: SemesterSummary,
    pub overview: SemesterOverview,
    pub subjects: Vec<SubjectAnalytics>,
}

pub fn semester_analytics(semester: SemesterSummary, subjects: Vec<SubjectAnalytics>) -> SemesterAnalytics {
    let conducted: i64 = subjects.iter().map(|s| s.total_conducted).sum();
    let attended: i64 = subjects.iter().map(|s| s.total_attended).sum();
    let count = |standing: Standing| subjects.iter().filter(|s| s.status == standing).count();

    let overview = SemesterOverview {
        total_subjects: subjects.len(),
        overall_attendance: Percentage::from_ratio(attended, conducted).unwrap_or(Percentage::HUNDRED),
        subjects_safe: count(Standing::Safe),
        subjects_borderline: count(Standing::Borderline),
        subjects_shortage: count(Standing::Shortage),
    };

    SemesterAnalytics {
        semester,
        overview,
        subjects,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
