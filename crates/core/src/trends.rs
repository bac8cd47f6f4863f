//! Weekly and monthly attendance trends.
//!
//! Buckets have a zero-conducted percentage of `0.0`, unlike subject analytics
//! which reports 100% for the same case. Both conventions are exposed as-is.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::schedule::AttendanceStatus;

pub const DEFAULT_TREND_WEEKS: u32 = 8;
pub const DEFAULT_TREND_MONTHS: u32 = 6;

/// A trailing month is approximated as thirty days.
const DAYS_PER_TREND_MONTH: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Week,
    Month,
}

impl Granularity {
    /// First date of the trailing window ending at `today`.
    pub fn window_start(self, today: NaiveDate, periods: u32) -> NaiveDate {
        let days = match self {
            Self::Week => 7 * u64::from(periods),
            Self::Month => DAYS_PER_TREND_MONTH * u64::from(periods),
        };
        today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
    }

    /// Calendar bucket containing `date`.
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Week => week_start(date),
            Self::Month => month_start(date),
        }
    }

    pub fn label(self, bucket_start: NaiveDate) -> String {
        match self {
            Self::Week => bucket_start.format("%Y-%m-%d").to_string(),
            Self::Month => bucket_start.format("%B %Y").to_string(),
        }
    }
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period_label: String,
    pub period_start: NaiveDate,
    pub present: i64,
    pub absent: i64,
    pub cancelled: i64,
    pub conducted: i64,
    pub percentage: f64,
}

/// Group `(date, status)` observations into calendar buckets, oldest first.
///
/// Only buckets that contain at least one record are emitted.
pub fn aggregate(
    granularity: Granularity,
    records: impl IntoIterator<Item = (NaiveDate, AttendanceStatus)>,
) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, [i64; 3]> = BTreeMap::new();
    for (date, status) in records {
        let slot = buckets.entry(granularity.bucket_start(date)).or_default();
        match status {
            AttendanceStatus::Present => slot[0] += 1,
            AttendanceStatus::Absent => slot[1] += 1,
            AttendanceStatus::Cancelled => slot[2] += 1,
        }
    }

    buckets
        .into_iter()
        .map(|(start, [present, absent, cancelled])| {
            let conducted = present + absent;
            TrendPoint {
                period_label: granularity.label(start),
                period_start: start,
                present,
                absent,
                cancelled,
                conducted,
                percentage: bucket_percentage(present, conducted),
            }
        })
        .collect()
}

fn bucket_percentage(present: i64, conducted: i64) -> f64 {
    if conducted <= 0 {
        return 0.0;
    }
    let raw = present as f64 * 100.0 / conducted as f64;
    (raw * 100.0).round() / 100.0
}
