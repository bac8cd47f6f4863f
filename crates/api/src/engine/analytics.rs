//! Attendance analytics engine.
//!
//! Pulls marked counts and routine weekdays from storage and hands them to
//! the calculators in `rollcall_core`.

use chrono::NaiveDate;
use rollcall_core::alerts::{build_alerts, Alert};
use rollcall_core::analytics::{
    analytics_window, count_expected_classes, semester_analytics as summarize_semester,
    subject_analytics as summarize_subject, SemesterAnalytics, StatusCounts, SubjectAnalytics,
    WeekdayHistogram,
};
use rollcall_core::trends::{aggregate, Granularity, TrendPoint};
use rollcall_db::models::semester::Semester;
use rollcall_db::models::subject::Subject;
use rollcall_db::repositories::{AttendanceRecordRepo, RoutineEntryRepo, SubjectRepo};
use rollcall_db::DbPool;

use crate::error::AppResult;

/// Sessions the semester's routine implies for `subject` up to `today`.
pub async fn count_expected_classes_for(
    pool: &DbPool,
    subject: &Subject,
    semester: &Semester,
    today: NaiveDate,
) -> AppResult<i64> {
    let Some((start, end)) = analytics_window(semester.start_date, semester.end_date, today) else {
        return Ok(0);
    };
    let days = RoutineEntryRepo::days_for_subject(pool, subject.id).await?;
    Ok(count_expected_classes(
        &WeekdayHistogram::from_days(days),
        start,
        end,
    ))
}

pub async fn subject_analytics(
    pool: &DbPool,
    subject: &Subject,
    semester: &Semester,
    today: NaiveDate,
) -> AppResult<SubjectAnalytics> {
    let info = subject.info();
    let Some((start, end)) = analytics_window(semester.start_date, semester.end_date, today) else {
        return Ok(summarize_subject(&info, StatusCounts::default(), 0));
    };

    let mut counts = StatusCounts::default();
    for row in AttendanceRecordRepo::status_counts(pool, subject.id, start, end).await? {
        counts.add(row.status, row.count);
    }
    let expected = count_expected_classes_for(pool, subject, semester, today).await?;

    let analytics = summarize_subject(&info, counts, expected);
    tracing::debug!(
        subject_id = subject.id,
        expected,
        marked = counts.marked(),
        percentage = %analytics.attendance_percentage,
        "Computed subject analytics"
    );
    Ok(analytics)
}

/// Analytics for every live subject of the semester, in name order.
pub async fn semester_analytics(
    pool: &DbPool,
    semester: &Semester,
    today: NaiveDate,
) -> AppResult<SemesterAnalytics> {
    let subjects = SubjectRepo::list_by_semester(pool, semester.id).await?;
    let mut per_subject = Vec::with_capacity(subjects.len());
    for subject in &subjects {
        per_subject.push(subject_analytics(pool, subject, semester, today).await?);
    }
    Ok(summarize_semester(semester.summary(), per_subject))
}

/// Shortage and borderline alerts for the semester, most severe first.
pub async fn alerts(pool: &DbPool, semester: &Semester, today: NaiveDate) -> AppResult<Vec<Alert>> {
    let analytics = semester_analytics(pool, semester, today).await?;
    Ok(build_alerts(&analytics.subjects))
}

/// Bucketed counts over the trailing `periods` weeks or months.
pub async fn trends(
    pool: &DbPool,
    subject: &Subject,
    granularity: Granularity,
    periods: u32,
    today: NaiveDate,
) -> AppResult<Vec<TrendPoint>> {
    let start = granularity.window_start(today, periods);
    let records = AttendanceRecordRepo::dated_statuses(pool, subject.id, start, today).await?;
    Ok(aggregate(granularity, records))
}
