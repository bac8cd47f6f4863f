//! Attendance alerts derived from subject analytics.

use serde::Serialize;

use crate::analytics::{Standing, SubjectAnalytics};
use crate::percentage::Percentage;
use crate::types::DbId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Shortage,
    Borderline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Sort rank, most severe first.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

/// The margin an alert carries depends on its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertMargin {
    ClassesNeeded(Option<i64>),
    ClassesCanMiss(Option<i64>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub subject_id: DbId,
    pub subject_name: String,
    pub message: String,
    pub current_percentage: Percentage,
    pub required_percentage: Percentage,
    #[serde(flatten)]
    pub margin: AlertMargin,
}

impl Alert {
    /// Alert for one subject, or `None` when it is safe.
    pub fn for_subject(analytics: &SubjectAnalytics) -> Option<Self> {
        let current = analytics.attendance_percentage;
        let required = analytics.min_required_percentage;
        let (kind, severity, headline, margin) = match analytics.status {
            Standing::Safe => return None,
            Standing::Shortage => (
                AlertKind::Shortage,
                Severity::High,
                "Attendance shortage!",
                AlertMargin::ClassesNeeded(analytics.classes_need_to_attend),
            ),
            Standing::Borderline => (
                AlertKind::Borderline,
                Severity::Medium,
                "Near minimum!",
                AlertMargin::ClassesCanMiss(analytics.classes_can_miss),
            ),
        };

        Some(Self {
            kind,
            severity,
            subject_id: analytics.subject_id,
            subject_name: analytics.subject_name.clone(),
            message: format!("{headline} Current: {current}%, Required: {required}%"),
            current_percentage: current,
            required_percentage: required,
            margin,
        })
    }
}

/// Alerts for every non-safe subject, most severe first.
///
/// The sort is stable: subjects of equal severity keep their input order.
pub fn build_alerts<'a>(subjects: impl IntoIterator<Item = &'a SubjectAnalytics>) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = subjects.into_iter().filter_map(Alert::for_subject).collect();
    alerts.sort_by_key(|a| a.severity.rank());
    alerts
}
