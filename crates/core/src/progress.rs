//! Course progress and upcoming-assessment resolution.
//!
//! Both are pure functions of an assessment list and an injected `now`.
//! Progress is the share of assessments whose due instant has passed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Assessment;

/// Percentage (0–100) of `assessments` that are already past, rounded half up.
///
/// An empty list is 0% complete.
///
/// # Examples
///
/// ```
/// # use lex_core::progress::calculate_progress;
/// # use lex_core::time::fixed_now;
/// assert_eq!(calculate_progress(&[], fixed_now()), 0);
/// ```
#[must_use]
pub fn calculate_progress(assessments: &[Assessment], now: DateTime<Utc>) -> u8 {
    let total = assessments.len();
    if total == 0 {
        return 0;
    }
    let past = assessments.iter().filter(|a| a.is_past(now)).count();
    // round(100 * past / total) with halves rounding up
    let percent = (past * 200 + total) / (total * 2);
    u8::try_from(percent).unwrap_or(100)
}

/// The closest assessment that is still ahead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextAssessment {
    pub kind: String,
    pub days_left: i64,
}

impl NextAssessment {
    #[must_use]
    pub fn urgency(&self) -> Urgency {
        Urgency::from_days_left(self.days_left)
    }

    /// "Midsem due in 5 days", "Lab 2 due tomorrow".
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.kind, due_phrase(self.days_left))
    }
}

/// Nearest assessment with at least one day left; ties keep input order.
///
/// Returns `None` when every assessment is due today or earlier.
#[must_use]
pub fn next_assessment(assessments: &[Assessment], now: DateTime<Utc>) -> Option<NextAssessment> {
    assessments
        .iter()
        .map(|a| (a, a.days_left(now)))
        .filter(|(_, days_left)| *days_left > 0)
        // min_by_key keeps the first minimum
        .min_by_key(|(_, days_left)| *days_left)
        .map(|(a, days_left)| NextAssessment {
            kind: a.kind().to_owned(),
            days_left,
        })
}

/// How pressing an assessment is, for colouring course cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Already due.
    Past,
    /// Due within a week.
    Urgent,
    /// Due within fifteen days.
    Soon,
    Relaxed,
}

impl Urgency {
    #[must_use]
    pub fn from_days_left(days_left: i64) -> Self {
        match days_left {
            d if d < 0 => Urgency::Past,
            0..=7 => Urgency::Urgent,
            8..=15 => Urgency::Soon,
            _ => Urgency::Relaxed,
        }
    }
}

fn due_phrase(days_left: i64) -> String {
    match days_left {
        0 => "due today".to_owned(),
        1 => "due tomorrow".to_owned(),
        d if d < 0 => format!("was due {} days ago", -d),
        d => format!("due in {d} days"),
    }
}

/// One row of a course's assessment timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry<'a> {
    pub assessment: &'a Assessment,
    pub days_left: i64,
    pub is_past: bool,
}

impl TimelineEntry<'_> {
    #[must_use]
    pub fn urgency(&self) -> Urgency {
        if self.is_past {
            Urgency::Past
        } else {
            Urgency::from_days_left(self.days_left)
        }
    }
}

/// Assessments in date order (stable for equal dates), each tagged past/upcoming.
#[must_use]
pub fn timeline(assessments: &[Assessment], now: DateTime<Utc>) -> Vec<TimelineEntry<'_>> {
    let mut entries: Vec<_> = assessments
        .iter()
        .map(|assessment| TimelineEntry {
            assessment,
            days_left: assessment.days_left(now),
            is_past: assessment.is_past(now),
        })
        .collect();
    entries.sort_by_key(|entry| entry.assessment.date());
    entries
}
