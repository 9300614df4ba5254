use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{days_until_ceil, start_of_day};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("assessment type cannot be empty")]
    EmptyKind,

    #[error("unrecognized assessment date: {raw:?}")]
    InvalidDate { raw: String },
}

/// Date layouts accepted from user input: ISO (`2025-03-06`) and the
/// short/long month forms (`Mar 6, 2025`, `March 6, 2025`).
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y"];

/// Parses an assessment date string.
///
/// # Errors
///
/// Returns `AssessmentError::InvalidDate` when no accepted layout matches.
pub fn parse_assessment_date(raw: &str) -> Result<NaiveDate, AssessmentError> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| AssessmentError::InvalidDate {
            raw: raw.to_owned(),
        })
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated assessment as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssessmentDraft {
    pub kind: String,
    pub date: String,
}

impl AssessmentDraft {
    #[must_use]
    pub fn new(kind: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            date: date.into(),
        }
    }

    /// Validate the draft into an `Assessment`.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError` if the type is blank or the date does not parse.
    pub fn validate(self) -> Result<Assessment, AssessmentError> {
        let date = parse_assessment_date(&self.date)?;
        Assessment::new(self.kind, date)
    }
}

//
// ─── ASSESSMENT ────────────────────────────────────────────────────────────────
//

/// A graded course event: a type label ("Quiz 1", "Midsem") and its due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    kind: String,
    date: NaiveDate,
}

impl Assessment {
    /// # Errors
    ///
    /// Returns `AssessmentError::EmptyKind` if `kind` is blank.
    pub fn new(kind: impl Into<String>, date: NaiveDate) -> Result<Self, AssessmentError> {
        let kind: String = kind.into();
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(AssessmentError::EmptyKind);
        }
        Ok(Self {
            kind: kind.to_owned(),
            date,
        })
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The instant the assessment falls due (midnight UTC of its date).
    #[must_use]
    pub fn due_at(&self) -> DateTime<Utc> {
        start_of_day(self.date)
    }

    /// True once the due instant is strictly before `now`.
    #[must_use]
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.due_at() < now
    }

    /// Days from `now` until the due instant, rounded up.
    #[must_use]
    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        days_until_ceil(now, self.due_at())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
