use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use thiserror::Error;
use url::Url;

use crate::model::assessment::Assessment;
use crate::model::ids::CourseId;
use crate::progress::calculate_progress;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course code cannot be empty")]
    EmptyCode,

    #[error("course code {code:?} cannot be turned into a course id")]
    InvalidCode { code: String },

    #[error("course name cannot be empty")]
    EmptyName,

    #[error("link title cannot be empty")]
    EmptyLinkTitle,

    #[error("invalid link URL: {raw:?}")]
    InvalidLinkUrl { raw: String },

    #[error("assessment index {index} out of range (course has {len})")]
    AssessmentIndex { index: usize, len: usize },
}

//
// ─── LINKS ─────────────────────────────────────────────────────────────────────
//

/// Where a course link points. Seeded courses carry `#` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Url(Url),
    Placeholder,
}

impl LinkTarget {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            LinkTarget::Url(url) => url.as_str(),
            LinkTarget::Placeholder => "#",
        }
    }
}

impl Serialize for LinkTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseLink {
    title: String,
    target: LinkTarget,
}

impl CourseLink {
    /// `#` or an empty target is stored as a placeholder; anything else must be an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyLinkTitle` or `CourseError::InvalidLinkUrl`.
    pub fn new(title: impl Into<String>, target: &str) -> Result<Self, CourseError> {
        let title: String = title.into();
        let title = title.trim().to_owned();
        if title.is_empty() {
            return Err(CourseError::EmptyLinkTitle);
        }
        let target = match target.trim() {
            "" | "#" => LinkTarget::Placeholder,
            raw => Url::parse(raw)
                .map(LinkTarget::Url)
                .map_err(|_| CourseError::InvalidLinkUrl {
                    raw: raw.to_owned(),
                })?,
        };
        Ok(Self { title, target })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn target(&self) -> &LinkTarget {
        &self.target
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A course with its assessments and a cached completion percentage.
///
/// `progress` is refreshed by every method that touches `assessments`, so it
/// can never lag behind them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    id: CourseId,
    code: String,
    name: String,
    assessments: Vec<Assessment>,
    links: Vec<CourseLink>,
    progress: u8,
}

impl Course {
    /// Creates a course keyed by the slug of its code.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` if the code or name is blank, or the code has no valid slug.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        assessments: Vec<Assessment>,
        links: Vec<CourseLink>,
        now: DateTime<Utc>,
    ) -> Result<Self, CourseError> {
        let code: String = code.into();
        let code = code.trim().to_owned();
        if code.is_empty() {
            return Err(CourseError::EmptyCode);
        }
        let name: String = name.into();
        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(CourseError::EmptyName);
        }
        let id = CourseId::from_code(&code).ok_or_else(|| CourseError::InvalidCode {
            code: code.clone(),
        })?;
        let progress = calculate_progress(&assessments, now);

        Ok(Self {
            id,
            code,
            name,
            assessments,
            links,
            progress,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn assessments(&self) -> &[Assessment] {
        &self.assessments
    }

    #[must_use]
    pub fn links(&self) -> &[CourseLink] {
        &self.links
    }

    /// Completion percentage as of the last write.
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn refresh_progress(&mut self, now: DateTime<Utc>) {
        self.progress = calculate_progress(&self.assessments, now);
    }

    pub fn add_assessment(&mut self, assessment: Assessment, now: DateTime<Utc>) {
        self.assessments.push(assessment);
        self.refresh_progress(now);
    }

    /// Replaces the assessment at `index`, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::AssessmentIndex` if `index` is out of range.
    pub fn replace_assessment(
        &mut self,
        index: usize,
        assessment: Assessment,
        now: DateTime<Utc>,
    ) -> Result<Assessment, CourseError> {
        let len = self.assessments.len();
        let slot = self
            .assessments
            .get_mut(index)
            .ok_or(CourseError::AssessmentIndex { index, len })?;
        let previous = std::mem::replace(slot, assessment);
        self.refresh_progress(now);
        Ok(previous)
    }

    /// Removes the assessment at `index`, preserving the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::AssessmentIndex` if `index` is out of range.
    pub fn remove_assessment(
        &mut self,
        index: usize,
        now: DateTime<Utc>,
    ) -> Result<Assessment, CourseError> {
        let len = self.assessments.len();
        if index >= len {
            return Err(CourseError::AssessmentIndex { index, len });
        }
        let removed = self.assessments.remove(index);
        self.refresh_progress(now);
        Ok(removed)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn assessment(kind: &str, offset_days: i64) -> Assessment {
        let date = (fixed_now() + Duration::days(offset_days)).date_naive();
        Assessment::new(kind, date).unwrap()
    }

    fn course(assessments: Vec<Assessment>) -> Course {
        Course::new(
            "CS F303",
            "Computer Networks",
            assessments,
            vec![CourseLink::new("Wireshark Labs", "#").unwrap()],
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn new_derives_id_and_progress() {
        let course = course(vec![assessment("Quiz 1", -10), assessment("Midsem", 5)]);
        assert_eq!(course.id().as_str(), "cs-f303");
        assert_eq!(course.progress(), 50);
    }

    #[test]
    fn new_rejects_blank_fields() {
        let err = Course::new(" ", "Networks", vec![], vec![], fixed_now()).unwrap_err();
        assert_eq!(err, CourseError::EmptyCode);

        let err = Course::new("CS F303", "", vec![], vec![], fixed_now()).unwrap_err();
        assert_eq!(err, CourseError::EmptyName);
    }

    #[test]
    fn mutations_refresh_progress() {
        let now = fixed_now();
        let mut course = course(vec![assessment("Quiz 1", -10), assessment("Midsem", 5)]);

        course.add_assessment(assessment("Quiz 2", -2), now);
        assert_eq!(course.progress(), 67);

        let previous = course
            .replace_assessment(1, assessment("Midsem", -1), now)
            .unwrap();
        assert_eq!(previous.kind(), "Midsem");
        assert_eq!(course.progress(), 100);

        let removed = course.remove_assessment(0, now).unwrap();
        assert_eq!(removed.kind(), "Quiz 1");
        assert_eq!(course.assessments().len(), 2);
        assert_eq!(course.progress(), 100);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let now = fixed_now();
        let mut course = course(vec![assessment("Quiz 1", -10)]);

        let err = course.remove_assessment(3, now).unwrap_err();
        assert_eq!(err, CourseError::AssessmentIndex { index: 3, len: 1 });

        let err = course
            .replace_assessment(1, assessment("Quiz 2", 3), now)
            .unwrap_err();
        assert_eq!(err, CourseError::AssessmentIndex { index: 1, len: 1 });
        assert_eq!(course.progress(), 100);
    }

    #[test]
    fn link_targets() {
        let placeholder = CourseLink::new("Impartus", "#").unwrap();
        assert_eq!(placeholder.target(), &LinkTarget::Placeholder);
        assert_eq!(placeholder.target().as_str(), "#");

        let url = CourseLink::new("Docs", "https://www.antlr.org/").unwrap();
        assert_eq!(url.target().as_str(), "https://www.antlr.org/");

        let err = CourseLink::new("Broken", "not a url").unwrap_err();
        assert!(matches!(err, CourseError::InvalidLinkUrl { .. }));

        let err = CourseLink::new("  ", "#").unwrap_err();
        assert_eq!(err, CourseError::EmptyLinkTitle);
    }
}
