use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use lex_core::model::{Assessment, AssessmentDraft, Course, CourseId};
use lex_core::progress::{self, NextAssessment, TimelineEntry};
use serde::Serialize;
use storage::{CourseEdit, CourseRepository, StorageError};

use crate::error::AcademicsError;
use crate::Clock;

/// A course card on the academics page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CourseOverview {
    pub course: Course,
    pub next: Option<NextAssessment>,
}

/// A memoized answer and the inputs it was computed from.
struct CachedNext {
    at: DateTime<Utc>,
    assessments: Vec<Assessment>,
    next: Option<NextAssessment>,
}

impl CachedNext {
    fn answers(&self, course: &Course, now: DateTime<Utc>) -> bool {
        self.at == now && self.assessments == course.assessments()
    }
}

/// Reads courses and edits their assessment lists.
///
/// Next-assessment answers are memoized per course. A memo is reused only for
/// the same instant and the same assessment list as the freshly loaded course,
/// so writes through other handles on the repository are never missed.
/// Edits run through [`CourseRepository::update_course`] and cannot interleave.
pub struct AcademicsService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
    next_cache: Mutex<HashMap<CourseId, CachedNext>>,
}

impl AcademicsService {
    #[must_use]
    pub fn new(clock: Clock, courses: Arc<dyn CourseRepository>) -> Self {
        Self {
            clock,
            courses,
            next_cache: Mutex::new(HashMap::new()),
        }
    }

    /// All courses in enrolment order.
    ///
    /// # Errors
    ///
    /// Returns `AcademicsError::Storage` if repository access fails.
    pub fn list_courses(&self) -> Result<Vec<Course>, AcademicsError> {
        Ok(self.courses.list_courses()?)
    }

    /// Course by id, `None` when unknown.
    ///
    /// # Errors
    ///
    /// Returns `AcademicsError::Storage` for failures other than a missing course.
    pub fn course(&self, id: &CourseId) -> Result<Option<Course>, AcademicsError> {
        match self.courses.get_course(id) {
            Ok(course) => Ok(Some(course)),
            Err(StorageError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Every course with its next assessment.
    ///
    /// # Errors
    ///
    /// Returns `AcademicsError::Storage` if repository access fails.
    pub fn overview(&self) -> Result<Vec<CourseOverview>, AcademicsError> {
        let now = self.clock.now();
        Ok(self
            .list_courses()?
            .into_iter()
            .map(|course| {
                let next = self.cached_next(&course, now);
                CourseOverview { course, next }
            })
            .collect())
    }

    /// Closest upcoming assessment of a course, `None` when the course is
    /// unknown or has nothing ahead.
    ///
    /// # Errors
    ///
    /// Returns `AcademicsError::Storage` if repository access fails.
    pub fn next_assessment(&self, id: &CourseId) -> Result<Option<NextAssessment>, AcademicsError> {
        let now = self.clock.now();
        Ok(self
            .course(id)?
            .and_then(|course| self.cached_next(&course, now)))
    }

    /// The course's assessments in date order with days left at the current instant.
    ///
    /// # Errors
    ///
    /// Returns `AcademicsError::CourseNotFound` or `AcademicsError::Storage`.
    pub fn timeline(&self, id: &CourseId) -> Result<Vec<TimelineRow>, AcademicsError> {
        let course = self.require(id)?;
        let now = self.clock.now();
        Ok(progress::timeline(course.assessments(), now)
            .into_iter()
            .map(TimelineRow::from)
            .collect())
    }

    /// Appends an assessment and returns the updated course.
    ///
    /// # Errors
    ///
    /// Returns `AcademicsError::Assessment` for invalid input,
    /// `AcademicsError::CourseNotFound` for an unknown course,
    /// or `AcademicsError::Storage` if persistence fails.
    pub fn add_assessment(
        &self,
        id: &CourseId,
        draft: AssessmentDraft,
    ) -> Result<Course, AcademicsError> {
        let assessment = draft.validate()?;
        let now = self.clock.now();
        let course = self.update(id, &mut |course| {
            course.add_assessment(assessment.clone(), now);
            Ok(())
        })?;
        tracing::info!(course = %id, count = course.assessments().len(), "assessment added");
        Ok(course)
    }

    /// Replaces the assessment at `index`.
    ///
    /// # Errors
    ///
    /// Returns `AcademicsError::AssessmentIndex` when `index` is out of range,
    /// plus the errors of [`Self::add_assessment`].
    pub fn edit_assessment(
        &self,
        id: &CourseId,
        index: usize,
        draft: AssessmentDraft,
    ) -> Result<Course, AcademicsError> {
        let assessment = draft.validate()?;
        let now = self.clock.now();
        let course = self.update(id, &mut |course| {
            course
                .replace_assessment(index, assessment.clone(), now)
                .map(drop)
        })?;
        tracing::info!(course = %id, index, "assessment edited");
        Ok(course)
    }

    /// Removes the assessment at `index`.
    ///
    /// # Errors
    ///
    /// Returns `AcademicsError::AssessmentIndex` when `index` is out of range,
    /// `AcademicsError::CourseNotFound`, or `AcademicsError::Storage`.
    pub fn delete_assessment(&self, id: &CourseId, index: usize) -> Result<Course, AcademicsError> {
        let now = self.clock.now();
        let course = self.update(id, &mut |course| {
            course.remove_assessment(index, now).map(drop)
        })?;
        tracing::info!(course = %id, index, "assessment deleted");
        Ok(course)
    }

    fn require(&self, id: &CourseId) -> Result<Course, AcademicsError> {
        self.course(id)?
            .ok_or_else(|| AcademicsError::CourseNotFound(id.clone()))
    }

    fn update(
        &self,
        id: &CourseId,
        edit: &mut CourseEdit<'_>,
    ) -> Result<Course, AcademicsError> {
        let course = match self.courses.update_course(id, edit) {
            Ok(course) => course,
            Err(StorageError::NotFound) => return Err(AcademicsError::CourseNotFound(id.clone())),
            Err(err) => return Err(err.into()),
        };
        if let Ok(mut cache) = self.next_cache.lock() {
            cache.remove(course.id());
        }
        Ok(course)
    }

    fn cached_next(&self, course: &Course, now: DateTime<Utc>) -> Option<NextAssessment> {
        let Ok(mut cache) = self.next_cache.lock() else {
            // poisoned cache: compute without memoizing
            return progress::next_assessment(course.assessments(), now);
        };
        if let Some(cached) = cache.get(course.id()).filter(|c| c.answers(course, now)) {
            tracing::trace!(course = %course.id(), "next assessment cache hit");
            return cached.next.clone();
        }
        let next = progress::next_assessment(course.assessments(), now);
        tracing::debug!(
            course = %course.id(),
            days_left = next.as_ref().map(|n| n.days_left),
            "next assessment resolved"
        );
        cache.insert(
            course.id().clone(),
            CachedNext {
                at: now,
                assessments: course.assessments().to_vec(),
                next: next.clone(),
            },
        );
        next
    }
}

/// Owned form of a timeline entry for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimelineRow {
    pub kind: String,
    pub date: chrono::NaiveDate,
    pub days_left: i64,
    pub is_past: bool,
    pub urgency: progress::Urgency,
}

impl From<TimelineEntry<'_>> for TimelineRow {
    fn from(entry: TimelineEntry<'_>) -> Self {
        Self {
            kind: entry.assessment.kind().to_owned(),
            date: entry.assessment.date(),
            days_left: entry.days_left,
            is_past: entry.is_past,
            urgency: entry.urgency(),
        }
    }
}
