//! Shared error types for the services crate.

use thiserror::Error;

use lex_core::model::{AssessmentError, CourseError, CourseId, EventError};
use storage::{SeedError, StorageError};

/// Errors emitted by `AcademicsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AcademicsError {
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
    #[error("assessment index {index} out of range (course has {len})")]
    AssessmentIndex { index: usize, len: usize },
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Course(CourseError),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for AcademicsError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidCourse(course) => course.into(),
            other => AcademicsError::Storage(other),
        }
    }
}

impl From<CourseError> for AcademicsError {
    fn from(err: CourseError) -> Self {
        match err {
            CourseError::AssessmentIndex { index, len } => {
                AcademicsError::AssessmentIndex { index, len }
            }
            other => AcademicsError::Course(other),
        }
    }
}

/// Errors emitted by `TimetableService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TimetableError {
    #[error(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `FinanceService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FinanceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `FitnessService` and `LeaderboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActivityError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Seed(#[from] SeedError),
}

/// Errors emitted while assembling the dashboard.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error(transparent)]
    Academics(#[from] AcademicsError),
    #[error(transparent)]
    Timetable(#[from] TimetableError),
    #[error(transparent)]
    Finance(#[from] FinanceError),
    #[error(transparent)]
    Activity(#[from] ActivityError),
}
