use thiserror::Error;

use crate::finance::UnknownPeriod;
use crate::model::{
    AssessmentError, CourseError, EventError, ParseIdError, SettingsError, TransactionError,
    UnknownStatKind,
};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    StatKind(#[from] UnknownStatKind),
    #[error(transparent)]
    Period(#[from] UnknownPeriod),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}
