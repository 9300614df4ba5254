use std::sync::Arc;

use lex_core::fitness::{self, ProgressMessage};
use lex_core::model::{FitnessStat, StatKind};
use serde::Serialize;
use storage::{FitnessRepository, StorageError};

use crate::error::ActivityError;

/// A stat page: the stat plus its derived progress and coaching copy.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatDetail {
    pub stat: FitnessStat,
    /// 0–100.
    pub progress: f64,
    #[serde(flatten)]
    pub message: ProgressMessage,
}

#[derive(Clone)]
pub struct FitnessService {
    stats: Arc<dyn FitnessRepository>,
}

impl FitnessService {
    #[must_use]
    pub fn new(stats: Arc<dyn FitnessRepository>) -> Self {
        Self { stats }
    }

    /// # Errors
    ///
    /// Returns `ActivityError::Storage` if repository access fails.
    pub fn list_stats(&self) -> Result<Vec<FitnessStat>, ActivityError> {
        Ok(self.stats.list_stats()?)
    }

    /// Stat by kind, `None` when it is not tracked.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::Storage` for failures other than a missing stat.
    pub fn stat(&self, kind: StatKind) -> Result<Option<FitnessStat>, ActivityError> {
        match self.stats.get_stat(kind) {
            Ok(stat) => Ok(Some(stat)),
            Err(StorageError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// # Errors
    ///
    /// Returns `ActivityError::Storage` for failures other than a missing stat.
    pub fn detail(&self, kind: StatKind) -> Result<Option<StatDetail>, ActivityError> {
        Ok(self.stat(kind)?.map(|stat| StatDetail {
            progress: fitness::progress_percentage(stat.kind, stat.value, stat.goal),
            message: fitness::progress_message(stat.kind, stat.value, stat.goal),
            stat,
        }))
    }

    /// Dashboard ring fill for today's steps, `None` if steps are not tracked.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::Storage` for failures other than a missing stat.
    pub fn steps_ring(&self) -> Result<Option<u32>, ActivityError> {
        Ok(self
            .stat(StatKind::Steps)?
            .map(|steps| fitness::steps_ring_percent(steps.value, steps.goal)))
    }
}
