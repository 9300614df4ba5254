use std::sync::Arc;

use lex_core::leaderboard::{self, Standing};
use lex_core::model::{CalendarEvent, LeaderboardEntry, Settings};
use serde::Serialize;
use storage::Storage;

use crate::academics_service::{AcademicsService, CourseOverview};
use crate::error::{AppServicesError, DashboardError};
use crate::finance_service::FinanceService;
use crate::fitness_service::FitnessService;
use crate::leaderboard_service::LeaderboardService;
use crate::timetable_service::TimetableService;
use crate::Clock;

/// Everything shown on the home screen.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dashboard {
    pub courses: Vec<CourseOverview>,
    pub spent_this_month: u64,
    pub total_budget: u64,
    /// Remaining events today, by start time.
    pub schedule: Vec<CalendarEvent>,
    pub steps_ring: Option<u32>,
    pub weekly_leader: Option<LeaderboardEntry>,
}

/// Assembles app-facing services over one storage.
#[derive(Clone)]
pub struct AppServices {
    academics: Arc<AcademicsService>,
    timetable: Arc<TimetableService>,
    finance: Arc<FinanceService>,
    fitness: Arc<FitnessService>,
    leaderboard: Arc<LeaderboardService>,
}

impl AppServices {
    /// Build services over in-memory storage filled with the start-up data.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Seed` if the seed data cannot be built or stored.
    pub fn in_memory(settings: &Settings, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::seeded(settings.seed(), clock.now())?;
        tracing::info!(seed = settings.seed(), now = %clock.now(), "storage seeded");
        Ok(Self::from_storage(&storage, settings, clock))
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, settings: &Settings, clock: Clock) -> Self {
        Self {
            academics: Arc::new(AcademicsService::new(clock, Arc::clone(&storage.courses))),
            timetable: Arc::new(TimetableService::new(
                clock,
                settings.layout_config(),
                Arc::clone(&storage.events),
            )),
            finance: Arc::new(FinanceService::new(
                clock,
                Arc::clone(&storage.transactions),
                Arc::clone(&storage.budgets),
            )),
            fitness: Arc::new(FitnessService::new(Arc::clone(&storage.fitness))),
            leaderboard: Arc::new(LeaderboardService::new(
                clock,
                Arc::clone(&storage.leaderboard),
            )),
        }
    }

    #[must_use]
    pub fn academics(&self) -> Arc<AcademicsService> {
        Arc::clone(&self.academics)
    }

    #[must_use]
    pub fn timetable(&self) -> Arc<TimetableService> {
        Arc::clone(&self.timetable)
    }

    #[must_use]
    pub fn finance(&self) -> Arc<FinanceService> {
        Arc::clone(&self.finance)
    }

    #[must_use]
    pub fn fitness(&self) -> Arc<FitnessService> {
        Arc::clone(&self.fitness)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }

    /// # Errors
    ///
    /// Returns `DashboardError` wrapping the first service that fails.
    pub fn dashboard(&self) -> Result<Dashboard, DashboardError> {
        let entries = self.leaderboard.entries()?;
        let weekly_leader = leaderboard::rank(&entries, Standing::Weekly)
            .podium
            .first()
            .map(|ranked| ranked.entry.clone());

        Ok(Dashboard {
            courses: self.academics.overview()?,
            spent_this_month: self.finance.current_month_spending()?,
            total_budget: self.finance.total_budget()?,
            schedule: self.timetable.upcoming()?,
            steps_ring: self.fitness.steps_ring()?,
            weekly_leader,
        })
    }
}
