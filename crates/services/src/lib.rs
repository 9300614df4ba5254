#![forbid(unsafe_code)]

pub mod academics_service;
pub mod app_services;
pub mod error;
pub mod finance_service;
pub mod fitness_service;
pub mod leaderboard_service;
pub mod timetable_service;

pub use lex_core::Clock;

pub use academics_service::{AcademicsService, CourseOverview, TimelineRow};
pub use app_services::{AppServices, Dashboard};
pub use error::{
    AcademicsError, ActivityError, AppServicesError, DashboardError, FinanceError, TimetableError,
};
pub use finance_service::{FinanceOverview, FinanceService, RECENT_LIMIT};
pub use fitness_service::{FitnessService, StatDetail};
pub use leaderboard_service::LeaderboardService;
pub use timetable_service::{TimetableDay, TimetableService};
