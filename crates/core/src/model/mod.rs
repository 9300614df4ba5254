mod assessment;
mod budget;
mod course;
mod event;
mod fitness;
mod ids;
mod leaderboard;
mod transaction;
pub mod settings;

pub use assessment::{parse_assessment_date, Assessment, AssessmentDraft, AssessmentError};
pub use budget::CategoryBudgets;
pub use course::{Course, CourseError, CourseLink, LinkTarget};
pub use event::{
    CalendarEvent, EventCategory, EventDraft, EventError, TimeOfDay, ValidatedEvent,
    COURSE_EVENT_COLOR, OTHER_EVENT_COLOR,
};
pub use fitness::{DailyReading, FitnessStat, StatKind, UnknownStatKind};
pub use ids::{CourseId, EntryId, EventId, ParseIdError, TransactionId};
pub use leaderboard::LeaderboardEntry;
pub use settings::{Settings, SettingsDraft, SettingsError};
pub use transaction::{PaymentProvider, SpendCategory, Transaction, TransactionError};
