pub mod error;
pub mod finance;
pub mod fitness;
pub mod leaderboard;
pub mod model;
pub mod progress;
pub mod time;
pub mod timetable;

pub use error::Error;
pub use time::Clock;
