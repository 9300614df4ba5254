use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown fitness stat {raw:?}")]
pub struct UnknownStatKind {
    raw: String,
}

/// The tracked fitness metrics, addressed by slug (`sleep`, `steps`, `water`, `heart`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Sleep,
    Steps,
    Water,
    Heart,
}

impl StatKind {
    pub const ALL: [StatKind; 4] = [
        StatKind::Sleep,
        StatKind::Steps,
        StatKind::Water,
        StatKind::Heart,
    ];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            StatKind::Sleep => "sleep",
            StatKind::Steps => "steps",
            StatKind::Water => "water",
            StatKind::Heart => "heart",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for StatKind {
    type Err = UnknownStatKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        StatKind::ALL
            .into_iter()
            .find(|k| k.slug().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownStatKind { raw: s.to_owned() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyReading {
    pub date: NaiveDate,
    pub value: f64,
}

/// Latest reading of one metric plus its recent history and goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessStat {
    pub kind: StatKind,
    pub title: String,
    pub value: f64,
    /// Percent change versus last week.
    pub weekly_change: i32,
    /// Percent change versus last month.
    pub monthly_change: i32,
    /// Oldest first.
    pub week_data: Vec<DailyReading>,
    pub unit: String,
    pub goal: f64,
}
