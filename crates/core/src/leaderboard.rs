//! Ranking and the weekly reset countdown.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::LeaderboardEntry;
use crate::time::start_of_day;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    #[default]
    Weekly,
    AllTime,
}

impl Standing {
    #[must_use]
    pub fn points(self, entry: &LeaderboardEntry) -> u32 {
        match self {
            Standing::Weekly => entry.weekly_points,
            Standing::AllTime => entry.all_time_points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry<'a> {
    /// 1-based.
    pub rank: usize,
    pub points: u32,
    pub entry: &'a LeaderboardEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rankings<'a> {
    pub standing: Standing,
    /// At most three.
    pub podium: Vec<RankedEntry<'a>>,
    pub rest: Vec<RankedEntry<'a>>,
}

const PODIUM_SIZE: usize = 3;

/// Entries by points descending; equal points keep their input order.
#[must_use]
pub fn rank(entries: &[LeaderboardEntry], standing: Standing) -> Rankings<'_> {
    let mut sorted: Vec<&LeaderboardEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| standing.points(b).cmp(&standing.points(a)));

    let mut ranked: Vec<RankedEntry<'_>> = sorted
        .into_iter()
        .enumerate()
        .map(|(i, entry)| RankedEntry {
            rank: i + 1,
            points: standing.points(entry),
            entry,
        })
        .collect();

    let rest = ranked.split_off(ranked.len().min(PODIUM_SIZE));
    Rankings {
        standing,
        podium: ranked,
        rest,
    }
}

/// Time left until the weekly board resets on Saturday at 23:59:59.999.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyCountdown(Duration);

impl WeeklyCountdown {
    #[must_use]
    pub fn until_reset(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let days_to_saturday = 6 - i64::from(today.weekday().num_days_from_sunday());
        let saturday = today + Duration::days(days_to_saturday);
        let reset = start_of_day(saturday) + Duration::days(1) - Duration::milliseconds(1);
        Self(reset - now)
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.0
    }
}

impl fmt::Display for WeeklyCountdown {
    /// `Xd Yh Zm`, each part floored.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_minutes = self.0.num_minutes();
        let days = total_minutes / (24 * 60);
        let hours = total_minutes % (24 * 60) / 60;
        let minutes = total_minutes % 60;
        write!(f, "{days}d {hours}h {minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryId;
    use crate::time::fixed_now;
    use chrono::TimeZone;

    fn entry(id: u64, weekly: u32, all_time: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            id: EntryId::new(id),
            name: format!("Player {id}"),
            weekly_points: weekly,
            all_time_points: all_time,
            avatar: String::new(),
        }
    }

    fn ids(ranked: &[RankedEntry<'_>]) -> Vec<u64> {
        ranked.iter().map(|r| r.entry.id.value()).collect()
    }

    #[test]
    fn weekly_and_all_time_orders_differ() {
        let entries = vec![
            entry(1, 500, 9000),
            entry(2, 2500, 1000),
            entry(3, 800, 12000),
            entry(4, 100, 3000),
        ];

        let weekly = rank(&entries, Standing::Weekly);
        assert_eq!(ids(&weekly.podium), vec![2, 3, 1]);
        assert_eq!(ids(&weekly.rest), vec![4]);
        assert_eq!(weekly.rest[0].rank, 4);

        let all_time = rank(&entries, Standing::AllTime);
        assert_eq!(ids(&all_time.podium), vec![3, 1, 4]);
        assert_eq!(all_time.podium[0].points, 12000);
    }

    #[test]
    fn ties_keep_input_order_and_short_lists_fit_the_podium() {
        let entries = vec![entry(1, 10, 0), entry(2, 10, 0)];
        let ranked = rank(&entries, Standing::Weekly);
        assert_eq!(ids(&ranked.podium), vec![1, 2]);
        assert!(ranked.rest.is_empty());

        assert!(rank(&[], Standing::Weekly).podium.is_empty());
    }

    #[test]
    fn countdown_to_saturday_night() {
        // Tue 22:13:20 -> Sat 23:59:59.999
        let countdown = WeeklyCountdown::until_reset(fixed_now());
        assert_eq!(countdown.to_string(), "4d 1h 46m");

        let saturday_noon = Utc.with_ymd_and_hms(2023, 11, 18, 12, 0, 0).unwrap();
        assert_eq!(
            WeeklyCountdown::until_reset(saturday_noon).to_string(),
            "0d 11h 59m"
        );

        let sunday = Utc.with_ymd_and_hms(2023, 11, 19, 0, 0, 0).unwrap();
        assert_eq!(WeeklyCountdown::until_reset(sunday).to_string(), "6d 23h 59m");
    }
}
