//! Start-up data: the enrolled courses, the weekly timetable, mock spending
//! history, fitness readings and the leaderboard.
//!
//! Everything random is drawn from a `StdRng` seeded by the caller, so the same
//! seed and clock always produce the same store.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use lex_core::model::{
    Assessment, AssessmentDraft, Course, CourseLink, DailyReading, EntryId,
    EventCategory, EventDraft, FitnessStat, LeaderboardEntry, PaymentProvider, SpendCategory,
    StatKind, Transaction, TransactionId,
};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::repository::{InMemoryRepository, Storage, StorageError};
use crate::repository::{
    CourseRepository, EventRepository, FitnessRepository, LeaderboardRepository,
    TransactionRepository,
};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error(transparent)]
    Invalid(#[from] lex_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

//
// ─── COURSES ───────────────────────────────────────────────────────────────────
//

type CourseSeed = (&'static str, &'static str, &'static [(&'static str, &'static str)], &'static [&'static str]);

const COURSES: [CourseSeed; 3] = [
    (
        "BITS F363",
        "Human Computer Interaction",
        &[
            ("Quiz 1", "Feb 18, 2025"),
            ("Midsem", "Mar 6, 2025"),
            ("Quiz 2", "Mar 17, 2025"),
            ("Compre", "Apr 26, 2025"),
        ],
        &["Study Material", "Impartus", "Textbook PDF"],
    ),
    (
        "CS F363",
        "Compiler Construction",
        &[
            ("Lab 1", "Feb 15, 2025"),
            ("Quiz 1", "Feb 22, 2025"),
            ("Midsem", "Mar 8, 2025"),
            ("Lab 2", "Mar 20, 2025"),
            ("Compre", "Apr 28, 2025"),
        ],
        &["Lab Manual", "Dragon Book PDF", "ANTLR Documentation"],
    ),
    (
        "CS F303",
        "Computer Networks",
        &[
            ("Quiz 1", "Feb 20, 2025"),
            ("Midsem", "Mar 10, 2025"),
            ("Project Demo", "Mar 25, 2025"),
            ("Quiz 2", "Apr 5, 2025"),
            ("Compre", "Apr 30, 2025"),
        ],
        &["Wireshark Labs", "Kurose & Ross PDF", "Project Resources"],
    ),
];

/// The three enrolled courses with progress computed at `now`.
///
/// # Errors
///
/// Returns `SeedError::Invalid` if a built-in record fails validation.
pub fn courses(now: DateTime<Utc>) -> Result<Vec<Course>, SeedError> {
    COURSES
        .iter()
        .map(|(code, name, assessments, links)| {
            let assessments = assessments
                .iter()
                .map(|(kind, date)| AssessmentDraft::new(*kind, *date).validate())
                .collect::<Result<Vec<Assessment>, _>>()
                .map_err(lex_core::Error::from)?;
            let links = links
                .iter()
                .map(|title| CourseLink::new(*title, "#"))
                .collect::<Result<Vec<_>, _>>()
                .map_err(lex_core::Error::from)?;
            Course::new(*code, *name, assessments, links, now)
                .map_err(|e| SeedError::Invalid(e.into()))
        })
        .collect()
}

//
// ─── TIMETABLE ─────────────────────────────────────────────────────────────────
//

const EVENTS: [(&str, &str, &str, &str, EventCategory); 12] = [
    ("CS F213 L1", "F-102", "09:00", "10:00", EventCategory::CsF213),
    ("CS F213 L2", "F-105", "14:00", "15:00", EventCategory::CsF213),
    ("CS F213 Tutorial", "F-203", "11:00", "12:00", EventCategory::CsF213),
    ("CS F214 L1", "F-104", "10:00", "11:00", EventCategory::CsF214),
    ("CS F214 L2", "F-102", "15:00", "16:00", EventCategory::CsF214),
    ("CS F214 Lab", "SWLab", "16:00", "19:00", EventCategory::CsF214),
    ("CS F222 L1", "F-103", "12:00", "13:00", EventCategory::CsF222),
    ("CS F222 L2", "F-105", "09:00", "10:00", EventCategory::CsF222),
    ("CS F222 Tutorial", "F-201", "13:00", "14:00", EventCategory::CsF222),
    ("ISRO Panel Talk", "F-102", "14:00", "15:00", EventCategory::Other),
    ("DE Shaw OA", "Online", "14:00", "15:00", EventCategory::Other),
    ("Club Review Meet", "NEW FOOTBALL GROUND", "16:00", "17:00", EventCategory::Other),
];

/// The weekly timetable as unsaved drafts, in display order.
#[must_use]
pub fn event_drafts() -> Vec<EventDraft> {
    EVENTS
        .iter()
        .map(|(title, location, start, end, category)| EventDraft {
            title: (*title).to_owned(),
            location: (*location).to_owned(),
            start: (*start).to_owned(),
            end: (*end).to_owned(),
            category: *category,
            color: None,
        })
        .collect()
}

//
// ─── TRANSACTIONS ──────────────────────────────────────────────────────────────
//

/// First day of the generated spending history.
#[must_use]
pub fn history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 1).unwrap_or(NaiveDate::MIN)
}

const SWD_VENDORS: [&str; 5] = [
    "ANC 1",
    "ANC 2",
    "ANC 1 Juice Shop",
    "ANC 2 Shawarma",
    "ANC 2 Juice Shop",
];
const OTHER_VENDORS: [&str; 7] = [
    "Amazon",
    "Flipkart",
    "Movie Theater",
    "Local Store",
    "Uber",
    "Ola",
    "Stationery Shop",
];

const ACTIVE_DAY_CHANCE: f64 = 0.85;
const SWD_FOOD_CHANCE: f64 = 0.8;
const LARGE_EXPENSE_CHANCE: f64 = 0.1;

fn roll_category(rng: &mut impl Rng) -> SpendCategory {
    match rng.random::<f64>() {
        r if r < 0.35 => SpendCategory::Food,
        r if r < 0.50 => SpendCategory::Entertainment,
        r if r < 0.65 => SpendCategory::Shopping,
        r if r < 0.80 => SpendCategory::Transport,
        _ => SpendCategory::Others,
    }
}

fn roll_amount(rng: &mut impl Rng, category: SpendCategory) -> u64 {
    match category {
        SpendCategory::Food => rng.random_range(30..80),
        SpendCategory::Entertainment => rng.random_range(100..200),
        SpendCategory::Transport => rng.random_range(20..80),
        SpendCategory::Shopping | SpendCategory::Others => {
            if rng.random_bool(LARGE_EXPENSE_CHANCE) {
                rng.random_range(200..500)
            } else {
                rng.random_range(50..200)
            }
        }
    }
}

fn roll_transaction(rng: &mut impl Rng, day: NaiveDate) -> Result<Transaction, SeedError> {
    let category = roll_category(rng);
    let provider = if category == SpendCategory::Food && rng.random_bool(SWD_FOOD_CHANCE) {
        PaymentProvider::SwdPay
    } else {
        PaymentProvider::Cash
    };
    let amount = roll_amount(rng, category);
    let hour = rng.random_range(8..22);
    let minute = rng.random_range(0..60);
    let timestamp = day
        .and_hms_opt(hour, minute, 0)
        .unwrap_or_default()
        .and_utc();
    let vendors: &[&str] = if category == SpendCategory::Food {
        &SWD_VENDORS
    } else {
        &OTHER_VENDORS
    };
    let second_party = vendors.choose(rng).copied().unwrap_or("Local Store");
    let id = TransactionId::from_random_bytes(rng.random());

    Transaction::new(id, amount, timestamp, second_party, provider, category)
        .map_err(|e| SeedError::Invalid(e.into()))
}

/// Mock spending from `start` up to `until`, oldest day first.
///
/// Roughly 85% of days have one to three purchases, weighted toward food.
///
/// # Errors
///
/// Returns `SeedError::Invalid` if a generated transaction fails validation.
pub fn transactions(
    rng: &mut impl Rng,
    start: NaiveDate,
    until: DateTime<Utc>,
) -> Result<Vec<Transaction>, SeedError> {
    let last = until.date_naive();
    let mut generated = Vec::new();
    for day in start.iter_days().take_while(|d| *d <= last) {
        if !rng.random_bool(ACTIVE_DAY_CHANCE) {
            continue;
        }
        let count = rng.random_range(1..=3);
        for _ in 0..count {
            let transaction = roll_transaction(rng, day)?;
            // today's rolls may land later than `until`
            if transaction.timestamp() <= until {
                generated.push(transaction);
            }
        }
    }
    Ok(generated)
}

//
// ─── FITNESS ───────────────────────────────────────────────────────────────────
//

#[allow(clippy::too_many_arguments)]
fn stat(
    kind: StatKind,
    title: &str,
    unit: &str,
    goal: f64,
    changes: (i32, i32),
    history: [f64; 5],
    today: NaiveDate,
    value: f64,
) -> FitnessStat {
    let week_data = history
        .iter()
        .zip((0..5).rev())
        .map(|(value, back)| DailyReading {
            date: today - Duration::days(back),
            value: *value,
        })
        .collect();
    FitnessStat {
        kind,
        title: title.to_owned(),
        value,
        weekly_change: changes.0,
        monthly_change: changes.1,
        week_data,
        unit: unit.to_owned(),
        goal,
    }
}

/// Latest readings for each tracked metric with the last five days of history.
#[must_use]
pub fn fitness_stats(today: NaiveDate) -> Vec<FitnessStat> {
    vec![
        stat(StatKind::Sleep, "Sleep", "hours", 8.0, (15, 5), [5.0, 6.5, 7.0, 7.5, 7.8], today, 7.8),
        stat(
            StatKind::Steps,
            "Steps",
            "steps",
            10_000.0,
            (15, 5),
            [6500.0, 7800.0, 8200.0, 8234.0, 7500.0],
            today,
            8234.0,
        ),
        stat(StatKind::Water, "Water", "L", 3.0, (15, 5), [2.1, 2.3, 2.5, 2.4, 2.5], today, 2.5),
        stat(
            StatKind::Heart,
            "Heart Rate",
            "bpm",
            80.0,
            (-5, -2),
            [78.0, 76.0, 77.0, 75.0, 74.0],
            today,
            74.0,
        ),
    ]
}

//
// ─── LEADERBOARD ───────────────────────────────────────────────────────────────
//

const PLAYERS: [(&str, u32, u32); 5] = [
    ("Davis Curtis", 2569, 15420),
    ("Alena Donin", 1469, 12850),
    ("Craig Gouse", 1053, 11230),
    ("Madelyn Dias", 590, 8940),
    ("Zain Vaccaro", 448, 7250),
];

#[must_use]
pub fn leaderboard() -> Vec<LeaderboardEntry> {
    PLAYERS
        .iter()
        .zip(1u64..)
        .map(|((name, weekly, all_time), id)| {
            let first_name = name.split_whitespace().next().unwrap_or(name);
            LeaderboardEntry {
                id: EntryId::new(id),
                name: (*name).to_owned(),
                weekly_points: *weekly,
                all_time_points: *all_time,
                avatar: format!("https://api.dicebear.com/7.x/avataaars/svg?seed={first_name}"),
            }
        })
        .collect()
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

impl Storage {
    /// In-memory storage populated with the start-up data.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if seed data fails validation or cannot be stored.
    pub fn seeded(seed: u64, now: DateTime<Utc>) -> Result<Self, SeedError> {
        let repo = InMemoryRepository::new();
        let mut rng = StdRng::seed_from_u64(seed);

        for course in courses(now)? {
            repo.upsert_course(&course)?;
        }
        for draft in event_drafts() {
            let event = draft.validate().map_err(lex_core::Error::from)?;
            repo.insert_event(event)?;
        }
        for transaction in transactions(&mut rng, history_start(), now)? {
            repo.insert_transaction(&transaction)?;
        }
        for stat in fitness_stats(now.date_naive()) {
            repo.upsert_stat(&stat)?;
        }
        for entry in leaderboard() {
            repo.insert_entry(&entry)?;
        }

        Ok(Self::from_repository(repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lex_core::time::fixed_now;

    #[test]
    fn courses_are_valid_and_keyed_by_slug() {
        let seeded = courses(fixed_now()).unwrap();
        let ids: Vec<_> = seeded.iter().map(|c| c.id().as_str().to_owned()).collect();
        assert_eq!(ids, ["bits-f363", "cs-f363", "cs-f303"]);
        // every 2025 date is still ahead of the fixed clock
        assert!(seeded.iter().all(|c| c.progress() == 0));
        assert_eq!(seeded[1].assessments().len(), 5);
    }

    #[test]
    fn timetable_drafts_validate() {
        let drafts = event_drafts();
        assert_eq!(drafts.len(), 12);
        assert!(drafts.into_iter().all(|d| d.validate().is_ok()));
    }

    #[test]
    fn same_seed_same_history() {
        let now = fixed_now();
        let start = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
        let a = transactions(&mut StdRng::seed_from_u64(7), start, now).unwrap();
        let b = transactions(&mut StdRng::seed_from_u64(7), start, now).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());

        let c = transactions(&mut StdRng::seed_from_u64(8), start, now).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn generated_transactions_respect_ranges() {
        let now = fixed_now();
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let generated = transactions(&mut StdRng::seed_from_u64(42), start, now).unwrap();

        for t in &generated {
            assert!(t.timestamp().date_naive() >= start);
            assert!(t.timestamp() <= now);
            match t.category() {
                SpendCategory::Food => {
                    assert!((30..80).contains(&t.amount()));
                    assert!(SWD_VENDORS.contains(&t.second_party()));
                }
                SpendCategory::Entertainment => assert!((100..200).contains(&t.amount())),
                SpendCategory::Transport => assert!((20..80).contains(&t.amount())),
                _ => assert!((50..500).contains(&t.amount())),
            }
            if t.provider() == PaymentProvider::SwdPay {
                assert_eq!(t.category(), SpendCategory::Food);
            }
        }
    }

    #[test]
    fn fitness_history_ends_today() {
        let today = fixed_now().date_naive();
        let stats = fitness_stats(today);
        assert_eq!(stats.len(), 4);
        for stat in &stats {
            assert_eq!(stat.week_data.len(), 5);
            assert_eq!(stat.week_data.last().unwrap().date, today);
        }
    }

    #[test]
    fn seeded_storage_is_deterministic() {
        let a = Storage::seeded(1, fixed_now()).unwrap();
        let b = Storage::seeded(1, fixed_now()).unwrap();
        assert_eq!(
            a.transactions.list_transactions().unwrap(),
            b.transactions.list_transactions().unwrap()
        );
        assert_eq!(a.courses.list_courses().unwrap().len(), 3);
        assert_eq!(a.events.list_events().unwrap().len(), 12);
        assert_eq!(a.leaderboard.list_entries().unwrap().len(), 5);
    }
}
