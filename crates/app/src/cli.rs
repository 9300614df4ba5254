use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use lex_core::finance::TimePeriod;
use lex_core::model::{
    AssessmentDraft, EventCategory, EventDraft, EventId, Settings, SettingsDraft, SettingsError,
};
use lex_core::Clock;

/// Output mode shared by every view.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Top-level CLI parser for the `lex` binary.
#[derive(Debug, Parser)]
#[command(name = "lex", version, about = "Lex - courses, timetable, spending and fitness at a glance")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: text, json
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Seed for the generated spending history
    #[arg(long, global = true, env = "LEX_SEED")]
    pub seed: Option<u64>,

    /// Pin the clock to an RFC 3339 instant
    #[arg(long, global = true, env = "LEX_NOW", value_parser = parse_now)]
    pub now: Option<DateTime<Utc>>,

    /// Timetable hour row height in pixels
    #[arg(long, global = true, env = "LEX_ROW_HEIGHT")]
    pub row_height: Option<f64>,

    /// Gap between side-by-side events in pixels
    #[arg(long, global = true, env = "LEX_COLUMN_GAP")]
    pub column_gap: Option<f64>,

    /// Width of the timetable event area in pixels
    #[arg(long, global = true, env = "LEX_GRID_WIDTH")]
    pub grid_width: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Home screen summary
    Dashboard,
    /// Every course with its next assessment
    Academics,
    /// One course: progress, links and assessment timeline
    Course {
        /// Course slug (`cs-f303`) or code (`CS F303`)
        id: String,

        #[command(flatten)]
        changes: AssessmentChanges,
    },
    /// Laid-out timetable
    Timetable {
        /// Only show these categories (repeatable)
        #[arg(short, long)]
        category: Vec<EventCategory>,

        #[command(flatten)]
        changes: EventChanges,
    },
    /// Spending overview
    Finance,
    /// Transaction history grouped by day
    Transactions,
    /// Spending bars and category breakdown
    Report {
        #[arg(short, long, default_value_t = TimePeriod::Month)]
        period: TimePeriod,
    },
    /// Budget usage per category
    Budget {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(short, long, value_parser = parse_month)]
        month: Option<chrono::NaiveDate>,
    },
    /// Podium and standings
    Leaderboard {
        #[arg(long)]
        all_time: bool,
    },
    /// All tracked fitness stats
    Fitness,
    /// One fitness stat with progress and coaching
    Stat {
        /// sleep, steps, water or heart
        kind: String,
    },
}

/// `INDEX=KIND=DATE` from `course --edit`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssessmentEdit {
    pub index: usize,
    pub draft: AssessmentDraft,
}

/// Assessment changes applied before the course is shown: edit, then delete,
/// then every add in order. Indexes count from 0 in the course's list.
#[derive(Clone, Debug, Default, Args)]
pub struct AssessmentChanges {
    /// Append an assessment (repeatable)
    #[arg(long, value_name = "KIND=DATE", value_parser = parse_draft)]
    pub add: Vec<AssessmentDraft>,

    /// Replace the assessment at INDEX
    #[arg(long, value_name = "INDEX=KIND=DATE", value_parser = parse_edit)]
    pub edit: Option<AssessmentEdit>,

    /// Remove the assessment at INDEX
    #[arg(long, value_name = "INDEX")]
    pub delete: Option<usize>,
}

/// Timetable changes applied before the layout: delete, then add.
#[derive(Clone, Debug, Default, Args)]
pub struct EventChanges {
    /// Add an event with this title
    #[arg(long = "add-event", value_name = "TITLE", requires_all = ["location", "start", "end"])]
    pub title: Option<String>,

    #[arg(long, requires = "title")]
    pub location: Option<String>,

    #[arg(long, value_name = "HH:MM", requires = "title")]
    pub start: Option<String>,

    #[arg(long, value_name = "HH:MM", requires = "title")]
    pub end: Option<String>,

    /// Category of the new event [default: Other]
    #[arg(long = "event-category", value_name = "CATEGORY", requires = "title")]
    pub event_category: Option<EventCategory>,

    /// Fill color of the new event [default: the category's]
    #[arg(long, requires = "title")]
    pub color: Option<String>,

    /// Remove the event with this id
    #[arg(long, value_name = "ID")]
    pub delete_event: Option<EventId>,
}

impl EventChanges {
    /// The event to add, if `--add-event` was given.
    #[must_use]
    pub fn draft(&self) -> Option<EventDraft> {
        let title = self.title.clone()?;
        Some(EventDraft {
            title,
            location: self.location.clone().unwrap_or_default(),
            start: self.start.clone().unwrap_or_default(),
            end: self.end.clone().unwrap_or_default(),
            category: self.event_category.unwrap_or(EventCategory::Other),
            color: self.color.clone(),
        })
    }
}

impl Cli {
    /// # Errors
    ///
    /// Returns `SettingsError` when a layout dimension is out of range.
    pub fn settings(&self) -> Result<Settings, SettingsError> {
        SettingsDraft {
            row_height: self.row_height,
            column_gap: self.column_gap,
            grid_width: self.grid_width,
            seed: self.seed,
        }
        .validate()
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.now.map_or_else(Clock::default_clock, Clock::fixed)
    }
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|at| at.with_timezone(&Utc))
}

fn parse_draft(raw: &str) -> Result<AssessmentDraft, String> {
    let (kind, date) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KIND=DATE, got {raw:?}"))?;
    Ok(AssessmentDraft::new(kind.trim(), date.trim()))
}

fn parse_edit(raw: &str) -> Result<AssessmentEdit, String> {
    let (index, draft) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=KIND=DATE, got {raw:?}"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid assessment index {index:?}"))?;
    Ok(AssessmentEdit {
        index,
        draft: parse_draft(draft)?,
    })
}

fn parse_month(raw: &str) -> Result<chrono::NaiveDate, chrono::ParseError> {
    chrono::NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "lex",
            "timetable",
            "--category",
            "cs-f213",
            "-c",
            "Other",
            "--format",
            "json",
            "--now",
            "2025-03-05T10:30:00Z",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.clock().is_fixed());
        assert_eq!(
            cli.clock().now(),
            Utc.with_ymd_and_hms(2025, 3, 5, 10, 30, 0).unwrap()
        );
        match cli.command {
            Commands::Timetable { category, .. } => {
                assert_eq!(category, [EventCategory::CsF213, EventCategory::Other]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn month_and_period_parse() {
        let cli = Cli::try_parse_from(["lex", "budget", "--month", "2025-02"]).unwrap();
        match cli.command {
            Commands::Budget { month } => {
                assert_eq!(month, NaiveDate::from_ymd_opt(2025, 2, 1));
            }
            other => panic!("unexpected command {other:?}"),
        }
        let cli = Cli::try_parse_from(["lex", "report", "-p", "week"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Report {
                period: TimePeriod::Week
            }
        ));
        assert!(Cli::try_parse_from(["lex", "report", "-p", "year"]).is_err());
    }

    #[test]
    fn course_changes_parse() {
        let cli = Cli::try_parse_from([
            "lex",
            "course",
            "cs-f303",
            "--add",
            "Quiz 2=Mar 10, 2025",
            "--add",
            "Lab=2025-03-12",
            "--edit",
            "1=Midsem=2025-03-11",
            "--delete",
            "0",
        ])
        .unwrap();
        match cli.command {
            Commands::Course { id, changes } => {
                assert_eq!(id, "cs-f303");
                assert_eq!(
                    changes.add,
                    [
                        AssessmentDraft::new("Quiz 2", "Mar 10, 2025"),
                        AssessmentDraft::new("Lab", "2025-03-12"),
                    ]
                );
                assert_eq!(
                    changes.edit,
                    Some(AssessmentEdit {
                        index: 1,
                        draft: AssessmentDraft::new("Midsem", "2025-03-11"),
                    })
                );
                assert_eq!(changes.delete, Some(0));
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Cli::try_parse_from(["lex", "course", "cs-f303", "--add", "Quiz 2"]).is_err());
        assert!(Cli::try_parse_from(["lex", "course", "cs-f303", "--edit", "x=Quiz=2025-03-11"])
            .is_err());
    }

    #[test]
    fn new_event_needs_place_and_times() {
        assert!(
            Cli::try_parse_from(["lex", "timetable", "--add-event", "Gym", "--start", "18:00"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["lex", "timetable", "--location", "Gym"]).is_err());

        let cli = Cli::try_parse_from([
            "lex",
            "timetable",
            "--add-event",
            "Gym",
            "--location",
            "SAC",
            "--start",
            "18:00",
            "--end",
            "19:00",
            "--delete-event",
            "3",
        ])
        .unwrap();
        let Commands::Timetable { changes, .. } = cli.command else {
            panic!("expected the timetable command");
        };
        assert_eq!(changes.delete_event, Some(EventId::new(3)));
        let draft = changes.draft().unwrap();
        assert_eq!(draft.title, "Gym");
        assert_eq!(draft.category, EventCategory::Other);
        assert_eq!(draft.color, None);
    }

    #[test]
    fn layout_flags_are_validated() {
        let cli = Cli::try_parse_from(["lex", "dashboard", "--row-height", "0"]).unwrap();
        assert!(cli.settings().is_err());

        let cli = Cli::try_parse_from(["lex", "dashboard", "--seed", "9"]).unwrap();
        assert_eq!(cli.settings().unwrap().seed(), 9);

        let cli = Cli::try_parse_from(["lex", "dashboard", "--column-gap=-1"]).unwrap();
        assert!(cli.settings().is_err());
    }

    #[test]
    fn layout_flags_fall_back_to_env() {
        let command = Cli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .and_then(|name| name.to_str())
                .map(str::to_owned)
        };
        for (id, env) in [
            ("row_height", "LEX_ROW_HEIGHT"),
            ("column_gap", "LEX_COLUMN_GAP"),
            ("grid_width", "LEX_GRID_WIDTH"),
            ("seed", "LEX_SEED"),
            ("now", "LEX_NOW"),
        ] {
            assert_eq!(env_of(id).as_deref(), Some(env), "{id}");
        }
    }
}
