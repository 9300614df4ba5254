use anyhow::Context;
use chrono::NaiveDate;
use lex_core::finance::{self, BarPoint, BudgetUsage, CategoryTotals, DayGroup, TimePeriod};
use lex_core::leaderboard::{self, Rankings, Standing};
use lex_core::model::{
    CalendarEvent, Course, CourseId, EventCategory, FitnessStat, Settings, StatKind, Transaction,
};
use lex_core::progress::{NextAssessment, Urgency};
use lex_core::timetable::{DisplayWindow, TimeIndicator};
use lex_core::Clock;
use serde::Serialize;
use services::{
    AcademicsError, AcademicsService, AppServices, CourseOverview, Dashboard, FinanceOverview,
    StatDetail, TimelineRow,
};

use crate::cli::{AssessmentChanges, Commands, EventChanges, OutputFormat};
use crate::output::{bar, output, rupees};

const BAR_WIDTH: usize = 20;

/// What a view did with the record it addressed.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Shown,
    NotFound(String),
}

/// Everything a view needs besides its own arguments.
pub struct ViewContext<'a> {
    pub app: &'a AppServices,
    pub settings: &'a Settings,
    pub clock: Clock,
    pub format: OutputFormat,
}

/// Run one view.
///
/// # Errors
///
/// Returns an error when a service fails or output cannot be rendered.
pub fn dispatch(command: &Commands, ctx: &ViewContext<'_>) -> anyhow::Result<Outcome> {
    match command {
        Commands::Dashboard => dashboard(ctx),
        Commands::Academics => academics(ctx),
        Commands::Course { id, changes } => course(ctx, id, changes),
        Commands::Timetable { category, changes } => timetable(ctx, category, changes),
        Commands::Finance => finance_overview(ctx),
        Commands::Transactions => transactions(ctx),
        Commands::Report { period } => report(ctx, *period),
        Commands::Budget { month } => budget(ctx, *month),
        Commands::Leaderboard { all_time } => {
            let standing = if *all_time {
                Standing::AllTime
            } else {
                Standing::Weekly
            };
            leaderboard(ctx, standing)
        }
        Commands::Fitness => fitness(ctx),
        Commands::Stat { kind } => stat(ctx, kind),
    }
}

//
// ─── DASHBOARD ─────────────────────────────────────────────────────────────────
//

fn dashboard(ctx: &ViewContext<'_>) -> anyhow::Result<Outcome> {
    let view = ctx.app.dashboard().context("failed to build dashboard")?;
    output(&view, ctx.format, dashboard_text)?;
    Ok(Outcome::Shown)
}

fn dashboard_text(view: &Dashboard) -> Vec<String> {
    let mut lines = vec!["Here is your progress for today!".to_owned()];
    if let Some(leader) = &view.weekly_leader {
        lines.push(format!(
            "Leading this week: {} with {} pts",
            leader.name, leader.weekly_points
        ));
    }
    lines.push(format!(
        "Finances: {} / {}",
        rupees(view.spent_this_month),
        rupees(view.total_budget)
    ));
    if let Some(ring) = view.steps_ring {
        lines.push(format!("Steps: {ring}% of daily goal"));
    }

    lines.push(String::new());
    lines.push("Academics".to_owned());
    lines.extend(view.courses.iter().map(course_line));

    lines.push(String::new());
    lines.push("Today's Schedule".to_owned());
    if view.schedule.is_empty() {
        lines.push("  nothing left today".to_owned());
    }
    lines.extend(view.schedule.iter().map(|event| {
        format!("  {}  {} ({})", event.start(), event.title(), event.location())
    }));
    lines
}

//
// ─── ACADEMICS ─────────────────────────────────────────────────────────────────
//

fn course_line(overview: &CourseOverview) -> String {
    let next = overview
        .next
        .as_ref()
        .map_or_else(|| "nothing upcoming".to_owned(), NextAssessment::label);
    format!(
        "  {:<10} {:<30} {:>3}%  {next}",
        overview.course.code(),
        overview.course.name(),
        overview.course.progress()
    )
}

fn academics(ctx: &ViewContext<'_>) -> anyhow::Result<Outcome> {
    let courses = ctx.app.academics().overview()?;
    output(&courses, ctx.format, |courses| {
        courses.iter().map(course_line).collect()
    })?;
    Ok(Outcome::Shown)
}

#[derive(Debug, Serialize)]
struct CourseView {
    course: Course,
    next: Option<NextAssessment>,
    timeline: Vec<TimelineRow>,
}

fn urgency_label(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::Past => "done",
        Urgency::Urgent => "urgent",
        Urgency::Soon => "soon",
        Urgency::Relaxed => "",
    }
}

fn course_text(view: &CourseView) -> Vec<String> {
    let course = &view.course;
    let mut lines = vec![
        format!("{} {}", course.code(), course.name()),
        format!(
            "Progress: {} {}%",
            bar(f64::from(course.progress()), BAR_WIDTH),
            course.progress()
        ),
    ];
    if let Some(next) = &view.next {
        lines.push(format!("Next: {}", next.label()));
    }

    lines.push(String::new());
    lines.push("Timeline".to_owned());
    for row in &view.timeline {
        let when = if row.is_past {
            String::new()
        } else {
            format!("{} days", row.days_left)
        };
        lines.push(
            format!(
                "  {}  {:<14} {:>8}  {}",
                row.date.format("%b %-d, %Y"),
                row.kind,
                when,
                urgency_label(row.urgency)
            )
            .trim_end()
            .to_owned(),
        );
    }

    if !course.links().is_empty() {
        lines.push(String::new());
        lines.push("Links".to_owned());
        lines.extend(
            course
                .links()
                .iter()
                .map(|link| format!("  {}  {}", link.title(), link.target().as_str())),
        );
    }
    lines
}

fn apply_assessment_changes(
    academics: &AcademicsService,
    id: &CourseId,
    changes: &AssessmentChanges,
) -> Result<(), AcademicsError> {
    if let Some(edit) = &changes.edit {
        academics.edit_assessment(id, edit.index, edit.draft.clone())?;
    }
    if let Some(index) = changes.delete {
        academics.delete_assessment(id, index)?;
    }
    for draft in &changes.add {
        academics.add_assessment(id, draft.clone())?;
    }
    Ok(())
}

fn course(
    ctx: &ViewContext<'_>,
    raw: &str,
    changes: &AssessmentChanges,
) -> anyhow::Result<Outcome> {
    let not_found = || Outcome::NotFound(format!("course '{raw}'"));
    let Some(id) = CourseId::from_code(raw) else {
        return Ok(not_found());
    };
    let academics = ctx.app.academics();
    match apply_assessment_changes(&academics, &id, changes) {
        Err(AcademicsError::CourseNotFound(_)) => return Ok(not_found()),
        result => result.context("failed to update assessments")?,
    }
    let Some(course) = academics.course(&id)? else {
        return Ok(not_found());
    };
    let view = CourseView {
        next: academics.next_assessment(&id)?,
        timeline: academics.timeline(&id)?,
        course,
    };
    output(&view, ctx.format, course_text)?;
    Ok(Outcome::Shown)
}

//
// ─── TIMETABLE ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct PlacedEvent<'a> {
    #[serde(flatten)]
    event: &'a CalendarEvent,
    top: f64,
    height: f64,
    left: f64,
    width: f64,
    column: usize,
    column_count: usize,
}

#[derive(Debug, Serialize)]
struct TimetableView<'a> {
    categories: &'a [EventCategory],
    selected: &'a [EventCategory],
    window: DisplayWindow,
    slots: Vec<String>,
    events: Vec<PlacedEvent<'a>>,
    indicator: Option<TimeIndicator>,
}

fn timetable_text(view: &TimetableView<'_>) -> Vec<String> {
    let shown = view
        .selected
        .iter()
        .map(|category| category.label())
        .collect::<Vec<_>>()
        .join(", ");
    let span = match (view.slots.first(), view.slots.last()) {
        (Some(first), Some(last)) => format!("{first} - {last}"),
        _ => String::new(),
    };
    let mut lines = vec![format!("Timetable {span}  [{shown}]")];
    for placed in &view.events {
        let event = placed.event;
        let column = if placed.column_count > 1 {
            format!("  col {}/{}", placed.column + 1, placed.column_count)
        } else {
            String::new()
        };
        lines.push(format!(
            "  {}-{}  {:<18} {:<10}{column}",
            event.start(),
            event.end(),
            event.title(),
            event.location()
        ));
    }
    if let Some(indicator) = &view.indicator {
        lines.push(format!("  now {}", indicator.label));
    }
    lines
}

fn timetable(
    ctx: &ViewContext<'_>,
    categories: &[EventCategory],
    changes: &EventChanges,
) -> anyhow::Result<Outcome> {
    let service = ctx.app.timetable();
    if let Some(id) = changes.delete_event
        && service.delete_event(id)?.is_none()
    {
        return Ok(Outcome::NotFound(format!("event {id}")));
    }
    if let Some(draft) = changes.draft() {
        service.add_event(draft).context("failed to add event")?;
    }

    let selected = (!categories.is_empty()).then_some(categories);
    let day = service.day(selected)?;
    let config = service.config();
    let layout = day.layout(&config);

    let events = layout
        .placements
        .iter()
        .map(|placement| {
            let (left, width) = placement.span(ctx.settings.grid_width(), config.column_gap);
            PlacedEvent {
                event: placement.event,
                top: placement.top,
                height: placement.height,
                left,
                width,
                column: placement.column,
                column_count: placement.column_count,
            }
        })
        .collect();
    let view = TimetableView {
        categories: &day.categories,
        selected: &day.selected,
        window: layout.window,
        slots: layout.window.slot_labels(),
        events,
        indicator: service.time_indicator(&layout.window),
    };
    output(&view, ctx.format, timetable_text)?;
    Ok(Outcome::Shown)
}

//
// ─── FINANCE ───────────────────────────────────────────────────────────────────
//

fn transaction_line(t: &Transaction) -> String {
    format!(
        "  {}  {:<18} {:<13} {:<8} {:>8}",
        t.timestamp().format("%H:%M"),
        t.second_party(),
        t.category().label(),
        t.provider().label(),
        rupees(t.amount())
    )
}

fn finance_overview(ctx: &ViewContext<'_>) -> anyhow::Result<Outcome> {
    let view = ctx.app.finance().overview()?;
    output(&view, ctx.format, |view: &FinanceOverview| {
        let mut lines = vec![
            format!(
                "This month: {} of {} budget",
                rupees(view.current_month),
                rupees(view.total_budget)
            ),
            format!("Last month: {}", rupees(view.last_month)),
            String::new(),
            "Recent transactions".to_owned(),
        ];
        lines.extend(view.recent.iter().map(transaction_line));
        lines
    })?;
    Ok(Outcome::Shown)
}

fn transactions(ctx: &ViewContext<'_>) -> anyhow::Result<Outcome> {
    let all = ctx.app.finance().transactions()?;
    let groups = finance::group_by_day(&all, ctx.clock.now());
    output(&groups, ctx.format, |groups: &Vec<DayGroup<'_>>| {
        let mut lines = Vec::new();
        for group in groups {
            let total: u64 = group.transactions.iter().map(|t| t.amount()).sum();
            lines.push(format!("{} ({})", group.label, rupees(total)));
            lines.extend(group.transactions.iter().copied().map(transaction_line));
        }
        lines
    })?;
    Ok(Outcome::Shown)
}

#[derive(Debug, Serialize)]
struct ReportView {
    period: TimePeriod,
    bars: Vec<BarPoint>,
    categories: CategoryTotals,
    total: u64,
}

fn report_text(view: &ReportView) -> Vec<String> {
    let peak = view.bars.iter().map(|b| b.value).max().unwrap_or(0).max(1);
    let mut lines = vec![format!("Spending by {}", view.period)];
    for point in &view.bars {
        // peak is at least 1
        let percent = point.value as f64 / peak as f64 * 100.0;
        lines.push(format!(
            "  {:<7} {} {}",
            point.label,
            bar(percent, BAR_WIDTH),
            rupees(point.value)
        ));
    }
    lines.push(String::new());
    lines.push(format!("This month by category ({})", rupees(view.total)));
    lines.extend(
        view.categories
            .iter()
            .map(|(category, amount)| format!("  {:<13} {:>8}", category.label(), rupees(amount))),
    );
    lines
}

fn report(ctx: &ViewContext<'_>, period: TimePeriod) -> anyhow::Result<Outcome> {
    let finance = ctx.app.finance();
    let categories = finance.monthly_report(None, None)?;
    let view = ReportView {
        period,
        bars: finance.bar_graphs(period)?,
        total: categories.total(),
        categories,
    };
    output(&view, ctx.format, report_text)?;
    Ok(Outcome::Shown)
}

#[derive(Debug, Serialize)]
struct BudgetView {
    month: String,
    total_budget: u64,
    spent: u64,
    usage: Vec<BudgetUsage>,
}

fn budget_text(view: &BudgetView) -> Vec<String> {
    let mut lines = vec![format!(
        "Budget {}: {} of {}",
        view.month,
        rupees(view.spent),
        rupees(view.total_budget)
    )];
    for usage in &view.usage {
        let status = if usage.over_budget {
            format!("over by {}", rupees(usage.spent - usage.budget))
        } else {
            format!("{} left", rupees(usage.remaining))
        };
        lines.push(format!(
            "  {:<13} {} {:>3}%  {} / {}  {status}",
            usage.category.label(),
            bar(f64::from(usage.percent_used()), BAR_WIDTH),
            usage.percent_used(),
            rupees(usage.spent),
            rupees(usage.budget)
        ));
    }
    lines
}

fn budget(ctx: &ViewContext<'_>, month: Option<NaiveDate>) -> anyhow::Result<Outcome> {
    let finance = ctx.app.finance();
    let month = month.unwrap_or_else(|| ctx.clock.now().date_naive());
    let usage = finance.budget_usage(Some(month))?;
    let view = BudgetView {
        month: month.format("%Y-%m").to_string(),
        total_budget: finance.total_budget()?,
        spent: usage.iter().map(|u| u.spent).sum(),
        usage,
    };
    output(&view, ctx.format, budget_text)?;
    Ok(Outcome::Shown)
}

//
// ─── LEADERBOARD ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct LeaderboardView<'a> {
    #[serde(flatten)]
    rankings: Rankings<'a>,
    resets_in: String,
}

fn leaderboard_text(view: &LeaderboardView<'_>) -> Vec<String> {
    let mut lines = vec![format!("Weekly reset in {}", view.resets_in)];
    for ranked in view.rankings.podium.iter().chain(&view.rankings.rest) {
        lines.push(format!(
            "  #{:<2} {:<20} {:>6} pts",
            ranked.rank, ranked.entry.name, ranked.points
        ));
    }
    lines
}

fn leaderboard(ctx: &ViewContext<'_>, standing: Standing) -> anyhow::Result<Outcome> {
    let service = ctx.app.leaderboard();
    let entries = service.entries()?;
    let view = LeaderboardView {
        rankings: leaderboard::rank(&entries, standing),
        resets_in: service.countdown().to_string(),
    };
    output(&view, ctx.format, leaderboard_text)?;
    Ok(Outcome::Shown)
}

//
// ─── FITNESS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct FitnessView {
    stats: Vec<FitnessStat>,
    steps_ring: Option<u32>,
}

fn stat_line(stat: &FitnessStat) -> String {
    format!(
        "  {:<12} {:>8} {:<6} goal {:<6} {:+}% this week",
        stat.title, stat.value, stat.unit, stat.goal, stat.weekly_change
    )
}

fn fitness(ctx: &ViewContext<'_>) -> anyhow::Result<Outcome> {
    let service = ctx.app.fitness();
    let view = FitnessView {
        stats: service.list_stats()?,
        steps_ring: service.steps_ring()?,
    };
    output(&view, ctx.format, |view: &FitnessView| {
        let mut lines = Vec::new();
        if let Some(ring) = view.steps_ring {
            lines.push(format!("Steps ring: {ring}%"));
        }
        lines.extend(view.stats.iter().map(stat_line));
        lines
    })?;
    Ok(Outcome::Shown)
}

fn stat_text(detail: &StatDetail) -> Vec<String> {
    let stat = &detail.stat;
    let mut lines = vec![
        format!("{}: {} {}", stat.title, stat.value, stat.unit),
        format!(
            "{} {:.0}%",
            bar(detail.progress, BAR_WIDTH),
            detail.progress
        ),
        detail.message.message.clone(),
        detail.message.subtext.clone(),
        format!(
            "{:+}% this week, {:+}% this month",
            stat.weekly_change, stat.monthly_change
        ),
        String::new(),
    ];
    lines.extend(
        stat.week_data
            .iter()
            .map(|reading| format!("  {}  {}", reading.date.format("%a %b %-d"), reading.value)),
    );
    lines
}

fn stat(ctx: &ViewContext<'_>, raw: &str) -> anyhow::Result<Outcome> {
    let not_found = || Outcome::NotFound(format!("stat '{raw}'"));
    let Ok(kind) = raw.parse::<StatKind>() else {
        return Ok(not_found());
    };
    let Some(detail) = ctx.app.fitness().detail(kind)? else {
        return Ok(not_found());
    };
    output(&detail, ctx.format, stat_text)?;
    Ok(Outcome::Shown)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use lex_core::model::AssessmentDraft;
    use pretty_assertions::assert_eq;

    use super::*;

    fn app(clock: Clock) -> AppServices {
        AppServices::in_memory(&Settings::default(), clock).unwrap()
    }

    fn with_ctx<T>(run: impl FnOnce(&ViewContext<'_>) -> T) -> T {
        let clock = Clock::fixed(Utc.with_ymd_and_hms(2025, 3, 5, 10, 30, 0).unwrap());
        let app = app(clock);
        let settings = Settings::default();
        run(&ViewContext {
            app: &app,
            settings: &settings,
            clock,
            format: OutputFormat::Json,
        })
    }

    fn course_command(id: &str) -> Commands {
        Commands::Course {
            id: id.into(),
            changes: AssessmentChanges::default(),
        }
    }

    #[test]
    fn course_changes_are_applied_before_rendering() {
        with_ctx(|ctx| {
            let id: CourseId = "cs-f303".parse().unwrap();
            let changes = AssessmentChanges {
                add: vec![AssessmentDraft::new("Surprise Quiz", "Mar 7, 2025")],
                edit: None,
                delete: Some(0),
            };
            let command = Commands::Course {
                id: "CS F303".into(),
                changes,
            };
            assert_eq!(dispatch(&command, ctx).unwrap(), Outcome::Shown);

            let course = ctx.app.academics().course(&id).unwrap().unwrap();
            assert_eq!(course.assessments().len(), 5);
            assert_eq!(course.assessments().last().unwrap().kind(), "Surprise Quiz");
            assert_eq!(
                ctx.app.academics().next_assessment(&id).unwrap().unwrap().days_left,
                2
            );

            let bad_index = Commands::Course {
                id: "cs-f303".into(),
                changes: AssessmentChanges {
                    delete: Some(40),
                    ..AssessmentChanges::default()
                },
            };
            let err = dispatch(&bad_index, ctx).unwrap_err();
            assert!(format!("{err:#}").contains("out of range"));

            let unknown = Commands::Course {
                id: "math f111".into(),
                changes: AssessmentChanges {
                    add: vec![AssessmentDraft::new("Quiz", "2025-03-09")],
                    ..AssessmentChanges::default()
                },
            };
            assert_eq!(
                dispatch(&unknown, ctx).unwrap(),
                Outcome::NotFound("course 'math f111'".into())
            );
        });
    }

    #[test]
    fn timetable_changes_are_applied_before_layout() {
        with_ctx(|ctx| {
            let before = ctx.app.timetable().day(None).unwrap().events.len();
            let add = Commands::Timetable {
                category: Vec::new(),
                changes: EventChanges {
                    title: Some("Gym".into()),
                    location: Some("SAC".into()),
                    start: Some("18:00".into()),
                    end: Some("19:00".into()),
                    ..EventChanges::default()
                },
            };
            assert_eq!(dispatch(&add, ctx).unwrap(), Outcome::Shown);
            let events = ctx.app.timetable().day(None).unwrap().events;
            assert_eq!(events.len(), before + 1);
            let gym = events.iter().find(|e| e.title() == "Gym").unwrap();
            assert_eq!(gym.category(), EventCategory::Other);

            let delete = Commands::Timetable {
                category: Vec::new(),
                changes: EventChanges {
                    delete_event: Some(gym.id()),
                    ..EventChanges::default()
                },
            };
            assert_eq!(dispatch(&delete, ctx).unwrap(), Outcome::Shown);
            assert_eq!(
                dispatch(&delete, ctx).unwrap(),
                Outcome::NotFound(format!("event {}", gym.id()))
            );

            let backwards = Commands::Timetable {
                category: Vec::new(),
                changes: EventChanges {
                    title: Some("Nap".into()),
                    location: Some("Room".into()),
                    start: Some("15:00".into()),
                    end: Some("14:00".into()),
                    ..EventChanges::default()
                },
            };
            assert!(dispatch(&backwards, ctx).is_err());
        });
    }

    #[test]
    fn missing_records_are_reported() {
        with_ctx(|ctx| {
            assert_eq!(
                dispatch(&course_command("math f111"), ctx).unwrap(),
                Outcome::NotFound("course 'math f111'".into())
            );
            assert_eq!(
                dispatch(&course_command("!!"), ctx).unwrap(),
                Outcome::NotFound("course '!!'".into())
            );
            assert_eq!(
                dispatch(&Commands::Stat { kind: "calories".into() }, ctx).unwrap(),
                Outcome::NotFound("stat 'calories'".into())
            );
        });
    }

    #[test]
    fn course_accepts_code_or_slug() {
        with_ctx(|ctx| {
            for id in ["CS F303", "cs-f303"] {
                let outcome = dispatch(&course_command(id), ctx).unwrap();
                assert_eq!(outcome, Outcome::Shown);
            }
        });
    }

    #[test]
    fn course_text_lists_timeline_and_links() {
        with_ctx(|ctx| {
            let academics = ctx.app.academics();
            let id: CourseId = "cs-f303".parse().unwrap();
            let view = CourseView {
                next: academics.next_assessment(&id).unwrap(),
                timeline: academics.timeline(&id).unwrap(),
                course: academics.course(&id).unwrap().unwrap(),
            };
            let lines = course_text(&view);
            assert_eq!(lines[0], "CS F303 Computer Networks");
            assert_eq!(lines[2], "Next: Midsem due in 5 days");
            assert!(lines.iter().any(|l| l.contains("Quiz 1") && l.ends_with("done")));
            assert_eq!(lines.last().unwrap(), "  Project Resources  #");
        });
    }

    #[test]
    fn leaderboard_text_ranks_everyone() {
        with_ctx(|ctx| {
            let entries = ctx.app.leaderboard().entries().unwrap();
            let view = LeaderboardView {
                rankings: leaderboard::rank(&entries, Standing::Weekly),
                resets_in: "3d 13h 29m".into(),
            };
            let lines = leaderboard_text(&view);
            assert_eq!(lines.len(), 6);
            assert!(lines[1].starts_with("  #1  Davis Curtis"));

            let json = serde_json::to_value(&view).unwrap();
            assert_eq!(json["standing"], "weekly");
            assert_eq!(json["podium"].as_array().unwrap().len(), 3);
        });
    }

    #[test]
    fn every_view_renders() {
        with_ctx(|ctx| {
            let commands = [
                Commands::Dashboard,
                Commands::Academics,
                Commands::Timetable {
                    category: vec![EventCategory::Other],
                    changes: EventChanges::default(),
                },
                Commands::Finance,
                Commands::Transactions,
                Commands::Report {
                    period: TimePeriod::Week,
                },
                Commands::Budget { month: None },
                Commands::Leaderboard { all_time: true },
                Commands::Fitness,
                Commands::Stat {
                    kind: "steps".into(),
                },
            ];
            for command in &commands {
                assert_eq!(dispatch(command, ctx).unwrap(), Outcome::Shown, "{command:?}");
            }
        });
    }
}
