//! Overlap layout for the daily timetable grid.
//!
//! Events are partitioned into overlap groups; each group shares the full
//! grid width between its members. Positions are expressed in pixels relative
//! to the top of the display window.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::model::{CalendarEvent, EventCategory};
use crate::model::settings::{DEFAULT_COLUMN_GAP, DEFAULT_ROW_HEIGHT};

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutConfig {
    /// Pixels per hour row.
    pub row_height: f64,
    /// Pixels between side-by-side events.
    pub column_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            column_gap: DEFAULT_COLUMN_GAP,
        }
    }
}

//
// ─── DISPLAY WINDOW ────────────────────────────────────────────────────────────
//

const EARLIEST_FLOOR: u8 = 6;
const DEFAULT_START: u8 = 8;
const DEFAULT_END: u8 = 20;
const LATEST_CEIL: u8 = 24;

/// Inclusive range of hours shown on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayWindow {
    pub start: u8,
    pub end: u8,
}

impl DisplayWindow {
    /// Widens the default 8–20 window to the events' start and end hours,
    /// never earlier than 6 nor later than 24.
    #[must_use]
    pub fn for_events<'a>(events: impl IntoIterator<Item = &'a CalendarEvent>) -> Self {
        let mut start = DEFAULT_START;
        let mut end = DEFAULT_END;
        for event in events {
            for hour in [event.start().hour(), event.end().hour()] {
                start = start.min(hour);
                end = end.max(hour);
            }
        }
        Self {
            start: start.max(EARLIEST_FLOOR),
            end: end.min(LATEST_CEIL),
        }
    }

    #[must_use]
    pub fn contains_hour(&self, hour: u8) -> bool {
        (self.start..=self.end).contains(&hour)
    }

    /// One label per hour row, both ends included: `"8 AM"`, `"12 PM"`, `"1 PM"`.
    #[must_use]
    pub fn slot_labels(&self) -> Vec<String> {
        (self.start..=self.end).map(hour_label).collect()
    }
}

impl Default for DisplayWindow {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            end: DEFAULT_END,
        }
    }
}

fn twelve_hour(hour: u8) -> u8 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

fn hour_label(hour: u8) -> String {
    // 24 is the midnight that closes the day
    let period = if (12..24).contains(&hour) { "PM" } else { "AM" };
    format!("{} {period}", twelve_hour(hour))
}

//
// ─── GROUPING ──────────────────────────────────────────────────────────────────
//

/// Greedy overlap grouping.
///
/// Events are visited in start order (stable for equal starts). Each joins the
/// first group holding any event it overlaps, otherwise opens a new group.
/// Groups are kept sorted by start.
#[must_use]
pub fn group_overlapping<'a>(
    events: impl IntoIterator<Item = &'a CalendarEvent>,
) -> Vec<Vec<&'a CalendarEvent>> {
    let mut sorted: Vec<&CalendarEvent> = events.into_iter().collect();
    sorted.sort_by_key(|e| e.start());

    let mut groups: Vec<Vec<&CalendarEvent>> = Vec::new();
    for event in sorted {
        match groups
            .iter_mut()
            .find(|group| group.iter().any(|member| member.overlaps(event)))
        {
            Some(group) => {
                group.push(event);
                group.sort_by_key(|e| e.start());
            }
            None => groups.push(vec![event]),
        }
    }
    groups
}

//
// ─── LAYOUT ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPlacement<'a> {
    pub event: &'a CalendarEvent,
    /// Pixels from the top of the window.
    pub top: f64,
    pub height: f64,
    pub column: usize,
    pub column_count: usize,
}

impl EventPlacement<'_> {
    /// Horizontal extent `(left, width)` in a grid `grid_width` pixels wide.
    #[must_use]
    pub fn span(&self, grid_width: f64, column_gap: f64) -> (f64, f64) {
        let n = self.column_count as f64;
        let i = self.column as f64;
        let width = (grid_width - column_gap * (n - 1.0)) / n;
        let left = i * grid_width / n + column_gap * i;
        (left, width)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimetableLayout<'a> {
    pub window: DisplayWindow,
    /// Group by group, each group in start order.
    pub placements: Vec<EventPlacement<'a>>,
}

/// Lays out `events` on the grid. Pure: equal input gives equal output.
#[must_use]
pub fn layout<'a, I>(events: I, config: &LayoutConfig) -> TimetableLayout<'a>
where
    I: IntoIterator<Item = &'a CalendarEvent>,
{
    let events: Vec<&CalendarEvent> = events.into_iter().collect();
    let window = DisplayWindow::for_events(events.iter().copied());
    let rh = config.row_height;

    let mut placements = Vec::with_capacity(events.len());
    for group in group_overlapping(events) {
        let column_count = group.len();
        for (column, event) in group.into_iter().enumerate() {
            let start = event.start();
            let hour_offset = f64::from(start.hour()) - f64::from(window.start);
            placements.push(EventPlacement {
                event,
                top: hour_offset * rh + f64::from(start.minute()) / 60.0 * rh,
                height: f64::from(event.duration_minutes()) / 60.0 * rh,
                column,
                column_count,
            });
        }
    }

    TimetableLayout { window, placements }
}

//
// ─── CURRENT TIME ──────────────────────────────────────────────────────────────
//

/// The red "now" line across the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeIndicator {
    pub top: f64,
    /// `h:mm`, 12-hour clock.
    pub label: String,
}

/// `None` when `now` falls outside the window's hours.
#[must_use]
pub fn time_indicator(
    window: &DisplayWindow,
    now: NaiveTime,
    config: &LayoutConfig,
) -> Option<TimeIndicator> {
    // hour() is always < 24
    let hour = now.hour() as u8;
    if !window.contains_hour(hour) {
        return None;
    }
    let minute = now.minute();
    let offset = f64::from(hour) - f64::from(window.start) + f64::from(minute) / 60.0;
    Some(TimeIndicator {
        top: offset * config.row_height,
        label: format!("{}:{minute:02}", twelve_hour(hour)),
    })
}

//
// ─── FILTERING ─────────────────────────────────────────────────────────────────
//

/// Distinct categories in first-seen order.
#[must_use]
pub fn available_categories<'a>(
    events: impl IntoIterator<Item = &'a CalendarEvent>,
) -> Vec<EventCategory> {
    let mut seen = Vec::new();
    for event in events {
        if !seen.contains(&event.category()) {
            seen.push(event.category());
        }
    }
    seen
}

/// Events whose category is among `selected`.
pub fn filter_by_category<'a>(
    events: impl IntoIterator<Item = &'a CalendarEvent>,
    selected: &[EventCategory],
) -> impl Iterator<Item = &'a CalendarEvent> {
    events
        .into_iter()
        .filter(move |e| selected.contains(&e.category()))
}
