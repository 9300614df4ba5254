use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::EventId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventError {
    #[error("event title cannot be empty")]
    EmptyTitle,

    #[error("event location cannot be empty")]
    EmptyLocation,

    #[error("invalid time of day {raw:?} (expected HH:MM)")]
    InvalidTime { raw: String },

    #[error("event must end after it starts ({start} >= {end})")]
    EndsBeforeStart { start: TimeOfDay, end: TimeOfDay },

    #[error("unknown event category {raw:?}")]
    UnknownCategory { raw: String },
}

//
// ─── TIME OF DAY ───────────────────────────────────────────────────────────────
//

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Wall-clock time within a single day, stored as minutes since midnight.
///
/// `24:00` is representable so an event may run until midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// # Errors
    ///
    /// Returns `EventError::InvalidTime` if the time is outside `00:00..=24:00`.
    pub fn new(hour: u8, minute: u8) -> Result<Self, EventError> {
        let total = u16::from(hour) * 60 + u16::from(minute);
        if minute >= 60 || total > MINUTES_PER_DAY {
            return Err(EventError::InvalidTime {
                raw: format!("{hour:02}:{minute:02}"),
            });
        }
        Ok(Self(total))
    }

    #[must_use]
    pub fn minutes(self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn hour(self) -> u8 {
        // at most 24
        (self.0 / 60) as u8
    }

    #[must_use]
    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EventError::InvalidTime { raw: s.to_owned() };
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = EventError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Timetable category: one of the enrolled course codes, or `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventCategory {
    #[serde(rename = "CS F213")]
    CsF213,
    #[serde(rename = "CS F214")]
    CsF214,
    #[serde(rename = "CS F222")]
    CsF222,
    Other,
}

/// Default fill for events that belong to a course.
pub const COURSE_EVENT_COLOR: &str = "#6D04DE";
/// Default fill for `Other` events; rendered with dark text.
pub const OTHER_EVENT_COLOR: &str = "#91DE43";

const LIGHT_TEXT: &str = "white";
const DARK_TEXT: &str = "#0F172A";

impl EventCategory {
    pub const ALL: [EventCategory; 4] = [
        EventCategory::CsF213,
        EventCategory::CsF214,
        EventCategory::CsF222,
        EventCategory::Other,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            EventCategory::CsF213 => "CS F213",
            EventCategory::CsF214 => "CS F214",
            EventCategory::CsF222 => "CS F222",
            EventCategory::Other => "Other",
        }
    }

    #[must_use]
    pub fn is_course(self) -> bool {
        !matches!(self, EventCategory::Other)
    }

    #[must_use]
    pub fn default_color(self) -> &'static str {
        if self.is_course() {
            COURSE_EVENT_COLOR
        } else {
            OTHER_EVENT_COLOR
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EventCategory {
    type Err = EventError;

    /// Accepts the label (`CS F213`) or its slug (`cs-f213`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', " ");
        EventCategory::ALL
            .into_iter()
            .find(|category| category.label().to_ascii_lowercase() == normalized)
            .ok_or_else(|| EventError::UnknownCategory { raw: s.to_owned() })
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Event as submitted from the "add event" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub location: String,
    pub start: String,
    pub end: String,
    pub category: EventCategory,
    /// Falls back to the category color when absent.
    pub color: Option<String>,
}

impl EventDraft {
    /// # Errors
    ///
    /// Returns `EventError` for blank text fields, malformed times, or `start >= end`.
    pub fn validate(self) -> Result<ValidatedEvent, EventError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(EventError::EmptyTitle);
        }
        let location = self.location.trim().to_owned();
        if location.is_empty() {
            return Err(EventError::EmptyLocation);
        }
        let start: TimeOfDay = self.start.parse()?;
        let end: TimeOfDay = self.end.parse()?;
        if start >= end {
            return Err(EventError::EndsBeforeStart { start, end });
        }
        let color = self
            .color
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.category.default_color().to_owned());

        Ok(ValidatedEvent {
            title,
            location,
            start,
            end,
            category: self.category,
            color,
        })
    }
}

/// A checked event still waiting for its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEvent {
    pub title: String,
    pub location: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub category: EventCategory,
    pub color: String,
}

impl ValidatedEvent {
    #[must_use]
    pub fn assign_id(self, id: EventId) -> CalendarEvent {
        CalendarEvent {
            id,
            title: self.title,
            location: self.location,
            start: self.start,
            end: self.end,
            category: self.category,
            color: self.color,
        }
    }
}

//
// ─── EVENT ─────────────────────────────────────────────────────────────────────
//

/// A timetable entry within one day. `start < end` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    id: EventId,
    title: String,
    location: String,
    start: TimeOfDay,
    end: TimeOfDay,
    category: EventCategory,
    color: String,
}

impl CalendarEvent {
    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    #[must_use]
    pub fn category(&self) -> EventCategory {
        self.category
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }

    /// Half-open interval intersection: touching events do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &CalendarEvent) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Text color that stays readable on this event's fill.
    #[must_use]
    pub fn text_color(&self) -> &'static str {
        if self.color.eq_ignore_ascii_case(OTHER_EVENT_COLOR) {
            DARK_TEXT
        } else {
            LIGHT_TEXT
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(start: &str, end: &str) -> EventDraft {
        EventDraft {
            title: "CS F213 L1".into(),
            location: "F-102".into(),
            start: start.into(),
            end: end.into(),
            category: EventCategory::CsF213,
            color: None,
        }
    }

    #[test]
    fn time_of_day_parses_and_formats() {
        let t: TimeOfDay = "09:30".parse().unwrap();
        assert_eq!(t.hour(), 9);
        assert_eq!(t.minute(), 30);
        assert_eq!(t.minutes(), 570);
        assert_eq!(t.to_string(), "09:30");

        let short: TimeOfDay = "9:05".parse().unwrap();
        assert_eq!(short.to_string(), "09:05");

        let midnight: TimeOfDay = "24:00".parse().unwrap();
        assert_eq!(midnight.hour(), 24);
    }

    #[test]
    fn time_of_day_rejects_out_of_range() {
        for raw in ["24:01", "25:00", "12:60", "1230", "12:5", ":30", "ab:cd"] {
            assert!(raw.parse::<TimeOfDay>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn category_parses_label_and_slug() {
        assert_eq!(
            "CS F214".parse::<EventCategory>().unwrap(),
            EventCategory::CsF214
        );
        assert_eq!(
            "cs-f222".parse::<EventCategory>().unwrap(),
            EventCategory::CsF222
        );
        assert_eq!("other".parse::<EventCategory>().unwrap(), EventCategory::Other);
        assert!("MATH F111".parse::<EventCategory>().is_err());
    }

    #[test]
    fn draft_requires_start_before_end() {
        let err = draft("10:00", "10:00").validate().unwrap_err();
        assert!(matches!(err, EventError::EndsBeforeStart { .. }));

        let err = draft("11:00", "10:00").validate().unwrap_err();
        assert!(matches!(err, EventError::EndsBeforeStart { .. }));
    }

    #[test]
    fn draft_rejects_blank_title_and_location() {
        let mut d = draft("09:00", "10:00");
        d.title = "  ".into();
        assert_eq!(d.validate().unwrap_err(), EventError::EmptyTitle);

        let mut d = draft("09:00", "10:00");
        d.location = String::new();
        assert_eq!(d.validate().unwrap_err(), EventError::EmptyLocation);
    }

    #[test]
    fn color_defaults_from_category() {
        let event = draft("09:00", "10:00")
            .validate()
            .unwrap()
            .assign_id(EventId::new(1));
        assert_eq!(event.color(), COURSE_EVENT_COLOR);
        assert_eq!(event.text_color(), "white");

        let mut other = draft("16:00", "17:00");
        other.category = EventCategory::Other;
        let event = other.validate().unwrap().assign_id(EventId::new(2));
        assert_eq!(event.color(), OTHER_EVENT_COLOR);
        assert_eq!(event.text_color(), "#0F172A");
    }

    #[test]
    fn overlap_is_end_exclusive() {
        let a = draft("09:00", "10:00").validate().unwrap().assign_id(EventId::new(1));
        let b = draft("09:30", "10:30").validate().unwrap().assign_id(EventId::new(2));
        let c = draft("10:00", "11:00").validate().unwrap().assign_id(EventId::new(3));

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(b.overlaps(&c));
        assert_eq!(b.duration_minutes(), 60);
    }
}
