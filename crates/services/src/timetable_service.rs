use std::sync::Arc;

use chrono::Timelike;
use lex_core::model::{CalendarEvent, EventCategory, EventDraft, EventId};
use lex_core::timetable::{self, DisplayWindow, LayoutConfig, TimeIndicator, TimetableLayout};
use storage::{EventRepository, StorageError};

use crate::error::TimetableError;
use crate::Clock;

/// Events selected for display, ready to be laid out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimetableDay {
    /// Every category present in the timetable, first-seen order.
    pub categories: Vec<EventCategory>,
    /// The categories currently shown.
    pub selected: Vec<EventCategory>,
    pub events: Vec<CalendarEvent>,
}

impl TimetableDay {
    #[must_use]
    pub fn layout(&self, config: &LayoutConfig) -> TimetableLayout<'_> {
        timetable::layout(&self.events, config)
    }

    #[must_use]
    pub fn window(&self) -> DisplayWindow {
        DisplayWindow::for_events(&self.events)
    }
}

/// Reads and edits the timetable and resolves the "now" marker.
#[derive(Clone)]
pub struct TimetableService {
    clock: Clock,
    config: LayoutConfig,
    events: Arc<dyn EventRepository>,
}

impl TimetableService {
    #[must_use]
    pub fn new(clock: Clock, config: LayoutConfig, events: Arc<dyn EventRepository>) -> Self {
        Self {
            clock,
            config,
            events,
        }
    }

    #[must_use]
    pub fn config(&self) -> LayoutConfig {
        self.config
    }

    /// # Errors
    ///
    /// Returns `TimetableError::Storage` if repository access fails.
    pub fn list_events(&self) -> Result<Vec<CalendarEvent>, TimetableError> {
        Ok(self.events.list_events()?)
    }

    /// Event by id, `None` when unknown.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Storage` for failures other than a missing event.
    pub fn event(&self, id: EventId) -> Result<Option<CalendarEvent>, TimetableError> {
        match self.events.get_event(id) {
            Ok(event) => Ok(Some(event)),
            Err(StorageError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Timetable restricted to `selected` categories; `None` selects all of them.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Storage` if repository access fails.
    pub fn day(&self, selected: Option<&[EventCategory]>) -> Result<TimetableDay, TimetableError> {
        let all = self.list_events()?;
        let categories = timetable::available_categories(&all);
        let selected = selected.map_or_else(|| categories.clone(), <[EventCategory]>::to_vec);
        let events = timetable::filter_by_category(&all, &selected)
            .cloned()
            .collect::<Vec<_>>();
        tracing::debug!(
            shown = events.len(),
            total = all.len(),
            "timetable filtered"
        );
        Ok(TimetableDay {
            categories,
            selected,
            events,
        })
    }

    /// Events still running or ahead at the clock's time of day, by start time.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Storage` if repository access fails.
    pub fn upcoming(&self) -> Result<Vec<CalendarEvent>, TimetableError> {
        let time = self.clock.now().time();
        let minute_of_day = time.hour() * 60 + time.minute();
        let mut events: Vec<_> = self
            .list_events()?
            .into_iter()
            .filter(|event| u32::from(event.end().minutes()) > minute_of_day)
            .collect();
        events.sort_by_key(CalendarEvent::start);
        Ok(events)
    }

    /// Validates and stores a new event.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Event` for invalid input or
    /// `TimetableError::Storage` if persistence fails.
    pub fn add_event(&self, draft: EventDraft) -> Result<CalendarEvent, TimetableError> {
        let validated = draft.validate()?;
        let event = self.events.insert_event(validated)?;
        tracing::info!(id = %event.id(), title = event.title(), "event added");
        Ok(event)
    }

    /// Removes an event, returning it, or `None` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Storage` for failures other than a missing event.
    pub fn delete_event(&self, id: EventId) -> Result<Option<CalendarEvent>, TimetableError> {
        match self.events.delete_event(id) {
            Ok(event) => {
                tracing::info!(%id, "event deleted");
                Ok(Some(event))
            }
            Err(StorageError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Current-time marker for `window`, if the clock's time of day falls inside it.
    #[must_use]
    pub fn time_indicator(&self, window: &DisplayWindow) -> Option<TimeIndicator> {
        timetable::time_indicator(window, self.clock.now().time(), &self.config)
    }
}
