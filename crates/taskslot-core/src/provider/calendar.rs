//! Calendar-backed availability.
//!
//! Searches working-hour windows day by day for the first gap between busy
//! events that is long enough. Accepted slots are added to the busy list.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AvailabilityProvider, Slot};
use crate::error::{ProviderError, ValidationError};

/// A busy interval on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl CalendarEvent {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if end_time <= start_time {
            return Err(ValidationError::InvalidTimeRange {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            id: id.into(),
            title: title.into(),
            start_time,
            end_time,
        })
    }

    /// Check if this event overlaps with a time range
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && self.end_time > start
    }
}

/// Daily working window, in UTC wall-clock time.
///
/// An end earlier than the start means the window crosses midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl WorkingHours {
    /// Parse `HH:MM` start and end times.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            start: parse_hhmm("work_start", start)?,
            end: parse_hhmm("work_end", end)?,
        })
    }

    /// Window for the calendar day `day_offset` days after `from`, or `None`
    /// past the representable date range.
    fn window(
        &self,
        from: DateTime<Utc>,
        day_offset: i64,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let date = from
            .date_naive()
            .checked_add_signed(Duration::days(day_offset))?;
        let start = date.and_time(self.start).and_utc();
        let mut end = date.and_time(self.end).and_utc();
        if end <= start {
            end = end.checked_add_signed(Duration::days(1))?;
        }
        Some((start, end))
    }
}

fn parse_hhmm(field: &str, value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| ValidationError::InvalidValue {
        field: field.to_string(),
        message: format!("expected HH:MM, got '{value}' ({e})"),
    })
}

/// Finds free time between busy calendar events.
#[derive(Debug, Clone)]
pub struct CalendarProvider {
    busy: Vec<CalendarEvent>,
    hours: WorkingHours,
    not_before: DateTime<Utc>,
    horizon_days: u32,
}

impl CalendarProvider {
    /// Search from `not_before` for up to `horizon_days` calendar days.
    pub fn new(
        busy: Vec<CalendarEvent>,
        hours: WorkingHours,
        not_before: DateTime<Utc>,
        horizon_days: u32,
    ) -> Self {
        let mut provider = Self {
            busy,
            hours,
            not_before,
            horizon_days,
        };
        provider.sort_busy();
        provider
    }

    pub fn busy_events(&self) -> &[CalendarEvent] {
        &self.busy
    }

    fn sort_busy(&mut self) {
        self.busy.sort_by_key(|e| (e.start_time, e.end_time));
    }

    /// First gap of at least `duration` inside one window, if any.
    fn gap_in_window(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        duration: Duration,
    ) -> Option<Slot> {
        let mut last_end = window_start;

        for event in &self.busy {
            if event.end_time <= last_end {
                continue;
            }
            if event.start_time >= window_end {
                break;
            }
            if event.start_time > last_end && event.start_time - last_end >= duration {
                return Some(Slot {
                    start: last_end,
                    end: event.start_time,
                });
            }
            if event.end_time > last_end {
                last_end = event.end_time;
            }
        }

        if last_end < window_end && window_end - last_end >= duration {
            return Some(Slot {
                start: last_end,
                end: window_end,
            });
        }
        None
    }
}

impl AvailabilityProvider for CalendarProvider {
    fn name(&self) -> &str {
        "calendar"
    }

    fn find_slot(&mut self, duration: Duration) -> Result<Option<Slot>, ProviderError> {
        // Previous day's window may cross midnight into `not_before`.
        for day in -1..i64::from(self.horizon_days) {
            let Some((start, end)) = self.hours.window(self.not_before, day) else {
                continue;
            };
            let start = start.max(self.not_before);
            if end <= start {
                continue;
            }
            if let Some(slot) = self.gap_in_window(start, end, duration) {
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }

    fn commit(&mut self, slot: &Slot) {
        self.busy.push(CalendarEvent {
            id: uuid::Uuid::new_v4().to_string(),
            title: "scheduled".to_string(),
            start_time: slot.start,
            end_time: slot.end,
        });
        self.sort_busy();
    }
}
