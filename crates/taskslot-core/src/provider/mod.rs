//! Availability providers.
//!
//! The scheduler only ever asks one question: "where is the next free
//! interval of at least this length?". Anything that can answer it (a fixed
//! stub, a cursor, a calendar backend) plugs in through
//! [`AvailabilityProvider`].

mod calendar;
mod fixed;
mod sequential;

pub use calendar::{CalendarEvent, CalendarProvider, WorkingHours};
pub use fixed::FixedOffsetProvider;
pub use sequential::SequentialProvider;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ValidationError};

/// A contiguous free interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Slot {
    /// Create a slot, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Slot starting at `start` that is exactly `duration` long.
    ///
    /// `None` when the end falls outside the representable time range.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Option<Self> {
        let end = start.checked_add_signed(duration)?;
        Some(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn can_fit(&self, duration: Duration) -> bool {
        self.duration() >= duration
    }

    pub fn overlaps(&self, other: &Slot) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Source of free time.
///
/// `Ok(None)` means nothing fits; that is an ordinary outcome, not an error.
/// `Err` is reserved for faults of the provider itself.
pub trait AvailabilityProvider {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &str;

    /// Earliest free interval of at least `duration`.
    fn find_slot(&mut self, duration: Duration) -> Result<Option<Slot>, ProviderError>;

    /// Called once the scheduler has accepted `slot` for a task.
    ///
    /// Commit-aware providers must not hand out an overlapping interval
    /// afterwards. The default ignores commits.
    fn commit(&mut self, _slot: &Slot) {}
}

impl<P: AvailabilityProvider + ?Sized> AvailabilityProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn find_slot(&mut self, duration: Duration) -> Result<Option<Slot>, ProviderError> {
        (**self).find_slot(duration)
    }

    fn commit(&mut self, slot: &Slot) {
        (**self).commit(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap()
    }

    #[test]
    fn slot_rejects_inverted_range() {
        assert!(matches!(
            Slot::new(at(10), at(9)),
            Err(ValidationError::InvalidTimeRange { .. })
        ));
        assert!(Slot::new(at(10), at(10)).is_err());
    }

    #[test]
    fn slot_overlap_is_half_open() {
        let a = Slot::new(at(9), at(10)).unwrap();
        let b = Slot::new(at(10), at(11)).unwrap();
        let c = Slot::new(at(9), at(11)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.can_fit(Duration::hours(2)));
        assert!(!a.can_fit(Duration::minutes(61)));
    }

    #[test]
    fn starting_at_refuses_unrepresentable_end() {
        let slot = Slot::starting_at(at(9), Duration::hours(2)).unwrap();
        assert_eq!(slot.end, at(11));
        assert!(Slot::starting_at(DateTime::<Utc>::MAX_UTC, Duration::seconds(1)).is_none());
    }

    #[test]
    fn boxed_provider_delegates() {
        let mut boxed: Box<dyn AvailabilityProvider> =
            Box::new(FixedOffsetProvider::anchored(at(8), Duration::zero()));
        assert_eq!(boxed.name(), "fixed-offset");
        let slot = boxed.find_slot(Duration::hours(1)).unwrap().unwrap();
        assert_eq!(slot.start, at(8));
    }
}
