use chrono::{DateTime, Duration, Utc};

use super::{AvailabilityProvider, Slot};
use crate::error::ProviderError;

/// Commit-aware cursor provider.
///
/// Hands out back-to-back slots: each accepted slot moves the cursor to its
/// end plus `gap`. With a `horizon`, requests that would finish past it get
/// `None`.
#[derive(Debug, Clone)]
pub struct SequentialProvider {
    cursor: DateTime<Utc>,
    gap: Duration,
    horizon: Option<DateTime<Utc>>,
}

impl SequentialProvider {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            cursor: start,
            gap: Duration::zero(),
            horizon: None,
        }
    }

    /// Cursor starts `offset` from now.
    pub fn from_now(offset: Duration) -> Self {
        Self::new(Utc::now() + offset)
    }

    /// Leave `gap` of free time between consecutive slots.
    pub fn with_gap(mut self, gap: Duration) -> Self {
        self.gap = gap.max(Duration::zero());
        self
    }

    /// Refuse slots that would end after `horizon`.
    pub fn with_horizon(mut self, horizon: DateTime<Utc>) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn cursor(&self) -> DateTime<Utc> {
        self.cursor
    }
}

impl AvailabilityProvider for SequentialProvider {
    fn name(&self) -> &str {
        "sequential"
    }

    fn find_slot(&mut self, duration: Duration) -> Result<Option<Slot>, ProviderError> {
        let Some(slot) = Slot::starting_at(self.cursor, duration) else {
            return Ok(None);
        };
        match self.horizon {
            Some(horizon) if slot.end > horizon => Ok(None),
            _ => Ok(Some(slot)),
        }
    }

    fn commit(&mut self, slot: &Slot) {
        let next = slot
            .end
            .checked_add_signed(self.gap)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        if next > self.cursor {
            self.cursor = next;
        }
    }
}
