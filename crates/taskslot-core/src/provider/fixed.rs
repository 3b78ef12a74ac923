use chrono::{DateTime, Duration, Utc};

use super::{AvailabilityProvider, Slot};
use crate::error::ProviderError;

/// Reference stub: every request gets `anchor + offset`.
///
/// Stateless. Commits are ignored, so consecutive tasks receive overlapping
/// windows. Use [`SequentialProvider`](super::SequentialProvider) when the
/// assignments must not collide.
#[derive(Debug, Clone)]
pub struct FixedOffsetProvider {
    anchor: Option<DateTime<Utc>>,
    offset: Duration,
}

impl FixedOffsetProvider {
    /// Slots start `offset` after the wall clock at lookup time.
    pub fn from_now(offset: Duration) -> Self {
        Self {
            anchor: None,
            offset,
        }
    }

    /// Slots start `offset` after a fixed reference time.
    pub fn anchored(anchor: DateTime<Utc>, offset: Duration) -> Self {
        Self {
            anchor: Some(anchor),
            offset,
        }
    }
}

impl Default for FixedOffsetProvider {
    fn default() -> Self {
        Self::from_now(Duration::minutes(10))
    }
}

impl AvailabilityProvider for FixedOffsetProvider {
    fn name(&self) -> &str {
        "fixed-offset"
    }

    fn find_slot(&mut self, duration: Duration) -> Result<Option<Slot>, ProviderError> {
        let base = self.anchor.unwrap_or_else(Utc::now);
        Ok(base
            .checked_add_signed(self.offset)
            .and_then(|start| Slot::starting_at(start, duration)))
    }
}
