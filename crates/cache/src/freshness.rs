//! Time-based validity of cache entries

use std::time::{Duration, SystemTime};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// How long a recorded capture stays valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validity(Duration);

impl Validity {
    /// A window of whole days
    #[must_use]
    pub fn days(days: u32) -> Self {
        Self(Duration::from_secs(u64::from(days) * SECS_PER_DAY))
    }

    /// The window as a duration
    #[must_use]
    pub const fn as_duration(self) -> Duration {
        self.0
    }

    /// Whether an entry captured at `modified` is still fresh at `now`
    #[must_use]
    pub fn is_fresh_at(self, modified: SystemTime, now: SystemTime) -> bool {
        is_fresh(modified, now, self.0)
    }
}

impl Default for Validity {
    fn default() -> Self {
        Self::days(1)
    }
}

/// `fresh ⇔ now < modified + window`
///
/// An expiry past the end of the platform clock never expires.
#[must_use]
pub fn is_fresh(modified: SystemTime, now: SystemTime, window: Duration) -> bool {
    modified
        .checked_add(window)
        .is_none_or(|expires_at| now < expires_at)
}
