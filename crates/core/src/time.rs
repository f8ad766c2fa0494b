use chrono::{DateTime, Duration, Utc};

/// Wall-clock source for the `started_at` and `submitted_at` stamps of a session.
///
/// Elapsed quiz time is counted by timer ticks, never by comparing two clock
/// readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// Seconds after the Unix epoch used by `fixed_now` (2023-11-14T22:13:20Z).
const FIXED_EPOCH_SECONDS: i64 = 1_700_000_000;

/// A deterministic timestamp for tests.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + Duration::seconds(FIXED_EPOCH_SECONDS)
}

/// A `Clock` stopped at [`fixed_now`].
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
