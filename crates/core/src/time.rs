use chrono::{DateTime, Utc};

/// Source of "now" for stamping generated answer records.
///
/// Jobs take a `Clock` so tests can pin timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Clock pinned to an epoch-millisecond timestamp.
    ///
    /// Returns `None` if `millis` is outside chrono's representable range.
    #[must_use]
    pub fn at_millis(millis: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis).map(Self::Fixed)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Current time as epoch milliseconds, the unit used in question records.
    #[must_use]
    pub fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}
