use std::cell::Cell;

use time::{Duration, OffsetDateTime};

/// Source of the current instant.
pub trait Clock {
    /// Current time. The returned offset decides which calendar day "today" is.
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in the local offset, falling back to UTC when the offset
/// cannot be determined.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

/// Manually driven clock for tests and fixtures.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<OffsetDateTime>,
}

impl FixedClock {
    /// Freeze the clock at `now`.
    #[must_use]
    pub const fn new(now: OffsetDateTime) -> Self {
        Self { now: Cell::new(now) }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, now: OffsetDateTime) {
        self.now.set(now);
    }

    /// Move the clock forward (or backward for negative durations).
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> OffsetDateTime {
        (**self).now()
    }
}
