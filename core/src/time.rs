#[cfg(test)]
use std::cell::Cell;

#[cfg(test)]
use chrono::Duration;
use chrono::{DateTime, Utc};

/// Source of timestamps for task records.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that starts at a fixed instant and advances by `step` on every read.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct SteppingClock {
    next: Cell<DateTime<Utc>>,
    step: Duration,
}

#[cfg(test)]
impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }
}

#[cfg(test)]
impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
