use std::time::Duration;

use chrono::{DateTime, Utc};

/// Source of wall-clock time for the refresh poll loop.
///
/// [`SystemClock`] is used in production. Tests provide a clock that advances on
/// [`sleep`](Clock::sleep) so that the poll loop finishes without waiting.
pub trait Clock {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Blocks the current thread for the given duration.
    fn sleep(&self, duration: Duration);
}

/// The system's wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}
