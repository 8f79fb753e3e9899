//! Time sources
//!
//! The sensor cache measures its staleness window against a monotonic
//! [`Clock`]; the date/time screen reads calendar time from a [`WallClock`].
//! Both are traits so tests and replays can substitute fixed time.

use chrono::NaiveDateTime;
use embassy_time::Instant;

/// Monotonic time source for the staleness window.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by the embassy time driver of the running platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Local calendar time source for the date/time screen.
pub trait WallClock {
    fn local_now(&self) -> NaiveDateTime;
}

/// A [`WallClock`] that always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWallClock(pub NaiveDateTime);

impl WallClock for FixedWallClock {
    fn local_now(&self) -> NaiveDateTime {
        self.0
    }
}

impl<W: WallClock + ?Sized> WallClock for &W {
    fn local_now(&self) -> NaiveDateTime {
        (**self).local_now()
    }
}
