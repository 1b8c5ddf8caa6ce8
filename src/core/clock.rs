//! Clock injection for date-dependent tools.
//!
//! Every "today" or "now" read in the tool handlers goes through a
//! [`SharedClock`] so tests can pin time with [`FixedClock`].

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;

/// Clock handle shared by every portmanteau.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// The wall clock used in production.
pub fn system_clock() -> SharedClock {
    Arc::new(DefaultClock)
}

/// Current UTC calendar date.
pub fn today(clock: &dyn Clock) -> NaiveDate {
    clock.utc().date_naive()
}

/// A clock pinned to a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Pin the clock to an exact instant.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Pin the clock to midnight UTC of the given date.
    pub fn on(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN).and_utc())
    }

    /// Wrap into a [`SharedClock`].
    pub fn shared(self) -> SharedClock {
        Arc::new(self)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}
