//! Wall-clock access for timestamps written into records.

use crate::constants::{DATE_FORMAT, TIMESTAMP_FORMAT};
use chrono::{Local, NaiveDate, NaiveDateTime};

/// Source of the current local time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    /// Current time rendered as `YYYY-MM-DD HH:MM:SS`.
    fn timestamp(&self) -> String {
        self.now().format(TIMESTAMP_FORMAT).to_string()
    }

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Current date rendered as `YYYY-MM-DD`.
    fn date_stamp(&self) -> String {
        self.today().format(DATE_FORMAT).to_string()
    }
}

/// The machine's local clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stuck at one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
