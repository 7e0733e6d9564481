use chrono::{DateTime, Local, TimeZone};

use crate::models::CalendarDate;

/// Supplies the current local calendar date
pub trait Clock {
    fn today(&self) -> CalendarDate;
}

/// Wall clock in the user's local time zone
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> CalendarDate {
        calendar_day(&Local::now())
    }
}

/// Clock pinned to a given date, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub CalendarDate);

impl Clock for FixedClock {
    fn today(&self) -> CalendarDate {
        self.0
    }
}

/// Calendar date of an instant as seen in its own time zone
pub fn calendar_day<Tz: TimeZone>(instant: &DateTime<Tz>) -> CalendarDate {
    instant.date_naive()
}
