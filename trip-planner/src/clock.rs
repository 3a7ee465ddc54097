//! Source of "today" for date proposals.
//!
//! The engine never reads the ambient clock directly; callers inject a
//! [`Clock`], so proposals for the start of a trip are reproducible in
//! tests.

use chrono::{Local, NaiveDate};

/// Provides the current local calendar date.
pub trait Clock {
    /// Today's date in the user's local calendar, time of day discarded.
    fn today(&self) -> NaiveDate;
}

/// Reads the system's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date.
///
/// # Examples
///
/// ```
/// use trip_planner::clock::{Clock, FixedClock};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// assert_eq!(FixedClock(date).today(), date);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
