//! Month-grid calendar of which stops are active on which day.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::clock::Clock;
use crate::domain::StopId;

use super::DateEngine;
use super::error::EngineError;
use super::itinerary::Itinerary;

/// A stop's presence on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
    pub stop_id: StopId,
    pub name: String,
    /// The stop's arrival day: render the start label.
    pub is_first_day: bool,
    /// The stop's departure day: end the continuation bar.
    pub is_last_day: bool,
}

/// One day cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Every stop active that day, in sequence order.
    pub stops: Vec<CalendarEntry>,
}

/// One month laid out in whole weeks.
///
/// Cells before the 1st and after the last day of the month are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[Option<CalendarDay>; 7]>,
}

impl CalendarMonth {
    /// Days of the month, in order, skipping padding cells.
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.weeks.iter().flatten().flatten()
    }
}

/// Calendar covering a trip's dates, widened to whole months.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CalendarGrid {
    pub months: Vec<CalendarMonth>,
}

impl CalendarGrid {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Looks up a single day.
    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.months
            .iter()
            .find(|m| m.year == date.year() && m.month == date.month())
            .and_then(|m| m.days().find(|d| d.date == date))
    }
}

/// Cells before the 1st when weeks begin on `week_start`.
fn leading_blanks(first: NaiveDate, week_start: Weekday) -> usize {
    let offset = 7 + first.weekday().num_days_from_monday() - week_start.num_days_from_monday();
    (offset % 7) as usize
}

fn build_month(
    first: NaiveDate,
    itinerary: &Itinerary,
    week_start: Weekday,
) -> Result<CalendarMonth, EngineError> {
    let next = first
        .checked_add_months(Months::new(1))
        .ok_or_else(|| EngineError::InvalidInput("date out of range".to_string()))?;

    let mut cells: Vec<Option<CalendarDay>> = vec![None; leading_blanks(first, week_start)];
    for date in first.iter_days().take_while(|d| *d < next) {
        let stops = itinerary
            .stops()
            .iter()
            .filter(|s| s.dates.contains(date))
            .map(|s| CalendarEntry {
                stop_id: s.id,
                name: s.name.clone(),
                is_first_day: date == s.start_date(),
                is_last_day: date == s.end_date(),
            })
            .collect();
        cells.push(Some(CalendarDay { date, stops }));
    }

    let week_count = cells.len().div_ceil(7);
    let mut cells = cells.into_iter();
    let weeks: Vec<[Option<CalendarDay>; 7]> = (0..week_count)
        .map(|_| std::array::from_fn(|_| cells.next().flatten()))
        .collect();

    Ok(CalendarMonth {
        year: first.year(),
        month: first.month(),
        weeks,
    })
}

impl<C: Clock> DateEngine<C> {
    /// Lay out the trip's days as month grids.
    ///
    /// Covers the earliest arrival to the latest departure across all
    /// stops, widened to whole months. A day lists every stop whose range
    /// includes it, arrival and departure days both inclusive, so a
    /// transition day shows both the departing and the arriving stop.
    ///
    /// `months_span` caps the number of months from the first; `None` uses
    /// the whole span.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `months_span` is zero, or if the months to lay out
    /// exceed the configured maximum.
    pub fn compute_calendar_grid(
        &self,
        itinerary: &Itinerary,
        months_span: Option<u32>,
    ) -> Result<CalendarGrid, EngineError> {
        if months_span == Some(0) {
            return Err(EngineError::InvalidInput(
                "months span must be at least 1".to_string(),
            ));
        }
        let Some(span) = itinerary.span() else {
            return Ok(CalendarGrid::default());
        };

        let covered = months_covered(span.start(), span.end());
        let wanted = months_span.map_or(covered, |n| covered.min(i64::from(n)));
        let max = self.config().max_calendar_months;
        if wanted > i64::from(max) {
            return Err(EngineError::InvalidInput(format!(
                "calendar would cover {wanted} months, more than the maximum of {max}"
            )));
        }

        let mut month_start = span.start().with_day(1).ok_or_else(|| {
            EngineError::InvalidInput("date out of range".to_string())
        })?;
        let mut months = Vec::new();
        for _ in 0..wanted {
            months.push(build_month(month_start, itinerary, self.config().week_start)?);
            month_start = match month_start.checked_add_months(Months::new(1)) {
                Some(next) => next,
                None => break,
            };
        }

        debug!(months = months.len(), "laid out calendar");
        Ok(CalendarGrid { months })
    }
}

/// Calendar months touched from `start` to `end`, both inclusive.
fn months_covered(start: NaiveDate, end: NaiveDate) -> i64 {
    let years = i64::from(end.year()) - i64::from(start.year());
    years * 12 + i64::from(end.month()) - i64::from(start.month()) + 1
}
