//! Calendar-date handling for stops.
//!
//! Stop dates are calendar dates with no time of day and no zone, so all
//! arithmetic in this module is whole-day arithmetic and is unaffected by
//! DST transitions. A stop's end date is its departure day: the next stop
//! may start on that same day without either stop counting it as a night.

use std::fmt;

use chrono::{Days, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

/// Error returned for malformed or inconsistent dates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date: {reason}")]
pub struct DateError {
    reason: &'static str,
}

impl DateError {
    pub(crate) fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a calendar date.
///
/// Accepts `YYYY-MM-DD`, or a `YYYY-MM-DDTHH:MM:SS` timestamp (optionally
/// with fractional seconds and a trailing `Z`) whose time of day is exactly
/// midnight. Any other time of day would describe a fractional day and is
/// rejected.
///
/// # Examples
///
/// ```
/// use trip_planner::domain::parse_calendar_date;
/// use chrono::NaiveDate;
///
/// let d = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
/// assert_eq!(parse_calendar_date("2024-06-10").unwrap(), d);
/// assert_eq!(parse_calendar_date("2024-06-10T00:00:00").unwrap(), d);
///
/// assert!(parse_calendar_date("2024-06-10T23:59:59").is_err());
/// assert!(parse_calendar_date("10/06/2024").is_err());
/// ```
pub fn parse_calendar_date(s: &str) -> Result<NaiveDate, DateError> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    let s = s.strip_suffix('Z').unwrap_or(s);
    let dt = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| DateError::new("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"))?;

    let time = dt.time();
    if time.num_seconds_from_midnight() != 0 || time.nanosecond() != 0 {
        return Err(DateError::new("time of day must be midnight"));
    }

    Ok(dt.date())
}

/// Move a date by a signed number of calendar days.
pub fn shift_date(date: NaiveDate, days: i64) -> Result<NaiveDate, DateError> {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| DateError::new("date out of range"))
}

/// Whole calendar days from `from` to `to` (negative if `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Deserialize a date through [`parse_calendar_date`].
fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_calendar_date(&s).map_err(serde::de::Error::custom)
}

/// The dates a stop occupies: arrival day through departure day.
///
/// Guarantees `start <= end`. A range where both are equal is a zero-night
/// stop (a day visit).
///
/// # Examples
///
/// ```
/// use trip_planner::domain::DateRange;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
/// let range = DateRange::from_nights(start, 3).unwrap();
/// assert_eq!(range.end(), NaiveDate::from_ymd_opt(2024, 6, 13).unwrap());
/// assert_eq!(range.nights(), 3);
///
/// // End before start is rejected
/// assert!(DateRange::new(range.end(), start).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    #[serde(rename = "start_date")]
    start: NaiveDate,
    #[serde(rename = "end_date")]
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    #[serde(deserialize_with = "deserialize_date")]
    start_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_date")]
    end_date: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = DateError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        Self::new(raw.start_date, raw.end_date)
    }
}

impl DateRange {
    /// Create a range, rejecting an end date before the start date.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateError> {
        if end < start {
            return Err(DateError::new("end date must not be before start date"));
        }
        Ok(Self { start, end })
    }

    /// Create a range of `nights` nights beginning on `start`.
    pub fn from_nights(start: NaiveDate, nights: u32) -> Result<Self, DateError> {
        let end = start
            .checked_add_days(Days::new(u64::from(nights)))
            .ok_or_else(|| DateError::new("date out of range"))?;
        Ok(Self { start, end })
    }

    /// Arrival day.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Departure day.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of nights spent, by calendar-day difference.
    pub fn nights(&self) -> i64 {
        days_between(self.start, self.end)
    }

    /// Returns true if `day` falls within the range, both ends inclusive.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// The same range moved by `days` calendar days.
    pub fn shifted(&self, days: i64) -> Result<Self, DateError> {
        Ok(Self {
            start: shift_date(self.start, days)?,
            end: shift_date(self.end, days)?,
        })
    }

    /// Every day in the range, arrival and departure days included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let count = self.nights() as usize + 1;
        self.start.iter_days().take(count)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_plain_date() {
        assert_eq!(parse_calendar_date("2024-06-10").unwrap(), date(2024, 6, 10));
        assert_eq!(parse_calendar_date(" 2024-02-29 ").unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn parse_midnight_timestamps() {
        assert_eq!(
            parse_calendar_date("2024-06-10T00:00:00").unwrap(),
            date(2024, 6, 10)
        );
        assert_eq!(
            parse_calendar_date("2024-06-10T00:00:00.000").unwrap(),
            date(2024, 6, 10)
        );
        assert_eq!(
            parse_calendar_date("2024-06-10T00:00:00Z").unwrap(),
            date(2024, 6, 10)
        );
    }

    #[test]
    fn reject_fractional_day() {
        assert!(parse_calendar_date("2024-06-10T23:59:59").is_err());
        assert!(parse_calendar_date("2024-06-10T12:00:00").is_err());
        assert!(parse_calendar_date("2024-06-10T00:00:00.5").is_err());
    }

    #[test]
    fn reject_malformed() {
        assert!(parse_calendar_date("").is_err());
        assert!(parse_calendar_date("2024-13-01").is_err());
        assert!(parse_calendar_date("2023-02-29").is_err());
        assert!(parse_calendar_date("10/06/2024").is_err());
        assert!(parse_calendar_date("tomorrow").is_err());
    }

    #[test]
    fn error_display() {
        let err = parse_calendar_date("2024-06-10T08:00:00").unwrap_err();
        assert_eq!(err.to_string(), "invalid date: time of day must be midnight");
    }

    #[test]
    fn shift_across_dst_and_month_ends() {
        // Europe and US DST changes are irrelevant to calendar dates.
        assert_eq!(shift_date(date(2024, 3, 30), 2).unwrap(), date(2024, 4, 1));
        assert_eq!(shift_date(date(2024, 11, 2), 1).unwrap(), date(2024, 11, 3));
        assert_eq!(shift_date(date(2024, 3, 1), -1).unwrap(), date(2024, 2, 29));
        assert_eq!(shift_date(date(2024, 12, 31), 1).unwrap(), date(2025, 1, 1));
    }

    #[test]
    fn shift_overflow() {
        assert!(shift_date(NaiveDate::MAX, 1).is_err());
        assert!(shift_date(NaiveDate::MIN, -1).is_err());
    }

    #[test]
    fn range_rejects_end_before_start() {
        assert!(DateRange::new(date(2024, 6, 10), date(2024, 6, 9)).is_err());
        assert!(DateRange::new(date(2024, 6, 10), date(2024, 6, 10)).is_ok());
    }

    #[test]
    fn nights_count() {
        let r = DateRange::new(date(2024, 6, 10), date(2024, 6, 13)).unwrap();
        assert_eq!(r.nights(), 3);

        let day_visit = DateRange::new(date(2024, 6, 10), date(2024, 6, 10)).unwrap();
        assert_eq!(day_visit.nights(), 0);

        // Spans the March DST change in Europe
        let r = DateRange::new(date(2024, 3, 30), date(2024, 4, 2)).unwrap();
        assert_eq!(r.nights(), 3);
    }

    #[test]
    fn contains_is_inclusive() {
        let r = DateRange::new(date(2024, 6, 10), date(2024, 6, 12)).unwrap();
        assert!(!r.contains(date(2024, 6, 9)));
        assert!(r.contains(date(2024, 6, 10)));
        assert!(r.contains(date(2024, 6, 12)));
        assert!(!r.contains(date(2024, 6, 13)));
    }

    #[test]
    fn days_iterates_inclusive() {
        let r = DateRange::new(date(2024, 6, 30), date(2024, 7, 2)).unwrap();
        let days: Vec<_> = r.days().collect();
        assert_eq!(days, vec![date(2024, 6, 30), date(2024, 7, 1), date(2024, 7, 2)]);
    }

    #[test]
    fn display() {
        let r = DateRange::new(date(2024, 6, 10), date(2024, 6, 13)).unwrap();
        assert_eq!(r.to_string(), "2024-06-10 to 2024-06-13");
    }

    #[test]
    fn serde_uses_stop_field_names() {
        let r = DateRange::new(date(2024, 6, 10), date(2024, 6, 13)).unwrap();
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"start_date": "2024-06-10", "end_date": "2024-06-13"})
        );
    }

    #[test]
    fn deserialize_accepts_midnight_timestamps() {
        let r: DateRange = serde_json::from_str(
            r#"{"start_date": "2024-06-10T00:00:00", "end_date": "2024-06-13"}"#,
        )
        .unwrap();
        assert_eq!(r.start(), date(2024, 6, 10));
        assert_eq!(r.end(), date(2024, 6, 13));
    }

    #[test]
    fn deserialize_rejects_inverted_range() {
        let result: Result<DateRange, _> =
            serde_json::from_str(r#"{"start_date": "2024-06-13", "end_date": "2024-06-10"}"#);
        assert!(result.is_err());
    }
}
