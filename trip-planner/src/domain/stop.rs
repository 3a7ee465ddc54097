//! Stops and waypoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DateRange, Location, StopId, WaypointId};

/// A dated itinerary location.
///
/// Stops are ordered within a trip by `order_index`. The date range runs
/// from the arrival day to the departure day; the departure day may be
/// shared with the next stop's arrival day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Store-assigned identifier
    pub id: StopId,
    /// Position within the trip
    pub order_index: u32,
    /// Display name
    pub name: String,
    /// Arrival and departure days
    #[serde(flatten)]
    pub dates: DateRange,
    /// Where the stop is
    #[serde(flatten)]
    pub location: Location,
}

impl Stop {
    /// Create a new stop.
    pub fn new(
        id: StopId,
        order_index: u32,
        name: impl Into<String>,
        dates: DateRange,
        location: Location,
    ) -> Self {
        Self {
            id,
            order_index,
            name: name.into(),
            dates,
            location,
        }
    }

    /// Arrival day.
    pub fn start_date(&self) -> NaiveDate {
        self.dates.start()
    }

    /// Departure day.
    pub fn end_date(&self) -> NaiveDate {
        self.dates.end()
    }

    /// Nights spent at this stop, by calendar-day difference.
    pub fn nights(&self) -> i64 {
        self.dates.nights()
    }
}

/// An undated point between stops, used for route drawing.
///
/// Waypoints use a fractional `order_index` so they can be slotted between
/// two stops (or two waypoints) without renumbering anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub order_index: f64,
    pub name: String,
    #[serde(flatten)]
    pub location: Location,
}

impl Waypoint {
    /// Create a new waypoint.
    pub fn new(id: WaypointId, order_index: f64, name: impl Into<String>, location: Location) -> Self {
        Self {
            id,
            order_index,
            name: name.into(),
            location,
        }
    }
}
