//! Route drawing order.

use serde::Serialize;

use crate::domain::{Location, Stop, Trip, Waypoint};

/// A point on the drawn route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoutePoint<'a> {
    /// The trip's undated starting anchor.
    TripStart { location: &'a Location },
    Stop { stop: &'a Stop },
    Waypoint { waypoint: &'a Waypoint },
    /// The trip's undated finishing anchor.
    TripEnd { location: &'a Location },
}

impl<'a> RoutePoint<'a> {
    pub fn location(&self) -> &'a Location {
        match *self {
            RoutePoint::TripStart { location } | RoutePoint::TripEnd { location } => location,
            RoutePoint::Stop { stop } => &stop.location,
            RoutePoint::Waypoint { waypoint } => &waypoint.location,
        }
    }
}

/// Points in the order the route passes through them.
///
/// Stops and waypoints are merged by order index, a stop coming before a
/// waypoint with the same index. The start and end anchors, when set, open
/// and close the sequence.
pub fn route_points(trip: &Trip) -> Vec<RoutePoint<'_>> {
    let mut middle: Vec<(f64, RoutePoint<'_>)> = trip
        .stops
        .iter()
        .map(|stop| (f64::from(stop.order_index), RoutePoint::Stop { stop }))
        .chain(
            trip.waypoints
                .iter()
                .map(|waypoint| (waypoint.order_index, RoutePoint::Waypoint { waypoint })),
        )
        .collect();
    middle.sort_by(|a, b| a.0.total_cmp(&b.0));

    trip.start_location
        .iter()
        .map(|location| RoutePoint::TripStart { location })
        .chain(middle.into_iter().map(|(_, point)| point))
        .chain(
            trip.end_location
                .iter()
                .map(|location| RoutePoint::TripEnd { location }),
        )
        .collect()
}
