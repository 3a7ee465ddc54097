//! Trip type.

use serde::{Deserialize, Serialize};

use super::{Location, Stop, TripId, Waypoint};

/// A trip: its stops, waypoints and optional undated end points.
///
/// `start_location` and `end_location` are anchors drawn at the two ends of
/// the route; they carry no dates and take no part in date computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<Location>,
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
}

impl Trip {
    /// Create an empty trip.
    pub fn new(id: TripId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            start_location: None,
            end_location: None,
            stops: Vec::new(),
            waypoints: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_trip_deserializes() {
        let trip: Trip = serde_json::from_str(r#"{"id": 1, "name": "Alps"}"#).unwrap();
        assert_eq!(trip, Trip::new(TripId(1), "Alps"));
    }

    #[test]
    fn anchors_omitted_when_absent() {
        let json = serde_json::to_value(Trip::new(TripId(1), "Alps")).unwrap();
        assert!(json.get("start_location").is_none());
        assert!(json.get("end_location").is_none());
    }
}
