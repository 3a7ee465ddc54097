//! Stop and waypoint locations.

use serde::{Deserialize, Serialize};

/// Error returned when constructing an invalid location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid location: {reason}")]
pub struct InvalidLocation {
    reason: &'static str,
}

/// Where a stop or waypoint is.
///
/// Either a free-form address or a pair of GPS coordinates. Serialized with
/// a `location_type` tag of `"address"` or `"gps"`.
///
/// # Examples
///
/// ```
/// use trip_planner::domain::Location;
///
/// let home = Location::gps(48.8566, 2.3522).unwrap();
/// assert_eq!(home.coordinates(), Some((48.8566, 2.3522)));
///
/// assert!(Location::gps(91.0, 0.0).is_err());
/// assert!(Location::address("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "location_type", rename_all = "lowercase", try_from = "LocationRecord")]
pub enum Location {
    /// A postal or descriptive address.
    Address { address: String },
    /// WGS84 coordinates in degrees.
    Gps { latitude: f64, longitude: f64 },
}

/// Unvalidated wire form of [`Location`].
#[derive(Deserialize)]
#[serde(tag = "location_type", rename_all = "lowercase")]
enum LocationRecord {
    Address { address: String },
    Gps { latitude: f64, longitude: f64 },
}

impl TryFrom<LocationRecord> for Location {
    type Error = InvalidLocation;

    fn try_from(record: LocationRecord) -> Result<Self, Self::Error> {
        match record {
            LocationRecord::Address { address } => Location::address(address),
            LocationRecord::Gps {
                latitude,
                longitude,
            } => Location::gps(latitude, longitude),
        }
    }
}

impl Location {
    /// Create an address location. The address must not be blank.
    pub fn address(address: impl Into<String>) -> Result<Self, InvalidLocation> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(InvalidLocation {
                reason: "address cannot be empty",
            });
        }
        Ok(Location::Address { address })
    }

    /// Create a GPS location, validating coordinate ranges.
    pub fn gps(latitude: f64, longitude: f64) -> Result<Self, InvalidLocation> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidLocation {
                reason: "latitude must be between -90 and 90",
            });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidLocation {
                reason: "longitude must be between -180 and 180",
            });
        }
        Ok(Location::Gps {
            latitude,
            longitude,
        })
    }

    /// Returns `(latitude, longitude)` for GPS locations.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match self {
            Location::Gps {
                latitude,
                longitude,
            } => Some((*latitude, *longitude)),
            Location::Address { .. } => None,
        }
    }

    /// Returns the address for address locations.
    pub fn as_address(&self) -> Option<&str> {
        match self {
            Location::Address { address } => Some(address),
            Location::Gps { .. } => None,
        }
    }
}
