//! Trip snapshot files.
//!
//! A snapshot is the JSON export of a trip as the store serves it: trip
//! fields, its stops (with any extra store fields, which are ignored) and
//! its waypoints. Loading validates dates, locations and stop ordering.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::Trip;
use crate::engine::{EngineError, Itinerary};

/// Error loading or saving a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Failed to read or write the file
    #[error("snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON, or field values that fail validation
    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Stops that cannot form an itinerary
    #[error("invalid itinerary: {0}")]
    Engine(#[from] EngineError),
}

/// Parse and validate a trip snapshot.
pub fn parse_trip(json: &str) -> Result<Trip, SnapshotError> {
    let trip: Trip = serde_json::from_str(json)?;
    Itinerary::from_trip(&trip)?;
    Ok(trip)
}

/// Read a trip snapshot from disk.
pub fn load_trip(path: &Path) -> Result<Trip, SnapshotError> {
    let json = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let trip = parse_trip(&json)?;
    debug!(
        path = %path.display(),
        trip = %trip.id,
        stops = trip.stops.len(),
        waypoints = trip.waypoints.len(),
        "loaded trip snapshot"
    );
    Ok(trip)
}

/// Write a trip snapshot to disk as pretty-printed JSON.
pub fn dump_trip(trip: &Trip, path: &Path) -> Result<(), SnapshotError> {
    let json = serde_json::to_string_pretty(trip)?;
    fs::write(path, json).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace a trip's stops with an updated itinerary and write it to disk.
pub fn store_itinerary(
    mut trip: Trip,
    itinerary: Itinerary,
    path: &Path,
) -> Result<Trip, SnapshotError> {
    trip.stops = itinerary.into_stops();
    dump_trip(&trip, path)?;
    debug!(path = %path.display(), trip = %trip.id, "stored trip snapshot");
    Ok(trip)
}
