//! Domain types for trip itineraries.
//!
//! All types enforce their invariants at construction time, so code that
//! receives a `DateRange` or `Location` can trust its validity.

mod dates;
mod ids;
mod location;
mod stop;
mod trip;

pub use dates::{DateError, DateRange, days_between, parse_calendar_date, shift_date};
pub use ids::{StopId, TripId, WaypointId};
pub use location::{InvalidLocation, Location};
pub use stop::{Stop, Waypoint};
pub use trip::Trip;
