//! Itinerary date engine.
//!
//! Owns all date computation and validation for the ordered stops of a
//! trip: proposing dates for a new stop, detecting when a longer stay
//! collides with the following stop, and computing the cascading updates
//! for each resolution strategy.
//!
//! Operations read an [`Itinerary`] snapshot and return new values. Applying
//! the returned updates, and serialising concurrent edits to the same trip,
//! is the caller's job.

mod calendar;
mod config;
mod conflict;
mod error;
mod itinerary;
mod ordering;
mod route;

pub use calendar::{CalendarDay, CalendarEntry, CalendarGrid, CalendarMonth};
pub use config::EngineConfig;
pub use conflict::{DurationCheck, Resolution};
pub use error::{EngineError, Missing};
pub use itinerary::{DateIssue, Itinerary, OrderUpdate, StopUpdate};
pub use ordering::{
    InsertionPlan, RedatePolicy, ReorderPlan, assign_waypoint_order_index, order_between,
};
pub use route::{RoutePoint, route_points};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::domain::{DateRange, StopId};

/// Where a new stop goes in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    /// Before every existing stop.
    StartOfTrip,
    /// Immediately after the given stop.
    After(StopId),
}

/// The date engine: an injected clock plus configuration.
///
/// # Examples
///
/// ```
/// use trip_planner::clock::FixedClock;
/// use trip_planner::engine::{DateEngine, EngineConfig, InsertPosition, Itinerary};
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let engine = DateEngine::new(FixedClock(today), EngineConfig::default());
///
/// let proposal = engine
///     .propose_dates(&Itinerary::default(), InsertPosition::StartOfTrip, 2)
///     .unwrap();
/// assert_eq!(proposal.start(), today);
/// assert_eq!(proposal.nights(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct DateEngine<C = SystemClock> {
    clock: C,
    config: EngineConfig,
}

impl Default for DateEngine<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock, EngineConfig::default())
    }
}

impl<C: Clock> DateEngine<C> {
    /// Create an engine with the given clock and configuration.
    pub fn new(clock: C, config: EngineConfig) -> Self {
        Self { clock, config }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Propose a date range for a new stop.
    ///
    /// At the start of the trip the stop begins today. After an existing
    /// stop it begins on that stop's departure day, which the two stops
    /// share as a transition day. The range lasts `nights` nights; values
    /// below 1 are clamped to 1.
    ///
    /// # Errors
    ///
    /// `NotFound` if `position` names an unknown stop, or `InvalidInput` if
    /// the end date would be out of range.
    pub fn propose_dates(
        &self,
        itinerary: &Itinerary,
        position: InsertPosition,
        nights: i64,
    ) -> Result<DateRange, EngineError> {
        let start = match position {
            InsertPosition::StartOfTrip => self.clock.today(),
            InsertPosition::After(id) => {
                let pos = itinerary.position(id)?;
                itinerary.stops()[pos].end_date()
            }
        };

        if nights < 1 {
            debug!(nights, "clamping proposed nights to 1");
        }
        let nights = u32::try_from(nights.max(1))
            .map_err(|_| EngineError::InvalidInput(format!("{nights} nights is too many")))?;

        Ok(DateRange::from_nights(start, nights)?)
    }

    /// Propose dates using the configured default number of nights.
    pub fn propose_default_dates(
        &self,
        itinerary: &Itinerary,
        position: InsertPosition,
    ) -> Result<DateRange, EngineError> {
        self.propose_dates(itinerary, position, i64::from(self.config.default_nights))
    }
}

#[cfg(test)]
mod tests {
    use super::itinerary::test_support::*;
    use super::*;
    use crate::clock::FixedClock;

    fn engine() -> DateEngine<FixedClock> {
        DateEngine::new(FixedClock(date(2024, 6, 1)), EngineConfig::default())
    }

    #[test]
    fn start_of_trip_uses_clock() {
        let it = Itinerary::new(chain(date(2024, 7, 1), &[2])).unwrap();
        let proposal = engine()
            .propose_dates(&it, InsertPosition::StartOfTrip, 3)
            .unwrap();
        assert_eq!(proposal.start(), date(2024, 6, 1));
        assert_eq!(proposal.end(), date(2024, 6, 4));
    }

    #[test]
    fn after_stop_shares_transition_day() {
        let it = Itinerary::new(vec![stop(1, date(2024, 6, 7), date(2024, 6, 10))]).unwrap();
        let proposal = engine()
            .propose_dates(&it, InsertPosition::After(StopId(1)), 3)
            .unwrap();
        assert_eq!(proposal.start(), date(2024, 6, 10));
        assert_eq!(proposal.end(), date(2024, 6, 13));
    }

    #[test]
    fn nights_below_one_are_clamped() {
        let it = Itinerary::default();
        for nights in [0, -1, -100] {
            let proposal = engine()
                .propose_dates(&it, InsertPosition::StartOfTrip, nights)
                .unwrap();
            assert_eq!(proposal.nights(), 1);
        }
    }

    #[test]
    fn unknown_stop() {
        let it = Itinerary::new(chain(date(2024, 6, 10), &[2])).unwrap();
        assert_eq!(
            engine().propose_dates(&it, InsertPosition::After(StopId(42)), 2),
            Err(EngineError::NotFound(Missing::Stop(StopId(42))))
        );
    }

    #[test]
    fn too_many_nights() {
        let it = Itinerary::default();
        assert!(matches!(
            engine().propose_dates(&it, InsertPosition::StartOfTrip, i64::MAX),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            engine().propose_dates(&it, InsertPosition::StartOfTrip, i64::from(u32::MAX)),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn default_nights_from_config() {
        let engine = DateEngine::new(
            FixedClock(date(2024, 6, 1)),
            EngineConfig {
                default_nights: 4,
                ..EngineConfig::default()
            },
        );
        let proposal = engine
            .propose_default_dates(&Itinerary::default(), InsertPosition::StartOfTrip)
            .unwrap();
        assert_eq!(proposal.end(), date(2024, 6, 5));
    }

    #[test]
    fn insert_position_serde() {
        assert_eq!(
            serde_json::to_value(InsertPosition::After(StopId(3))).unwrap(),
            serde_json::json!({"after": 3})
        );
        assert_eq!(
            serde_json::to_value(InsertPosition::StartOfTrip).unwrap(),
            serde_json::json!("start_of_trip")
        );
    }
}
