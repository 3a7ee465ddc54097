//! Immutable ordered snapshot of a trip's stops.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::{DateRange, Stop, StopId, Trip, days_between};

use super::error::{EngineError, Missing};

/// New dates for one stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StopUpdate {
    pub id: StopId,
    #[serde(flatten)]
    pub dates: DateRange,
}

impl StopUpdate {
    pub fn new(id: StopId, dates: DateRange) -> Self {
        Self { id, dates }
    }
}

/// New position for one stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderUpdate {
    pub id: StopId,
    pub order_index: u32,
}

impl OrderUpdate {
    pub fn new(id: StopId, order_index: u32) -> Self {
        Self { id, order_index }
    }
}

/// A date inconsistency between two consecutive stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateIssue {
    /// `later` arrives `days` days before `earlier` departs.
    Overlap {
        earlier: StopId,
        later: StopId,
        days: i64,
    },
    /// `later` arrives `days` days after `earlier` departs.
    Gap {
        earlier: StopId,
        later: StopId,
        days: i64,
    },
}

/// The stops of a trip, sorted by `order_index`.
///
/// An itinerary is a snapshot: engine operations read it and return
/// updates, and the caller owns applying them to the authoritative store.
///
/// # Invariants
///
/// - Stops are sorted by `order_index`
/// - No two stops share an `order_index`
/// - No two stops share an id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Itinerary {
    stops: Vec<Stop>,
}

impl Itinerary {
    /// Build a snapshot, sorting stops by `order_index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if two stops share an `order_index` or an id.
    pub fn new(mut stops: Vec<Stop>) -> Result<Self, EngineError> {
        stops.sort_by_key(|s| s.order_index);

        for pair in stops.windows(2) {
            if pair[0].order_index == pair[1].order_index {
                return Err(EngineError::InvalidInput(format!(
                    "stops {} and {} share order index {}",
                    pair[0].id, pair[1].id, pair[0].order_index
                )));
            }
        }

        let mut seen = HashSet::with_capacity(stops.len());
        for stop in &stops {
            if !seen.insert(stop.id) {
                return Err(EngineError::InvalidInput(format!(
                    "stop {} appears more than once",
                    stop.id
                )));
            }
        }

        Ok(Self { stops })
    }

    /// Snapshot of a trip's stops.
    pub fn from_trip(trip: &Trip) -> Result<Self, EngineError> {
        Self::new(trip.stops.clone())
    }

    /// Stops in order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn first(&self) -> Option<&Stop> {
        self.stops.first()
    }

    pub fn last(&self) -> Option<&Stop> {
        self.stops.last()
    }

    /// Look up a stop by id.
    pub fn get(&self, id: StopId) -> Option<&Stop> {
        self.stops.iter().find(|s| s.id == id)
    }

    /// Position of a stop in sequence order.
    pub fn position(&self, id: StopId) -> Result<usize, EngineError> {
        self.stops
            .iter()
            .position(|s| s.id == id)
            .ok_or(EngineError::NotFound(Missing::Stop(id)))
    }

    /// The stop immediately after `id`, if any.
    pub fn next_after(&self, id: StopId) -> Result<Option<&Stop>, EngineError> {
        let pos = self.position(id)?;
        Ok(self.stops.get(pos + 1))
    }

    /// Earliest arrival to latest departure across all stops.
    ///
    /// Stops need not be in date order, so this is a min/max rather than
    /// first/last.
    pub fn span(&self) -> Option<DateRange> {
        let start = self.stops.iter().map(Stop::start_date).min()?;
        let end = self.stops.iter().map(Stop::end_date).max()?;
        DateRange::new(start, end).ok()
    }

    /// Sum of nights over all stops.
    pub fn total_nights(&self) -> i64 {
        self.stops.iter().map(Stop::nights).sum()
    }

    /// Compare each stop's departure with the next stop's arrival.
    ///
    /// A next stop arriving on the previous stop's departure day is the
    /// normal shared transition day and is not reported.
    pub fn check_consistency(&self) -> Vec<DateIssue> {
        self.stops
            .windows(2)
            .filter_map(|pair| {
                let (earlier, later) = (&pair[0], &pair[1]);
                let days = days_between(earlier.end_date(), later.start_date());
                match days {
                    0 => None,
                    d if d < 0 => Some(DateIssue::Overlap {
                        earlier: earlier.id,
                        later: later.id,
                        days: -d,
                    }),
                    d => Some(DateIssue::Gap {
                        earlier: earlier.id,
                        later: later.id,
                        days: d,
                    }),
                }
            })
            .collect()
    }

    /// A new snapshot with date updates applied in order.
    pub fn apply_updates(&self, updates: &[StopUpdate]) -> Result<Self, EngineError> {
        let mut stops = self.stops.clone();
        for update in updates {
            let stop = stops
                .iter_mut()
                .find(|s| s.id == update.id)
                .ok_or(EngineError::NotFound(Missing::Stop(update.id)))?;
            stop.dates = update.dates;
        }
        Ok(Self { stops })
    }

    /// A new snapshot with order updates applied, re-sorted.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, or `InvalidInput` if the result would
    /// have duplicate order indices.
    pub fn apply_order_updates(&self, updates: &[OrderUpdate]) -> Result<Self, EngineError> {
        let mut stops = self.stops.clone();
        for update in updates {
            let stop = stops
                .iter_mut()
                .find(|s| s.id == update.id)
                .ok_or(EngineError::NotFound(Missing::Stop(update.id)))?;
            stop.order_index = update.order_index;
        }
        Self::new(stops)
    }

    /// Consume the snapshot, returning its stops in order.
    pub fn into_stops(self) -> Vec<Stop> {
        self.stops
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::domain::{DateRange, Location, Stop, StopId};

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A stop with id `id`, order index `id`, from `start` to `end`.
    pub fn stop(id: u64, start: NaiveDate, end: NaiveDate) -> Stop {
        Stop::new(
            StopId(id),
            id as u32,
            format!("Stop {id}"),
            DateRange::new(start, end).unwrap(),
            Location::address(format!("Town {id}")).unwrap(),
        )
    }

    /// Stops chained on shared transition days, starting on `start`, one
    /// per entry of `nights`.
    pub fn chain(start: NaiveDate, nights: &[u32]) -> Vec<Stop> {
        let mut cursor = start;
        nights
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let range = DateRange::from_nights(cursor, n).unwrap();
                cursor = range.end();
                stop(i as u64, range.start(), range.end())
            })
            .collect()
    }
}
