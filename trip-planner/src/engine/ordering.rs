//! Sequence positions for stops and waypoints.
//!
//! Stops carry integer order indices that are renumbered as stops are
//! inserted, removed and reordered. Waypoints carry fractional indices
//! placed strictly between their neighbours, so inserting one never
//! renumbers anything.
//!
//! Repeated bisection between the same pair eventually runs out of `f64`
//! precision. That limit is accepted: in practice a handful of waypoints
//! sit between any two stops.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::domain::{DateRange, Stop, StopId};

use super::InsertPosition;
use super::error::EngineError;
use super::itinerary::{Itinerary, OrderUpdate, StopUpdate};

/// Order index for a slot between two neighbours.
///
/// - both present: their midpoint
/// - only `after`: one below it
/// - only `before`: one above it
/// - neither (empty itinerary): `0.0`
///
/// # Errors
///
/// `InvalidInput` if `before` is not strictly less than `after`.
///
/// # Examples
///
/// ```
/// use trip_planner::engine::order_between;
///
/// assert_eq!(order_between(Some(1.0), Some(2.0)).unwrap(), 1.5);
/// assert_eq!(order_between(None, Some(0.0)).unwrap(), -1.0);
/// assert_eq!(order_between(Some(3.0), None).unwrap(), 4.0);
/// assert!(order_between(Some(2.0), Some(2.0)).is_err());
/// ```
pub fn order_between(before: Option<f64>, after: Option<f64>) -> Result<f64, EngineError> {
    match (before, after) {
        (Some(b), Some(a)) => {
            if b >= a {
                return Err(EngineError::InvalidInput(format!(
                    "order index {b} is not before {a}"
                )));
            }
            Ok(b + (a - b) / 2.0)
        }
        (None, Some(a)) => Ok(a - 1.0),
        (Some(b), None) => Ok(b + 1.0),
        (None, None) => Ok(0.0),
    }
}

/// Order index for a waypoint inserted between two stops.
///
/// `before` is absent when inserting ahead of the first stop, `after` when
/// inserting past the last.
pub fn assign_waypoint_order_index(
    before: Option<&Stop>,
    after: Option<&Stop>,
) -> Result<f64, EngineError> {
    order_between(
        before.map(|s| f64::from(s.order_index)),
        after.map(|s| f64::from(s.order_index)),
    )
}

/// Where a new stop lands and which stops move to make room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertionPlan {
    /// Order index for the new stop.
    pub order_index: u32,
    /// Renumbered followers, in sequence order.
    pub shifted: Vec<OrderUpdate>,
}

/// How reordering treats dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedatePolicy {
    /// Keep every stop's dates; only positions change.
    #[default]
    KeepDates,
    /// Re-chain dates in the new order from the trip's original first
    /// arrival, keeping each stop's nights and sharing transition days.
    Rechain,
}

/// Result of reordering stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReorderPlan {
    /// New order index for every stop, in the new sequence.
    pub order: Vec<OrderUpdate>,
    /// Stops whose dates change, in the new sequence.
    pub dates: Vec<StopUpdate>,
}

fn bump(index: u32, id: StopId) -> Result<u32, EngineError> {
    index
        .checked_add(1)
        .ok_or_else(|| EngineError::InvalidInput(format!("stop {id} order index overflows")))
}

impl Itinerary {
    /// Plan the positions for inserting a new stop.
    ///
    /// The new stop takes the slot right after `position` (or the first
    /// slot), and every following stop moves up by one.
    pub fn plan_insertion(&self, position: InsertPosition) -> Result<InsertionPlan, EngineError> {
        let (order_index, followers) = match position {
            InsertPosition::StartOfTrip => {
                let index = self.first().map_or(0, |s| s.order_index);
                (index, self.stops())
            }
            InsertPosition::After(id) => {
                let pos = self.position(id)?;
                let prev = &self.stops()[pos];
                (bump(prev.order_index, prev.id)?, &self.stops()[pos + 1..])
            }
        };

        let shifted = followers
            .iter()
            .map(|s| Ok(OrderUpdate::new(s.id, bump(s.order_index, s.id)?)))
            .collect::<Result<Vec<_>, EngineError>>()?;

        Ok(InsertionPlan {
            order_index,
            shifted,
        })
    }

    /// Plan the renumbering after a stop is deleted.
    ///
    /// Every stop after the removed one moves down by one, closing the gap.
    pub fn plan_removal(&self, id: StopId) -> Result<Vec<OrderUpdate>, EngineError> {
        let pos = self.position(id)?;
        Ok(self.stops()[pos + 1..]
            .iter()
            .map(|s| OrderUpdate::new(s.id, s.order_index.saturating_sub(1)))
            .collect())
    }

    /// Plan a reorder to the sequence `new_order`.
    ///
    /// Stops are renumbered `0..n` in the new order. With
    /// [`RedatePolicy::Rechain`] their dates are also re-chained.
    ///
    /// # Errors
    ///
    /// `InvalidInput` unless `new_order` names every stop exactly once.
    pub fn plan_reorder(
        &self,
        new_order: &[StopId],
        policy: RedatePolicy,
    ) -> Result<ReorderPlan, EngineError> {
        if new_order.len() != self.len() {
            return Err(EngineError::InvalidInput(format!(
                "new order lists {} stops, trip has {}",
                new_order.len(),
                self.len()
            )));
        }

        let mut seen = HashSet::with_capacity(new_order.len());
        let mut sequence = Vec::with_capacity(new_order.len());
        for &id in new_order {
            if !seen.insert(id) {
                return Err(EngineError::InvalidInput(format!(
                    "stop {id} listed more than once"
                )));
            }
            let stop = self
                .get(id)
                .ok_or_else(|| EngineError::InvalidInput(format!("stop {id} is not in this trip")))?;
            sequence.push(stop);
        }

        let order = sequence
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let index = u32::try_from(i)
                    .map_err(|_| EngineError::InvalidInput("too many stops".to_string()))?;
                Ok(OrderUpdate::new(s.id, index))
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        let dates = match (policy, self.first()) {
            (RedatePolicy::Rechain, Some(first)) => rechain(&sequence, first.start_date())?,
            _ => Vec::new(),
        };

        debug!(
            stops = order.len(),
            redated = dates.len(),
            "planned reorder"
        );

        Ok(ReorderPlan { order, dates })
    }

    /// A new snapshot with a reorder plan's dates and positions applied.
    pub fn apply_reorder(&self, plan: &ReorderPlan) -> Result<Self, EngineError> {
        self.apply_updates(&plan.dates)?
            .apply_order_updates(&plan.order)
    }
}

/// Lay stops end to end from `start`, returning the ones whose dates change.
fn rechain(sequence: &[&Stop], start: NaiveDate) -> Result<Vec<StopUpdate>, EngineError> {
    let mut cursor = start;
    let mut updates = Vec::new();
    for stop in sequence {
        let nights = u32::try_from(stop.nights())
            .map_err(|_| EngineError::InvalidInput(format!("stop {} is too long", stop.id)))?;
        let dates = DateRange::from_nights(cursor, nights)?;
        if dates != stop.dates {
            updates.push(StopUpdate::new(stop.id, dates));
        }
        cursor = dates.end();
    }
    Ok(updates)
}
