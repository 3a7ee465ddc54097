//! Detecting and resolving date collisions after a stop is extended.
//!
//! When a stop's departure moves later, the following stop now arrives
//! before it is left. Two resolutions are offered: shift every following
//! stop by the same number of days, or pull only the next stop's arrival
//! forward and leave the rest of the trip alone.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Clock;
use crate::domain::{DateRange, Stop, StopId, days_between, shift_date};

use super::error::{EngineError, Missing};
use super::itinerary::{Itinerary, StopUpdate};
use super::DateEngine;

/// How to settle a conflict with the following stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Push every following stop later by the same number of days.
    ShiftAll,
    /// Move only the next stop's arrival.
    AdjustNext,
}

/// Outcome of checking an edit against the following stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DurationCheck<'a> {
    /// The edit can be committed as is.
    NoConflict,
    /// The edited stop now departs `days_difference` days later than
    /// before, and `next_stop` follows it.
    Conflict {
        days_difference: i64,
        next_stop: &'a Stop,
    },
}

impl DurationCheck<'_> {
    pub fn is_conflict(&self) -> bool {
        matches!(self, DurationCheck::Conflict { .. })
    }
}

impl<C: Clock> DateEngine<C> {
    /// Check whether new dates for a stop collide with the following stop.
    ///
    /// There is no conflict when the edited stop is the last one, or when
    /// its departure did not move later. Otherwise the caller must pick a
    /// resolution ([`resolve_shift_all`](Self::resolve_shift_all) or
    /// [`resolve_adjust_next`](Self::resolve_adjust_next)) before
    /// committing the edit.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown stop, `InvalidInput` if the new start is
    /// after the new end.
    pub fn detect_duration_conflict<'a>(
        &self,
        itinerary: &'a Itinerary,
        edited: StopId,
        new_start: NaiveDate,
        new_end: NaiveDate,
    ) -> Result<DurationCheck<'a>, EngineError> {
        let pos = itinerary.position(edited)?;
        DateRange::new(new_start, new_end)?;

        let original = &itinerary.stops()[pos];
        let Some(next_stop) = itinerary.stops().get(pos + 1) else {
            return Ok(DurationCheck::NoConflict);
        };

        if new_end <= original.end_date() {
            return Ok(DurationCheck::NoConflict);
        }

        let days_difference = days_between(original.end_date(), new_end);
        debug!(
            stop = %edited,
            next = %next_stop.id,
            days_difference,
            "stay extension collides with next stop"
        );

        Ok(DurationCheck::Conflict {
            days_difference,
            next_stop,
        })
    }

    /// Apply the edited stop's new dates and push every following stop
    /// `days_difference` days later, keeping each one's night count.
    ///
    /// Updates are returned in sequence order, the edited stop first.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown stop, `InvalidInput` if `days_difference`
    /// is not positive or a shifted date would be out of range.
    pub fn resolve_shift_all(
        &self,
        itinerary: &Itinerary,
        edited: StopId,
        new_dates: DateRange,
        days_difference: i64,
    ) -> Result<Vec<StopUpdate>, EngineError> {
        let pos = itinerary.position(edited)?;
        if days_difference <= 0 {
            return Err(EngineError::InvalidInput(format!(
                "days difference must be positive, got {days_difference}"
            )));
        }

        let following = &itinerary.stops()[pos + 1..];
        let mut updates = Vec::with_capacity(following.len() + 1);
        updates.push(StopUpdate::new(edited, new_dates));
        for stop in following {
            updates.push(StopUpdate::new(stop.id, stop.dates.shifted(days_difference)?));
        }

        debug!(
            stop = %edited,
            days_difference,
            shifted = following.len(),
            "shifting following stops"
        );

        Ok(updates)
    }

    /// Move only the next stop's arrival to the day after the edited stop's
    /// new departure, keeping the next stop's own departure.
    ///
    /// Stops beyond the next one are never touched.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the stop is unknown or is the last stop
    /// - `InvalidAdjustment` if the next stop would arrive on or after its
    ///   own departure day; the caller should shift all stops instead
    pub fn resolve_adjust_next(
        &self,
        itinerary: &Itinerary,
        edited: StopId,
        new_dates: DateRange,
    ) -> Result<StopUpdate, EngineError> {
        let pos = itinerary.position(edited)?;
        let next = itinerary
            .stops()
            .get(pos + 1)
            .ok_or(EngineError::NotFound(Missing::NextStop(edited)))?;

        let next_start = shift_date(new_dates.end(), 1)?;
        if next_start >= next.end_date() {
            return Err(EngineError::InvalidAdjustment {
                stop: next.id,
                start: next_start,
                end: next.end_date(),
            });
        }

        Ok(StopUpdate::new(
            next.id,
            DateRange::new(next_start, next.end_date())?,
        ))
    }

    /// Every update needed to give a stop new dates.
    ///
    /// Without a conflict only the edited stop changes. Otherwise the edited
    /// stop comes first, followed by the updates of `resolution`.
    pub fn resolve_edit(
        &self,
        itinerary: &Itinerary,
        edited: StopId,
        new_dates: DateRange,
        resolution: Resolution,
    ) -> Result<Vec<StopUpdate>, EngineError> {
        let check =
            self.detect_duration_conflict(itinerary, edited, new_dates.start(), new_dates.end())?;

        match (check, resolution) {
            (DurationCheck::NoConflict, _) => Ok(vec![StopUpdate::new(edited, new_dates)]),
            (DurationCheck::Conflict { days_difference, .. }, Resolution::ShiftAll) => {
                self.resolve_shift_all(itinerary, edited, new_dates, days_difference)
            }
            (DurationCheck::Conflict { .. }, Resolution::AdjustNext) => Ok(vec![
                StopUpdate::new(edited, new_dates),
                self.resolve_adjust_next(itinerary, edited, new_dates)?,
            ]),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::super::EngineConfig;
    use super::super::itinerary::test_support::*;
    use super::*;
    use crate::clock::FixedClock;
    use proptest::prelude::*;

    fn engine() -> DateEngine<FixedClock> {
        DateEngine::new(FixedClock(date(2024, 1, 1)), EngineConfig::default())
    }

    proptest! {
        /// Any change to the last stop is free of conflict
        #[test]
        fn last_stop_no_conflict(
            nights in prop::collection::vec(0u32..10, 1..6),
            start_delta in -30i64..30,
            len in 0u32..40,
        ) {
            let it = Itinerary::new(chain(date(2024, 5, 1), &nights)).unwrap();
            let last = it.last().unwrap();
            let new_start = shift_date(last.start_date(), start_delta).unwrap();
            let new_end = shift_date(new_start, i64::from(len)).unwrap();

            let check = engine()
                .detect_duration_conflict(&it, last.id, new_start, new_end)
                .unwrap();
            prop_assert_eq!(check, DurationCheck::NoConflict);
        }

        /// Shifting keeps every following stop's nights and moves it by the difference
        #[test]
        fn shift_all_preserves_nights(
            nights in prop::collection::vec(0u32..10, 2..8),
            pick in any::<prop::sample::Index>(),
            extra in 1i64..30,
        ) {
            let it = Itinerary::new(chain(date(2024, 5, 1), &nights)).unwrap();
            let edited = pick.get(it.stops());
            let new_dates = DateRange::new(
                edited.start_date(),
                shift_date(edited.end_date(), extra).unwrap(),
            ).unwrap();

            let updates = engine()
                .resolve_shift_all(&it, edited.id, new_dates, extra)
                .unwrap();
            let pos = it.position(edited.id).unwrap();
            prop_assert_eq!(updates.len(), it.len() - pos);

            for (update, original) in updates[1..].iter().zip(&it.stops()[pos + 1..]) {
                prop_assert_eq!(update.id, original.id);
                prop_assert_eq!(update.dates.nights(), original.nights());
                prop_assert_eq!(days_between(original.start_date(), update.dates.start()), extra);
            }

            // A chained trip stays chained after the cascade
            let applied = it.apply_updates(&updates).unwrap();
            prop_assert!(applied.check_consistency().is_empty());
        }

        /// Adjusting the next stop never yields an update for any other stop
        #[test]
        fn adjust_next_touches_only_next(
            nights in prop::collection::vec(0u32..10, 2..8),
            pick in any::<prop::sample::Index>(),
            extra in 0i64..10,
        ) {
            let it = Itinerary::new(chain(date(2024, 5, 1), &nights)).unwrap();
            let stops = &it.stops()[..it.len() - 1];
            let edited = pick.get(stops);
            let next_id = it.next_after(edited.id).unwrap().unwrap().id;
            let new_dates = DateRange::new(
                edited.start_date(),
                shift_date(edited.end_date(), extra).unwrap(),
            ).unwrap();

            match engine().resolve_adjust_next(&it, edited.id, new_dates) {
                Ok(update) => {
                    prop_assert_eq!(update.id, next_id);
                    prop_assert!(update.dates.nights() > 0);
                }
                Err(EngineError::InvalidAdjustment { stop, .. }) => {
                    prop_assert_eq!(stop, next_id);
                }
                Err(e) => prop_assert!(false, "unexpected error: {e}"),
            }
        }
    }
}
