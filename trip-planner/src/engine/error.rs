//! Engine error types.

use std::fmt;

use chrono::NaiveDate;

use crate::domain::{DateError, StopId};

/// What a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// No stop has this id.
    Stop(StopId),
    /// The stop exists but is the last one, so has no successor.
    NextStop(StopId),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Stop(id) => write!(f, "stop {id}"),
            Missing::NextStop(id) => write!(f, "stop after {id}"),
        }
    }
}

/// Errors reported by engine operations.
///
/// Every error is returned to the caller; the engine never mutates its input
/// so a failed operation leaves nothing to roll back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Malformed or out-of-contract input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced stop is absent from the snapshot
    #[error("not found: {0}")]
    NotFound(Missing),

    /// Moving the next stop's start would leave it no nights
    #[error("cannot start stop {stop} on {start}: it ends on {end}")]
    InvalidAdjustment {
        stop: StopId,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl From<DateError> for EngineError {
    fn from(err: DateError) -> Self {
        EngineError::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EngineError::InvalidInput("nights must be positive".into());
        assert_eq!(err.to_string(), "invalid input: nights must be positive");

        let err = EngineError::NotFound(Missing::Stop(StopId(3)));
        assert_eq!(err.to_string(), "not found: stop 3");

        let err = EngineError::NotFound(Missing::NextStop(StopId(3)));
        assert_eq!(err.to_string(), "not found: stop after 3");

        let err = EngineError::InvalidAdjustment {
            stop: StopId(4),
            start: NaiveDate::from_ymd_opt(2024, 6, 16).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 6, 16).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "cannot start stop 4 on 2024-06-16: it ends on 2024-06-16"
        );
    }

    #[test]
    fn date_errors_are_invalid_input() {
        let date_err = crate::domain::parse_calendar_date("nope").unwrap_err();
        let err = EngineError::from(date_err);
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
