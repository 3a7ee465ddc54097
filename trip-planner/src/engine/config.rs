//! Engine configuration.

use chrono::Weekday;

/// Configuration parameters for the date engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Nights proposed for a new stop when the caller gives none.
    pub default_nights: u32,

    /// First column of each calendar week.
    pub week_start: Weekday,

    /// Upper bound on months rendered by the calendar grid when the caller
    /// does not ask for a specific span.
    pub max_calendar_months: u32,
}

impl EngineConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(default_nights: u32, week_start: Weekday, max_calendar_months: u32) -> Self {
        Self {
            default_nights,
            week_start,
            max_calendar_months,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_nights: 1,
            week_start: Weekday::Mon,
            max_calendar_months: 24,
        }
    }
}
