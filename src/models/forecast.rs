//! Day-by-day forecast model

use super::Coordinates;
use crate::units::{self, DAY_PATTERN};
use serde::Serialize;

/// One calendar day reduced from consecutive 3-hour samples
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DaySummary {
    /// Epoch of the last sample folded into this day
    pub date_epoch: i64,
    pub high_temp_f: i32,
    pub low_temp_f: i32,
    /// Condition of the last sample in the day
    pub description: String,
    pub icon_code: String,
}

/// Forecast for one location, ordered by day
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ForecastResult {
    pub coordinates: Coordinates,
    /// Offset of the location from UTC in seconds, shared by every day
    pub utc_offset_seconds: i32,
    pub days: Vec<DaySummary>,
}

impl ForecastResult {
    #[must_use]
    pub fn new(coordinates: Coordinates, utc_offset_seconds: i32, days: Vec<DaySummary>) -> Self {
        Self {
            coordinates,
            utc_offset_seconds,
            days,
        }
    }

    /// Short local date label for a day, e.g. `Oct, 18`
    #[must_use]
    pub fn day_label(&self, day: &DaySummary) -> String {
        units::format_local_time(day.date_epoch, self.utc_offset_seconds, DAY_PATTERN)
    }

    /// Mean of the daily highs, if there are any days
    #[must_use]
    pub fn average_high(&self) -> Option<f64> {
        self.average(|day| day.high_temp_f)
    }

    /// Mean of the daily lows, if there are any days
    #[must_use]
    pub fn average_low(&self) -> Option<f64> {
        self.average(|day| day.low_temp_f)
    }

    fn average(&self, pick: impl Fn(&DaySummary) -> i32) -> Option<f64> {
        if self.days.is_empty() {
            return None;
        }
        let sum: f64 = self.days.iter().map(|day| f64::from(pick(day))).sum();
        Some(sum / self.days.len() as f64)
    }
}
