//! Current conditions model and display methods

use super::Coordinates;
use crate::units::{self, CLOCK_PATTERN, OBSERVED_PATTERN};
use crate::{Result, WeatherGuardError};
use serde::Serialize;
use std::ops::Deref;

/// Plausible range for a surface temperature in Fahrenheit
const TEMPERATURE_RANGE_F: std::ops::RangeInclusive<i32> = -100..=150;

/// Raw reading of present weather, not yet range-checked.
///
/// Turned into [`CurrentConditions`] by [`CurrentConditions::new`].
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ConditionsReading {
    /// Location name as reported by the provider
    pub location_name: String,
    /// Country code (ISO 3166-1 alpha-2)
    pub country_code: String,
    pub coordinates: Coordinates,
    /// Current temperature in Fahrenheit
    pub temperature_f: i32,
    pub max_temp_f: i32,
    pub min_temp_f: i32,
    /// Relative humidity percentage (0-100)
    pub humidity_pct: u8,
    /// Visibility in whole kilometers
    pub visibility_km: u32,
    /// Wind speed as reported upstream
    pub wind_speed: f64,
    /// Human-readable description of weather conditions
    pub description: String,
    /// Weather condition icon ID from API
    pub icon_code: String,
    pub sunrise_epoch: i64,
    pub sunset_epoch: i64,
    /// Offset of the location from UTC in seconds
    pub utc_offset_seconds: i32,
    /// When the provider observed these conditions
    pub observed_at_epoch: i64,
}

/// Snapshot of present weather for one named location.
///
/// Only obtainable through [`CurrentConditions::new`], so every value has
/// passed the range checks. Fields are read through `Deref`.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct CurrentConditions {
    reading: ConditionsReading,
}

impl Deref for CurrentConditions {
    type Target = ConditionsReading;

    fn deref(&self) -> &ConditionsReading {
        &self.reading
    }
}

impl CurrentConditions {
    /// Check the value invariants of a reading.
    ///
    /// Temperatures must lie in -100..=150 °F, humidity in 0..=100 and every
    /// text field must be non-empty.
    pub fn new(reading: ConditionsReading) -> Result<Self> {
        for (label, value) in [
            ("Current temperature", reading.temperature_f),
            ("Max temperature", reading.max_temp_f),
            ("Min temperature", reading.min_temp_f),
        ] {
            if !TEMPERATURE_RANGE_F.contains(&value) {
                return Err(WeatherGuardError::malformed(format!(
                    "{label} out of range: {value}"
                )));
            }
        }

        if reading.humidity_pct > 100 {
            return Err(WeatherGuardError::malformed(format!(
                "Humidity out of range: {}",
                reading.humidity_pct
            )));
        }

        for (label, value) in [
            ("Location name", &reading.location_name),
            ("Country", &reading.country_code),
            ("Description", &reading.description),
            ("Icon", &reading.icon_code),
        ] {
            if value.is_empty() {
                return Err(WeatherGuardError::malformed(format!(
                    "{label} must not be empty"
                )));
            }
        }

        Ok(Self { reading })
    }

    /// Give the reading back, e.g. to adjust and re-check it
    #[must_use]
    pub fn into_reading(self) -> ConditionsReading {
        self.reading
    }

    /// Current temperature in Celsius
    #[must_use]
    pub fn temperature_c(&self) -> i32 {
        units::fahrenheit_to_celsius(f64::from(self.temperature_f))
    }

    /// Sunrise as local wall-clock time, e.g. `6:42 AM`
    #[must_use]
    pub fn sunrise_display(&self) -> String {
        units::format_local_time(self.sunrise_epoch, self.utc_offset_seconds, CLOCK_PATTERN)
    }

    /// Sunset as local wall-clock time, e.g. `7:58 PM`
    #[must_use]
    pub fn sunset_display(&self) -> String {
        units::format_local_time(self.sunset_epoch, self.utc_offset_seconds, CLOCK_PATTERN)
    }

    /// Observation date and time at the location
    #[must_use]
    pub fn observed_display(&self) -> String {
        units::format_local_time(
            self.observed_at_epoch,
            self.utc_offset_seconds,
            OBSERVED_PATTERN,
        )
    }
}

/// URL of the provider's icon image for a condition code
#[must_use]
pub fn icon_url(base_url: &str, icon_code: &str) -> String {
    format!("{}/{icon_code}@2x.png", base_url.trim_end_matches('/'))
}
