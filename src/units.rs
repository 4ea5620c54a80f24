//! Unit conversions and local-time formatting
//!
//! Upstream temperatures arrive in Kelvin and timestamps as Unix epochs paired
//! with the location's UTC offset in seconds.

use chrono::DateTime;

/// `3:07 PM`
pub const CLOCK_PATTERN: &str = "%-I:%M %p";
/// `October 18,\n09:30 AM`
pub const OBSERVED_PATTERN: &str = "%B %d,\n%I:%M %p";
/// `Oct, 18`
pub const DAY_PATTERN: &str = "%b, %d";

/// Half-up rounding, so -0.5 rounds to 0 rather than -1.
#[must_use]
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Convert Kelvin to whole degrees Fahrenheit
#[must_use]
pub fn kelvin_to_fahrenheit(kelvin: f64) -> i32 {
    round_half_up((kelvin - 273.15) * 1.8 + 32.0)
}

/// Convert Kelvin to whole degrees Celsius
#[must_use]
pub fn kelvin_to_celsius(kelvin: f64) -> i32 {
    round_half_up(kelvin - 273.15)
}

/// Convert Fahrenheit to whole degrees Celsius
#[must_use]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> i32 {
    round_half_up((fahrenheit - 32.0) * 5.0 / 9.0)
}

/// Format an epoch as wall-clock time at a location `utc_offset_seconds` from UTC.
///
/// The offset is added to the instant and the result is rendered in UTC, so the
/// host's own timezone never leaks into the output.
#[must_use]
pub fn format_local_time(epoch_seconds: i64, utc_offset_seconds: i32, pattern: &str) -> String {
    let shifted = epoch_seconds.saturating_add(i64::from(utc_offset_seconds));
    match DateTime::from_timestamp(shifted, 0) {
        Some(instant) => instant.format(pattern).to_string(),
        None => String::new(),
    }
}
