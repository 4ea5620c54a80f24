//! `OpenWeatherMap` response structures and conversion into internal models

use crate::models::{ConditionsReading, Coordinates, CurrentConditions, DaySummary};
use crate::units::kelvin_to_fahrenheit;
use crate::{Result, WeatherGuardError};
use serde::Deserialize;

/// Entry of the `weather[]` array
#[derive(Debug, Deserialize)]
pub struct Condition {
    /// Condition group, e.g. "Rain"
    pub main: String,
    /// Detailed text, e.g. "light rain"
    pub description: String,
    pub icon: String,
}

/// Current weather response (`/weather`)
#[derive(Debug, Deserialize)]
pub struct CurrentResponse {
    pub name: String,
    pub weather: Vec<Condition>,
    pub main: CurrentMain,
    pub wind: Wind,
    pub sys: Sys,
    pub coord: Coord,
    /// Shift from UTC in seconds
    pub timezone: i32,
    pub dt: i64,
    /// Visibility in meters
    pub visibility: f64,
}

/// Temperatures in Kelvin plus humidity
#[derive(Debug, Deserialize)]
pub struct CurrentMain {
    pub temp: f64,
    pub temp_max: f64,
    pub temp_min: f64,
    pub humidity: i64,
}

#[derive(Debug, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub struct Sys {
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

/// 5 day / 3 hour forecast response (`/forecast`)
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastSample>,
    pub city: City,
}

#[derive(Debug, Deserialize)]
pub struct City {
    pub timezone: i32,
}

/// One 3-hour step of the forecast series
#[derive(Debug, Deserialize)]
pub struct ForecastSample {
    pub dt: i64,
    pub main: SampleMain,
    pub weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
pub struct SampleMain {
    pub temp_max: f64,
    pub temp_min: f64,
}

impl TryFrom<CurrentResponse> for CurrentConditions {
    type Error = WeatherGuardError;

    fn try_from(response: CurrentResponse) -> Result<Self> {
        let condition = response
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherGuardError::malformed("weather[] is empty"))?;

        let coordinates = Coordinates::new(response.coord.lat, response.coord.lon)
            .map_err(|e| WeatherGuardError::malformed(e.to_string()))?;

        let humidity_pct = u8::try_from(response.main.humidity)
            .ok()
            .filter(|h| *h <= 100)
            .ok_or_else(|| {
                WeatherGuardError::malformed(format!(
                    "Humidity out of range: {}",
                    response.main.humidity
                ))
            })?;

        if response.visibility.is_nan() || response.visibility < 0.0 {
            return Err(WeatherGuardError::malformed(format!(
                "Visibility must be non-negative: {}",
                response.visibility
            )));
        }
        // whole kilometers, truncated
        let visibility_km = (response.visibility / 1000.0) as u32;

        CurrentConditions::new(ConditionsReading {
            location_name: response.name,
            country_code: response.sys.country,
            coordinates,
            temperature_f: kelvin_to_fahrenheit(response.main.temp),
            max_temp_f: kelvin_to_fahrenheit(response.main.temp_max),
            min_temp_f: kelvin_to_fahrenheit(response.main.temp_min),
            humidity_pct,
            visibility_km,
            wind_speed: response.wind.speed,
            description: condition.description,
            icon_code: condition.icon,
            sunrise_epoch: response.sys.sunrise,
            sunset_epoch: response.sys.sunset,
            utc_offset_seconds: response.timezone,
            observed_at_epoch: response.dt,
        })
    }
}

/// Reduce consecutive groups of `per_day` samples into one summary per day.
///
/// The high is the maximum of the per-sample maxima and the low the minimum of
/// the per-sample minima. Description, icon and date come from the last sample
/// in the group. A trailing short group still yields a day. Any sample without a
/// condition entry fails the whole reduction.
pub fn reduce_samples(samples: &[ForecastSample], per_day: usize) -> Result<Vec<DaySummary>> {
    samples
        .chunks(per_day.max(1))
        .enumerate()
        .map(|(day_index, group)| reduce_day(day_index, group))
        .collect()
}

fn reduce_day(day_index: usize, group: &[ForecastSample]) -> Result<DaySummary> {
    let mut high_temp_f = i32::MIN;
    let mut low_temp_f = i32::MAX;
    let mut last: Option<(&ForecastSample, &Condition)> = None;

    for sample in group {
        let condition = sample.weather.first().ok_or_else(|| {
            WeatherGuardError::malformed(format!(
                "Forecast sample at {} in day {} has no weather entry",
                sample.dt, day_index
            ))
        })?;

        high_temp_f = high_temp_f.max(kelvin_to_fahrenheit(sample.main.temp_max));
        low_temp_f = low_temp_f.min(kelvin_to_fahrenheit(sample.main.temp_min));
        last = Some((sample, condition));
    }

    let (sample, condition) = last.ok_or_else(|| {
        WeatherGuardError::malformed(format!("Forecast day {day_index} has no samples"))
    })?;

    Ok(DaySummary {
        date_epoch: sample.dt,
        high_temp_f,
        low_temp_f,
        description: condition.main.clone(),
        icon_code: condition.icon.clone(),
    })
}
