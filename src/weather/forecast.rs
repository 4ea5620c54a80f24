//! Five-day forecast reduced to one summary per day

use super::openweather::{ForecastResponse, reduce_samples};
use crate::api::ApiClient;
use crate::config::WeatherConfig;
use crate::models::{Coordinates, ForecastResult};
use crate::{Result, WeatherGuardError};
use tracing::{error, info, instrument, warn};

/// 8 x 3h = 24h
pub const SAMPLES_PER_DAY: usize = 8;

/// Fetches the 3-hour forecast series for coordinates and reduces it per day
#[derive(Debug, Clone)]
pub struct ForecastFetcher {
    client: ApiClient,
    config: WeatherConfig,
}

impl ForecastFetcher {
    #[must_use]
    pub fn new(client: ApiClient, config: WeatherConfig) -> Self {
        Self { client, config }
    }

    /// Fetch the forecast for a latitude/longitude pair.
    ///
    /// Out-of-range coordinates return `None` without issuing a request, as do
    /// a missing credential, an upstream failure or a malformed body. A body
    /// with any malformed sample is rejected as a whole.
    #[instrument(skip(self))]
    pub fn fetch_by_coordinates(&self, latitude: f64, longitude: f64) -> Option<ForecastResult> {
        let coordinates = match Coordinates::new(latitude, longitude) {
            Ok(coordinates) => coordinates,
            Err(e) => {
                warn!("Skipping forecast request: {}", e);
                return None;
            }
        };

        match self.try_fetch(coordinates) {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                error!("Failed to fetch forecast: {}", e);
                None
            }
        }
    }

    fn try_fetch(&self, coordinates: Coordinates) -> Result<ForecastResult> {
        let api_key = self.config.api_key().ok_or_else(|| {
            WeatherGuardError::configuration_missing("API key is missing or empty in config")
        })?;

        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}",
            self.config.base_url.trim_end_matches('/'),
            coordinates.latitude(),
            coordinates.longitude(),
            api_key
        );

        let response: ForecastResponse = self.client.get_json(&url)?;
        let days = reduce_samples(&response.list, SAMPLES_PER_DAY)?;

        info!(
            "Reduced {} forecast samples to {} days for {}",
            response.list.len(),
            days.len(),
            coordinates.format_coordinates()
        );

        Ok(ForecastResult::new(coordinates, response.city.timezone, days))
    }
}
