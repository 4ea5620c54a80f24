//! Weather facade
//!
//! Coordinates the current-conditions, forecast and map fetchers behind one
//! entry point and caches the most recent results. All calls block the caller
//! for the duration of their requests; use one facade per thread or serialize
//! access externally.

use crate::api::ApiClient;
use crate::config::WeatherGuardConfig;
use crate::models::{
    Coordinates, CurrentConditions, ForecastResult, MapImage, WeatherBundle, WeatherLayer,
};
use crate::weather::{CurrentConditionsFetcher, ForecastFetcher, MapCompositor};
use crate::{Result, WeatherGuardError};
use tracing::{error, info, warn};

/// Source of the three independent pieces of weather data
pub trait WeatherProvider {
    /// Current conditions for a named location; `Ok(None)` when unavailable
    fn current_conditions(&self, location: &str) -> Result<Option<CurrentConditions>>;
    /// Day-by-day forecast for coordinates; `None` when unavailable
    fn forecast(&self, coordinates: Coordinates) -> Option<ForecastResult>;
    /// Composited weather map for coordinates; `None` when unavailable
    fn map(&self, coordinates: Coordinates) -> Option<MapImage>;
}

impl<P: WeatherProvider + ?Sized> WeatherProvider for &P {
    fn current_conditions(&self, location: &str) -> Result<Option<CurrentConditions>> {
        (**self).current_conditions(location)
    }

    fn forecast(&self, coordinates: Coordinates) -> Option<ForecastResult> {
        (**self).forecast(coordinates)
    }

    fn map(&self, coordinates: Coordinates) -> Option<MapImage> {
        (**self).map(coordinates)
    }
}

/// Provider backed by the `OpenWeatherMap` and OpenStreetMap HTTP APIs
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    current: CurrentConditionsFetcher,
    forecast: ForecastFetcher,
    map: MapCompositor,
    layers: Vec<WeatherLayer>,
    zoom: u8,
}

impl OpenWeatherProvider {
    /// Build the fetchers around one shared HTTP client
    pub fn new(config: &WeatherGuardConfig) -> Result<Self> {
        let client = ApiClient::new(&config.weather)?;
        Ok(Self {
            current: CurrentConditionsFetcher::new(client.clone(), config.weather.clone()),
            forecast: ForecastFetcher::new(client.clone(), config.weather.clone()),
            map: MapCompositor::new(client, config.weather.clone()),
            layers: config.map.layers.clone(),
            zoom: config.map.zoom,
        })
    }
}

impl WeatherProvider for OpenWeatherProvider {
    fn current_conditions(&self, location: &str) -> Result<Option<CurrentConditions>> {
        self.current.fetch_by_city_name(location)
    }

    fn forecast(&self, coordinates: Coordinates) -> Option<ForecastResult> {
        self.forecast
            .fetch_by_coordinates(coordinates.latitude(), coordinates.longitude())
    }

    fn map(&self, coordinates: Coordinates) -> Option<MapImage> {
        self.map
            .fetch_composite(
                coordinates.latitude(),
                coordinates.longitude(),
                &self.layers,
                self.zoom,
            )
            .unwrap_or_else(|e| {
                error!("Weather map request rejected: {}", e);
                None
            })
    }
}

/// Single entry point for current conditions, forecast and map of one location
#[derive(Debug)]
pub struct WeatherFacade<P: WeatherProvider = OpenWeatherProvider> {
    provider: P,
    api_key: String,
    location: String,
    use_fahrenheit: bool,
    current: Option<CurrentConditions>,
    forecast: Option<ForecastResult>,
    map: Option<MapImage>,
}

impl WeatherFacade<OpenWeatherProvider> {
    /// Create a facade for `location` using the HTTP provider and refresh it.
    ///
    /// `api_key` overrides any credential in `config`.
    pub fn new(api_key: &str, location: &str, config: &WeatherGuardConfig) -> Result<Self> {
        validate_arguments(api_key, location)?;

        let mut config = config.clone();
        config.weather.api_key = Some(api_key.trim().to_string());
        let provider = OpenWeatherProvider::new(&config)?;

        let mut facade = Self::with_provider(provider, api_key, location)?;
        facade.use_fahrenheit = config.defaults.use_fahrenheit;
        Ok(facade)
    }
}

impl<P: WeatherProvider> WeatherFacade<P> {
    /// Create a facade over any provider and perform the initial refresh
    pub fn with_provider(provider: P, api_key: &str, location: &str) -> Result<Self> {
        validate_arguments(api_key, location)?;

        let mut facade = Self {
            provider,
            api_key: api_key.trim().to_string(),
            location: location.trim().to_string(),
            use_fahrenheit: true,
            current: None,
            forecast: None,
            map: None,
        };
        facade.refresh()?;
        Ok(facade)
    }

    /// Re-fetch everything for the configured location.
    ///
    /// Forecast and map are only re-fetched when current conditions succeed;
    /// otherwise their previously cached values are kept.
    pub fn refresh(&mut self) -> Result<()> {
        self.current = self.provider.current_conditions(&self.location)?;

        match &self.current {
            Some(current) => {
                let coordinates = current.coordinates;
                self.forecast = self.provider.forecast(coordinates);
                self.map = self.provider.map(coordinates);
                info!(
                    "Refreshed weather for '{}' (forecast: {}, map: {})",
                    self.location,
                    self.forecast.is_some(),
                    self.map.is_some()
                );
            }
            None => {
                error!(
                    "Failed to refresh weather data for '{}'; keeping cached forecast and map",
                    self.location
                );
            }
        }
        Ok(())
    }

    /// Switch to another location and refresh
    pub fn set_location(&mut self, location: &str) -> Result<()> {
        let location = location.trim();
        if location.is_empty() {
            return Err(WeatherGuardError::validation("City cannot be null or empty"));
        }
        self.location = location.to_string();
        self.refresh()
    }

    /// Current conditions, re-fetched once if the cache is empty
    pub fn current_conditions(&mut self) -> Option<&CurrentConditions> {
        self.repair_current();
        self.current.as_ref()
    }

    /// Forecast, re-fetched once if the cache is empty
    pub fn forecast(&mut self) -> Option<&ForecastResult> {
        if self.forecast.is_none() {
            warn!("Forecast data is empty, attempting to refresh");
            if let Some(coordinates) = self.repaired_coordinates() {
                self.forecast = self.provider.forecast(coordinates);
            }
        }
        self.forecast.as_ref()
    }

    /// Weather map, re-fetched once if the cache is empty
    pub fn map_image(&mut self) -> Option<&MapImage> {
        if self.map.is_none() {
            warn!("Weather map is empty, attempting to refresh");
            if let Some(coordinates) = self.repaired_coordinates() {
                self.map = self.provider.map(coordinates);
            }
        }
        self.map.as_ref()
    }

    /// All three pieces, each repaired on demand
    pub fn all_weather_info(&mut self) -> WeatherBundle {
        WeatherBundle {
            current: self.current_conditions().cloned(),
            forecast: self.forecast().cloned(),
            map: self.map_image().cloned(),
        }
    }

    /// Whether every cached piece is present, without fetching
    #[must_use]
    pub fn has_valid_data(&self) -> bool {
        self.current.is_some() && self.forecast.is_some() && self.map.is_some()
    }

    pub fn set_temperature_unit(&mut self, use_fahrenheit: bool) {
        self.use_fahrenheit = use_fahrenheit;
    }

    #[must_use]
    pub fn is_using_fahrenheit(&self) -> bool {
        self.use_fahrenheit
    }

    /// Render whichever of the two temperatures matches the unit preference
    #[must_use]
    pub fn formatted_temperature(&self, temp_f: i32, temp_c: i32) -> String {
        if self.use_fahrenheit {
            format!("{temp_f}°F")
        } else {
            format!("{temp_c}°C")
        }
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn repair_current(&mut self) {
        if self.current.is_some() {
            return;
        }
        warn!("Current conditions are empty, attempting to refresh");
        match self.provider.current_conditions(&self.location) {
            Ok(current) => self.current = current,
            Err(e) => error!("Current conditions request rejected: {}", e),
        }
    }

    fn repaired_coordinates(&mut self) -> Option<Coordinates> {
        self.repair_current();
        self.current.as_ref().map(|current| current.coordinates)
    }
}

fn validate_arguments(api_key: &str, location: &str) -> Result<()> {
    if api_key.trim().is_empty() {
        return Err(WeatherGuardError::validation("API key cannot be null or empty"));
    }
    if location.trim().is_empty() {
        return Err(WeatherGuardError::validation("City cannot be null or empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DaySummary;
    use crate::models::weather::tests::sample_conditions;
    use image::RgbaImage;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays queued answers and records every call
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        current: RefCell<VecDeque<Option<CurrentConditions>>>,
        forecasts: RefCell<VecDeque<Option<ForecastResult>>>,
        maps: RefCell<VecDeque<Option<MapImage>>>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedProvider {
        fn queue_current(&self, value: Option<CurrentConditions>) -> &Self {
            self.current.borrow_mut().push_back(value);
            self
        }

        fn queue_forecast(&self, value: Option<ForecastResult>) -> &Self {
            self.forecasts.borrow_mut().push_back(value);
            self
        }

        fn queue_map(&self, value: Option<MapImage>) -> &Self {
            self.maps.borrow_mut().push_back(value);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl WeatherProvider for ScriptedProvider {
        fn current_conditions(&self, location: &str) -> Result<Option<CurrentConditions>> {
            self.calls.borrow_mut().push(format!("current:{location}"));
            Ok(self.current.borrow_mut().pop_front().flatten())
        }

        fn forecast(&self, _coordinates: Coordinates) -> Option<ForecastResult> {
            self.calls.borrow_mut().push("forecast".to_string());
            self.forecasts.borrow_mut().pop_front().flatten()
        }

        fn map(&self, _coordinates: Coordinates) -> Option<MapImage> {
            self.calls.borrow_mut().push("map".to_string());
            self.maps.borrow_mut().pop_front().flatten()
        }
    }

    fn forecast(high: i32) -> ForecastResult {
        ForecastResult::new(
            Coordinates::new(45.52, -122.68).unwrap(),
            -28_800,
            vec![DaySummary {
                date_epoch: 1_704_110_400,
                high_temp_f: high,
                low_temp_f: high - 10,
                description: "Rain".to_string(),
                icon_code: "10d".to_string(),
            }],
        )
    }

    fn map() -> MapImage {
        MapImage {
            coordinates: Coordinates::new(45.52, -122.68).unwrap(),
            zoom: 5,
            tile: (5, 11),
            layers_applied: WeatherLayer::default_stack(),
            raster: RgbaImage::new(2, 2),
        }
    }

    fn fully_scripted() -> ScriptedProvider {
        let provider = ScriptedProvider::default();
        provider
            .queue_current(Some(sample_conditions()))
            .queue_forecast(Some(forecast(70)))
            .queue_map(Some(map()));
        provider
    }

    #[test]
    fn test_empty_location_rejected_before_any_fetch() {
        let provider = ScriptedProvider::default();
        let err = WeatherFacade::with_provider(&provider, "key", "").unwrap_err();
        assert!(err.is_caller_error());
        assert_eq!(
            err.to_string(),
            "Invalid input: City cannot be null or empty"
        );
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn test_empty_api_key_rejected_before_any_fetch() {
        let provider = ScriptedProvider::default();
        let err = WeatherFacade::with_provider(&provider, "  ", "Portland").unwrap_err();
        assert!(err.to_string().contains("API key cannot be null or empty"));
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn test_http_facade_rejects_empty_location_without_network() {
        let err = WeatherFacade::new("key", "", &WeatherGuardConfig::default()).unwrap_err();
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_construction_refreshes_everything() {
        let provider = fully_scripted();
        let facade = WeatherFacade::with_provider(&provider, "key", "Portland,US").unwrap();

        assert!(facade.has_valid_data());
        assert_eq!(
            provider.calls(),
            vec!["current:Portland,US", "forecast", "map"]
        );
        assert_eq!(facade.location(), "Portland,US");
        assert_eq!(facade.api_key(), "key");
    }

    #[test]
    fn test_failed_refresh_keeps_cached_forecast_and_map() {
        let provider = fully_scripted();
        let mut facade = WeatherFacade::with_provider(&provider, "key", "Portland").unwrap();

        provider.queue_current(None);
        facade.refresh().unwrap();

        assert_eq!(facade.forecast.as_ref(), Some(&forecast(70)));
        assert_eq!(facade.map.as_ref(), Some(&map()));
        assert!(facade.current.is_none());
        // forecast and map were not requested again
        assert_eq!(
            provider.calls(),
            vec!["current:Portland", "forecast", "map", "current:Portland"]
        );
    }

    #[test]
    fn test_successful_refresh_replaces_cache() {
        let provider = fully_scripted();
        let mut facade = WeatherFacade::with_provider(&provider, "key", "Portland").unwrap();

        provider
            .queue_current(Some(sample_conditions()))
            .queue_forecast(Some(forecast(80)))
            .queue_map(None);
        facade.refresh().unwrap();

        assert_eq!(facade.forecast.as_ref(), Some(&forecast(80)));
        assert!(facade.map.is_none());
    }

    #[test]
    fn test_initial_failure_leaves_everything_empty() {
        let provider = ScriptedProvider::default();
        let facade = WeatherFacade::with_provider(&provider, "key", "Atlantis").unwrap();

        assert!(!facade.has_valid_data());
        assert_eq!(provider.calls(), vec!["current:Atlantis"]);
    }

    #[test]
    fn test_getters_repair_empty_pieces_once() {
        let provider = ScriptedProvider::default();
        let mut facade = WeatherFacade::with_provider(&provider, "key", "Portland").unwrap();

        provider
            .queue_current(Some(sample_conditions()))
            .queue_forecast(Some(forecast(70)));

        assert_eq!(facade.forecast(), Some(&forecast(70)));
        assert_eq!(
            provider.calls(),
            vec!["current:Portland", "current:Portland", "forecast"]
        );

        // cached now: no further requests
        assert!(facade.current_conditions().is_some());
        assert!(facade.forecast().is_some());
        assert_eq!(provider.calls().len(), 3);
    }

    #[test]
    fn test_map_repair_uses_cached_current() {
        let provider = ScriptedProvider::default();
        provider
            .queue_current(Some(sample_conditions()))
            .queue_forecast(Some(forecast(70)))
            .queue_map(None);
        let mut facade = WeatherFacade::with_provider(&provider, "key", "Portland").unwrap();

        provider.queue_map(Some(map()));
        assert!(facade.map_image().is_some());
        assert_eq!(
            provider.calls(),
            vec!["current:Portland", "forecast", "map", "map"]
        );
    }

    #[test]
    fn test_all_weather_info_bundles_cached_values() {
        let provider = fully_scripted();
        let mut facade = WeatherFacade::with_provider(&provider, "key", "Portland").unwrap();

        let bundle = facade.all_weather_info();
        assert!(bundle.is_complete());
        assert_eq!(bundle.forecast, Some(forecast(70)));
        assert_eq!(provider.calls().len(), 3);
    }

    #[test]
    fn test_set_location_validates_and_refreshes() {
        let provider = fully_scripted();
        let mut facade = WeatherFacade::with_provider(&provider, "key", "Portland").unwrap();

        assert!(facade.set_location("").unwrap_err().is_caller_error());
        assert_eq!(facade.location(), "Portland");

        facade.set_location("Seattle,US").unwrap();
        assert_eq!(facade.location(), "Seattle,US");
        assert_eq!(
            provider.calls().last().map(String::as_str),
            Some("current:Seattle,US")
        );
    }

    #[test]
    fn test_formatted_temperature_follows_preference() {
        let provider = fully_scripted();
        let mut facade = WeatherFacade::with_provider(&provider, "key", "Portland").unwrap();
        let calls_before = provider.calls().len();

        assert!(facade.is_using_fahrenheit());
        assert_eq!(facade.formatted_temperature(72, 22), "72°F");

        facade.set_temperature_unit(false);
        assert!(!facade.is_using_fahrenheit());
        assert_eq!(facade.formatted_temperature(72, 22), "22°C");

        assert_eq!(provider.calls().len(), calls_before);
    }
}
