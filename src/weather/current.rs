//! Current conditions for a named location

use super::absorb_upstream;
use super::openweather::CurrentResponse;
use crate::api::ApiClient;
use crate::config::WeatherConfig;
use crate::models::CurrentConditions;
use crate::{Result, WeatherGuardError};
use tracing::{debug, info, instrument};

/// Fetches and normalizes the provider's current-weather endpoint
#[derive(Debug, Clone)]
pub struct CurrentConditionsFetcher {
    client: ApiClient,
    config: WeatherConfig,
}

impl CurrentConditionsFetcher {
    #[must_use]
    pub fn new(client: ApiClient, config: WeatherConfig) -> Self {
        Self { client, config }
    }

    /// Fetch current conditions for `name`, e.g. `"Portland,US"`.
    ///
    /// Returns `Ok(None)` when the credential is missing, the provider is
    /// unreachable or answers with something unexpected. Only an empty name
    /// is reported as an error.
    #[instrument(skip(self))]
    pub fn fetch_by_city_name(&self, name: &str) -> Result<Option<CurrentConditions>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WeatherGuardError::validation("City cannot be null or empty"));
        }

        absorb_upstream("current conditions", self.try_fetch(name))
    }

    fn try_fetch(&self, name: &str) -> Result<CurrentConditions> {
        let api_key = self.config.api_key().ok_or_else(|| {
            WeatherGuardError::configuration_missing("API key is missing or empty in config")
        })?;

        let url = format!(
            "{}/weather?q={}&APPID={}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(name),
            api_key
        );
        debug!("Requesting current conditions for '{}'", name);

        let response: CurrentResponse = self.client.get_json(&url)?;
        let conditions = CurrentConditions::try_from(response)?;

        info!(
            "Current conditions for {}, {}: {}°F, {}",
            conditions.location_name,
            conditions.country_code,
            conditions.temperature_f,
            conditions.description
        );
        Ok(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(api_key: Option<&str>) -> CurrentConditionsFetcher {
        let config = WeatherConfig {
            api_key: api_key.map(str::to_string),
            // nothing listens here; any request would fail, not hang
            base_url: "http://127.0.0.1:9".to_string(),
            ..WeatherConfig::default()
        };
        CurrentConditionsFetcher::new(ApiClient::new(&config).unwrap(), config)
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = fetcher(Some("key")).fetch_by_city_name("  ").unwrap_err();
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_missing_credential_yields_none() {
        assert_eq!(fetcher(None).fetch_by_city_name("Portland").unwrap(), None);
        assert_eq!(
            fetcher(Some("")).fetch_by_city_name("Portland").unwrap(),
            None
        );
    }

    #[test]
    fn test_unreachable_provider_yields_none() {
        assert_eq!(
            fetcher(Some("key")).fetch_by_city_name("Portland").unwrap(),
            None
        );
    }
}
