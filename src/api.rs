//! HTTP client for the weather and tile providers
//!
//! Wraps a blocking `reqwest` client. Every call issues exactly one GET;
//! retrying is left to callers.

use crate::config::WeatherConfig;
use crate::{Result, WeatherGuardError};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Shared HTTP client for all upstream providers
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Create a new client with the configured user agent and timeout
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout_seconds.map(Duration::from_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WeatherGuardError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET `url` and decode the body as JSON
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.make_request(url)?;

        let parse_start = Instant::now();
        let body = response.text().map_err(|e| {
            WeatherGuardError::upstream(format!("Failed to read response body: {e}"))
        })?;
        let parsed = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse response from {}: {}", redact(url), e);
            WeatherGuardError::malformed(format!("Unexpected response shape: {e}"))
        })?;

        debug!(
            "Parsed response in {:.3}s",
            parse_start.elapsed().as_secs_f64()
        );
        Ok(parsed)
    }

    /// GET `url` and return the raw body
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.make_request(url)?;
        let bytes = response.bytes().map_err(|e| {
            WeatherGuardError::upstream(format!("Failed to read response body: {e}"))
        })?;
        Ok(bytes.to_vec())
    }

    #[instrument(skip(self, url), fields(url = %redact(url)))]
    fn make_request(&self, url: &str) -> Result<Response> {
        let request_start = Instant::now();

        let response = self.client.get(url).send().map_err(|e| {
            let e = e.without_url();
            warn!(
                "Network error after {:.3}s: {}",
                request_start.elapsed().as_secs_f64(),
                e
            );
            WeatherGuardError::upstream(format!("Network error: {e}"))
        })?;

        let status = response.status();
        let duration = request_start.elapsed();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            duration.as_secs_f64()
        );

        if status.is_success() {
            info!("Successful API request in {:.3}s", duration.as_secs_f64());
            if duration.as_secs() > 5 {
                warn!("Slow API response detected: {:.3}s", duration.as_secs_f64());
            }
            return Ok(response);
        }

        let message = match status.as_u16() {
            401 => "API authentication failed. Please check your API key.".to_string(),
            404 => "Location not found.".to_string(),
            _ => format!(
                "API request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            ),
        };
        warn!("{}", message);
        Err(WeatherGuardError::upstream_status(message, status.as_u16()))
    }
}

/// Strip the credential from a URL before it reaches the logs
#[must_use]
pub fn redact(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    match lower.find("appid=") {
        Some(start) => {
            let value_start = start + "appid=".len();
            let value_end = url[value_start..]
                .find('&')
                .map_or(url.len(), |offset| value_start + offset);
            format!("{}***{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_string(),
    }
}
