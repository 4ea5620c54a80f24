//! Configuration management for `WeatherGuard`
//!
//! Handles loading configuration from a TOML file, the legacy
//! `config.properties` credential file and environment variables, and
//! validates the result.

use crate::WeatherGuardError;
use crate::models::WeatherLayer;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Legacy key-value file holding the provider credential
pub const LEGACY_PROPERTIES_FILE: &str = "config.properties";

/// Root configuration structure for `WeatherGuard`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherGuardConfig {
    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Map composition settings
    #[serde(default)]
    pub map: MapConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default application settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Weather provider configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Provider API key. Fetches degrade to empty results without it.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL for current-conditions and forecast requests
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Base URL of the XYZ base-map tile source
    #[serde(default = "default_tile_base_url")]
    pub tile_base_url: String,
    /// Base URL of the XYZ weather-layer tile source
    #[serde(default = "default_layer_base_url")]
    pub layer_base_url: String,
    /// Base URL for condition icons
    #[serde(default = "default_icon_base_url")]
    pub icon_base_url: String,
    /// User-Agent sent with every request; the tile source requires one
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds. `None` leaves requests unbounded.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Map composition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Slippy-map zoom level
    #[serde(default = "default_map_zoom")]
    pub zoom: u8,
    /// Weather layers drawn over the base tile, bottom to top
    #[serde(default = "default_map_layers")]
    pub layers: Vec<WeatherLayer>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Location used when none is given on the command line
    #[serde(default)]
    pub location: Option<String>,
    /// Display temperatures in Fahrenheit
    #[serde(default = "default_use_fahrenheit")]
    pub use_fahrenheit: bool,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_tile_base_url() -> String {
    "https://tile.openstreetmap.org".to_string()
}

fn default_layer_base_url() -> String {
    "https://tile.openweathermap.org/map".to_string()
}

fn default_icon_base_url() -> String {
    "https://openweathermap.org/img/wn".to_string()
}

fn default_user_agent() -> String {
    "WeatherGuard/1.0 (Educational Project)".to_string()
}

fn default_map_zoom() -> u8 {
    5
}

fn default_map_layers() -> Vec<WeatherLayer> {
    WeatherLayer::default_stack()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_use_fahrenheit() -> bool {
    true
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            tile_base_url: default_tile_base_url(),
            layer_base_url: default_layer_base_url(),
            icon_base_url: default_icon_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: None,
        }
    }
}

impl WeatherConfig {
    /// The credential, if one is configured and not blank
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: default_map_zoom(),
            layers: default_map_layers(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            location: None,
            use_fahrenheit: default_use_fahrenheit(),
        }
    }
}

impl WeatherGuardConfig {
    /// Load configuration from the default locations and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from the specified TOML path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        Self::load_from_paths(config_path, Some(PathBuf::from(LEGACY_PROPERTIES_FILE)))
    }

    /// Load configuration from a TOML file and an optional legacy properties file
    pub fn load_from_paths(
        config_path: Option<PathBuf>,
        properties_path: Option<PathBuf>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("weatherguard.toml"))
        });

        if config_file.exists() {
            debug!("Loading configuration from {}", config_file.display());
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(FileFormat::Toml),
            );
        }

        // WEATHERGUARD_WEATHER__API_KEY, WEATHERGUARD_MAP__ZOOM, ...
        builder = builder.add_source(
            Environment::with_prefix("WEATHERGUARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherGuardConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.weather.api_key.is_none() {
            if let Some(path) = properties_path.filter(|p| p.exists()) {
                config.weather.api_key = read_legacy_api_key(&path)?;
            }
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherguard").join("config.toml"))
    }

    /// Apply default values to fields left blank
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.tile_base_url.is_empty() {
            self.weather.tile_base_url = default_tile_base_url();
        }
        if self.weather.layer_base_url.is_empty() {
            self.weather.layer_base_url = default_layer_base_url();
        }
        if self.weather.icon_base_url.is_empty() {
            self.weather.icon_base_url = default_icon_base_url();
        }
        if self.weather.user_agent.is_empty() {
            self.weather.user_agent = default_user_agent();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// A credential may be absent, but not present and blank
    pub fn validate_api_key(&self) -> Result<()> {
        if let Some(api_key) = &self.weather.api_key {
            if api_key.trim().is_empty() {
                return Err(WeatherGuardError::config(
                    "Weather API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.map.zoom > 19 {
            return Err(WeatherGuardError::config("Map zoom cannot exceed 19").into());
        }

        if let Some(timeout) = self.weather.timeout_seconds {
            if timeout == 0 || timeout > 300 {
                return Err(WeatherGuardError::config(
                    "Weather API timeout must be between 1 and 300 seconds",
                )
                .into());
            }
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherGuardError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherGuardError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("weather", &self.weather.base_url),
            ("tile", &self.weather.tile_base_url),
            ("layer", &self.weather.layer_base_url),
            ("icon", &self.weather.icon_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherGuardError::config(format!(
                    "The {name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

/// Read `apiKey` from a Java-style `key=value` properties file
fn read_legacy_api_key(path: &Path) -> Result<Option<String>> {
    let settings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Ini))
        .build()
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let key = settings
        .get_string("apiKey")
        .or_else(|_| settings.get_string("apikey"))
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty());

    debug!(
        "Legacy properties file {} {} an apiKey",
        path.display(),
        if key.is_some() { "provides" } else { "lacks" }
    );
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn missing_path() -> Option<PathBuf> {
        Some(PathBuf::from("/nonexistent/weatherguard/config.toml"))
    }

    #[test]
    fn test_default_config() {
        let config = WeatherGuardConfig::default();
        assert_eq!(
            config.weather.base_url,
            "https://api.openweathermap.org/data/2.5"
        );
        assert_eq!(config.weather.timeout_seconds, None);
        assert_eq!(config.map.zoom, 5);
        assert_eq!(
            config.map.layers,
            vec![
                WeatherLayer::Temperature,
                WeatherLayer::Precipitation,
                WeatherLayer::Clouds
            ]
        );
        assert_eq!(config.logging.level, "info");
        assert!(config.defaults.use_fahrenheit);
        assert!(config.weather.api_key.is_none());
    }

    #[test]
    fn test_missing_api_key_is_valid() {
        let config = WeatherGuardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.weather.api_key(), None);
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let mut config = WeatherGuardConfig::default();
        config.weather.api_key = Some("   ".to_string());
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_api_key_is_trimmed() {
        let mut config = WeatherGuardConfig::default();
        config.weather.api_key = Some(" abc123 ".to_string());
        assert_eq!(config.weather.api_key(), Some("abc123"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = WeatherGuardConfig::default();
        config.logging.level = "loud".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = WeatherGuardConfig::default();
        config.map.zoom = 22;
        assert!(config.validate().unwrap_err().to_string().contains("zoom"));

        let mut config = WeatherGuardConfig::default();
        config.weather.timeout_seconds = Some(500);
        assert!(config.validate().unwrap_err().to_string().contains("timeout"));
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = WeatherGuardConfig::default();
        config.weather.tile_base_url = "ftp://tiles.example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[weather]
api_key = "toml_key"
timeout_seconds = 15

[map]
zoom = 7
layers = ["clouds", "wind"]

[defaults]
location = "Portland,US"
use_fahrenheit = false
"#
        )
        .unwrap();

        let config =
            WeatherGuardConfig::load_from_paths(Some(file.path().to_path_buf()), None).unwrap();
        assert_eq!(config.weather.api_key(), Some("toml_key"));
        assert_eq!(config.weather.timeout_seconds, Some(15));
        assert_eq!(config.map.zoom, 7);
        assert_eq!(
            config.map.layers,
            vec![WeatherLayer::Clouds, WeatherLayer::Wind]
        );
        assert_eq!(config.defaults.location.as_deref(), Some("Portland,US"));
        assert!(!config.defaults.use_fahrenheit);
        // untouched sections keep their defaults
        assert_eq!(
            config.weather.tile_base_url,
            "https://tile.openstreetmap.org"
        );
    }

    #[test]
    fn test_legacy_properties_supply_api_key() {
        let mut props = NamedTempFile::new().unwrap();
        writeln!(props, "apiKey=legacy_key_123").unwrap();

        let config =
            WeatherGuardConfig::load_from_paths(missing_path(), Some(props.path().to_path_buf()))
                .unwrap();
        assert_eq!(config.weather.api_key(), Some("legacy_key_123"));
    }

    #[test]
    fn test_absent_properties_file_leaves_key_unset() {
        let config = WeatherGuardConfig::load_from_paths(
            missing_path(),
            Some(PathBuf::from("/nonexistent/config.properties")),
        )
        .unwrap();
        assert_eq!(config.weather.api_key(), None);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = WeatherGuardConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("weatherguard"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
