//! `WeatherGuard` - current conditions, five-day forecast and weather maps
//!
//! This library fetches weather data for a named location from `OpenWeatherMap`,
//! reduces the 3-hour forecast series to daily summaries, and composites
//! weather layer tiles over an OpenStreetMap base tile.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod service;
pub mod units;
pub mod weather;

// Re-export core types for public API
pub use api::ApiClient;
pub use config::WeatherGuardConfig;
pub use error::WeatherGuardError;
pub use models::{
    Coordinates, CurrentConditions, DaySummary, ForecastResult, MapImage, WeatherBundle,
    WeatherLayer,
};
pub use service::{OpenWeatherProvider, WeatherFacade, WeatherProvider};
pub use weather::{CurrentConditionsFetcher, ForecastFetcher, MapCompositor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherGuardError>;
