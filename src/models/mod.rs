//! Data models for `WeatherGuard`
//!
//! This module contains the value objects produced by the weather pipeline:
//! - Location: validated geographic coordinates
//! - Weather: current conditions snapshot
//! - Forecast: per-day summaries reduced from 3-hour samples
//! - Map: composited map raster and the weather layers drawn on it
//! - Bundle: the facade's aggregate of all three

pub mod bundle;
pub mod forecast;
pub mod location;
pub mod map;
pub mod weather;

// Re-export all public types for convenient access
pub use bundle::WeatherBundle;
pub use forecast::{DaySummary, ForecastResult};
pub use location::Coordinates;
pub use map::{MapImage, WeatherLayer};
pub use weather::{ConditionsReading, CurrentConditions, icon_url};
