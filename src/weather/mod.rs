//! Fetchers for the upstream weather and tile providers
//!
//! Each fetcher issues its own blocking requests and absorbs upstream
//! failures into an empty (`None`) result after logging them. Only
//! caller mistakes are returned as errors.

pub mod current;
pub mod forecast;
pub mod map;
mod openweather;

pub use current::CurrentConditionsFetcher;
pub use forecast::{ForecastFetcher, SAMPLES_PER_DAY};
pub use map::{DEFAULT_ZOOM, MapCompositor, tile_indices};

use crate::Result;
use tracing::error;

/// Collapse a fetch outcome: caller errors propagate, upstream trouble becomes `None`.
fn absorb_upstream<T>(what: &str, outcome: Result<T>) -> Result<Option<T>> {
    match outcome {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_caller_error() => Err(e),
        Err(e) => {
            error!("Failed to fetch {}: {}", what, e);
            Ok(None)
        }
    }
}
