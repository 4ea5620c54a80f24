//! Geographic coordinates

use crate::{Result, WeatherGuardError};
use serde::Serialize;

/// Validated latitude/longitude pair in decimal degrees
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Create coordinates, rejecting values outside [-90, 90] x [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !Self::is_valid(latitude, longitude) {
            return Err(WeatherGuardError::validation(format!(
                "Coordinates out of range: lat={latitude}, lon={longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Whether the pair lies inside the valid ranges
    #[must_use]
    pub fn is_valid(latitude: f64, longitude: f64) -> bool {
        (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
