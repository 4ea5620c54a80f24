//! Composited weather map model

use super::Coordinates;
use crate::{Result, WeatherGuardError};
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

/// Weather overlay published by the layer tile source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherLayer {
    Temperature,
    Precipitation,
    Clouds,
    Wind,
    Pressure,
}

impl WeatherLayer {
    /// Bottom-to-top order used when nothing else is configured; cloud cover ends up topmost.
    #[must_use]
    pub fn default_stack() -> Vec<Self> {
        vec![Self::Temperature, Self::Precipitation, Self::Clouds]
    }

    /// Layer name used in tile URLs
    #[must_use]
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Temperature => "temp_new",
            Self::Precipitation => "precipitation_new",
            Self::Clouds => "clouds_new",
            Self::Wind => "wind_new",
            Self::Pressure => "pressure_new",
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Precipitation => "precipitation",
            Self::Clouds => "clouds",
            Self::Wind => "wind",
            Self::Pressure => "pressure",
        }
    }
}

impl fmt::Display for WeatherLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WeatherLayer {
    type Err = WeatherGuardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temperature" | "temp" | "temp_new" => Ok(Self::Temperature),
            "precipitation" | "precipitation_new" => Ok(Self::Precipitation),
            "clouds" | "clouds_new" => Ok(Self::Clouds),
            "wind" | "wind_new" => Ok(Self::Wind),
            "pressure" | "pressure_new" => Ok(Self::Pressure),
            other => Err(WeatherGuardError::validation(format!(
                "Unknown weather layer '{other}'"
            ))),
        }
    }
}

/// Base map tile with weather layers drawn over it
#[derive(Debug, Clone, PartialEq)]
pub struct MapImage {
    pub coordinates: Coordinates,
    pub zoom: u8,
    /// Slippy-map tile indices (x, y) at `zoom`
    pub tile: (u32, u32),
    /// Layers that were actually composited, bottom to top
    pub layers_applied: Vec<WeatherLayer>,
    pub raster: RgbaImage,
}

impl MapImage {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Encode the composited raster as PNG bytes
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(self.raster.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| WeatherGuardError::malformed(format!("PNG encoding failed: {e}")))?;
        Ok(bytes)
    }
}
