//! Base map tile with weather layers stacked on top

use super::absorb_upstream;
use crate::api::ApiClient;
use crate::config::WeatherConfig;
use crate::models::{Coordinates, MapImage, WeatherLayer};
use crate::{Result, WeatherGuardError};
use image::{RgbaImage, imageops};
use std::f64::consts::PI;
use tracing::{debug, info, instrument, warn};

/// Country-scale view
pub const DEFAULT_ZOOM: u8 = 5;
/// Deepest zoom served by the public tile sources
pub const MAX_ZOOM: u8 = 19;

/// Slippy-map tile indices containing a point at `zoom`.
///
/// Results are clamped to the tile grid, so the poles and the antimeridian map
/// onto edge tiles.
#[must_use]
pub fn tile_indices(latitude: f64, longitude: f64, zoom: u8) -> (u32, u32) {
    let n = f64::from(1u32 << zoom.min(MAX_ZOOM));
    let max = n - 1.0;
    let lat_rad = latitude.to_radians();

    let x = ((longitude + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();

    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, max) };
    let y = if y.is_nan() { max } else { y.clamp(0.0, max) };
    (x as u32, y as u32)
}

/// Draw `layer` over `base` from the top-left corner.
///
/// Opaque layer pixels replace the base; translucent ones blend by their own alpha.
pub fn composite(base: &mut RgbaImage, layer: &RgbaImage) {
    imageops::overlay(base, layer, 0, 0);
}

/// Fetches a base tile and composites weather layer tiles onto it
#[derive(Debug, Clone)]
pub struct MapCompositor {
    client: ApiClient,
    config: WeatherConfig,
}

impl MapCompositor {
    #[must_use]
    pub fn new(client: ApiClient, config: WeatherConfig) -> Self {
        Self { client, config }
    }

    /// Fetch the base tile around a point and stack `layers` on it in order.
    ///
    /// A failed base tile (or missing credential) yields `Ok(None)`. A failed
    /// layer is logged and skipped. Out-of-range coordinates or zoom are
    /// rejected before any request.
    #[instrument(skip(self))]
    pub fn fetch_composite(
        &self,
        latitude: f64,
        longitude: f64,
        layers: &[WeatherLayer],
        zoom: u8,
    ) -> Result<Option<MapImage>> {
        if zoom > MAX_ZOOM {
            return Err(WeatherGuardError::validation(format!(
                "Zoom must be at most {MAX_ZOOM}, got {zoom}"
            )));
        }
        let coordinates = Coordinates::new(latitude, longitude)?;

        absorb_upstream("weather map", self.try_fetch(coordinates, layers, zoom))
    }

    fn try_fetch(
        &self,
        coordinates: Coordinates,
        layers: &[WeatherLayer],
        zoom: u8,
    ) -> Result<MapImage> {
        let api_key = self.config.api_key().ok_or_else(|| {
            WeatherGuardError::configuration_missing("API key is missing or empty in config")
        })?;

        let (x, y) = tile_indices(coordinates.latitude(), coordinates.longitude(), zoom);
        debug!(
            "Tile {}/{}/{} for {}",
            zoom,
            x,
            y,
            coordinates.format_coordinates()
        );

        let base_url = format!(
            "{}/{zoom}/{x}/{y}.png",
            self.config.tile_base_url.trim_end_matches('/')
        );
        let mut raster = self.fetch_tile(&base_url)?;

        let mut layers_applied = Vec::with_capacity(layers.len());
        for layer in layers {
            let layer_url = format!(
                "{}/{}/{zoom}/{x}/{y}.png?appid={api_key}",
                self.config.layer_base_url.trim_end_matches('/'),
                layer.slug()
            );
            match self.fetch_tile(&layer_url) {
                Ok(tile) => {
                    composite(&mut raster, &tile);
                    layers_applied.push(*layer);
                    debug!("Applied {} layer", layer);
                }
                Err(e) => {
                    warn!(
                        "Failed to fetch {} layer, continuing with other layers: {}",
                        layer, e
                    );
                }
            }
        }

        info!(
            "Composited map with {}/{} weather layers",
            layers_applied.len(),
            layers.len()
        );

        Ok(MapImage {
            coordinates,
            zoom,
            tile: (x, y),
            layers_applied,
            raster,
        })
    }

    fn fetch_tile(&self, url: &str) -> Result<RgbaImage> {
        let bytes = self.client.get_bytes(url)?;
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}
