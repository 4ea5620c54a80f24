//! Aggregate returned by the weather facade

use super::{CurrentConditions, ForecastResult, MapImage};
use serde_json::{Value, json};

/// Current conditions, forecast and map for one location.
///
/// Each piece is fetched independently, so any of them may be missing while
/// the others are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherBundle {
    pub current: Option<CurrentConditions>,
    pub forecast: Option<ForecastResult>,
    pub map: Option<MapImage>,
}

impl WeatherBundle {
    /// Whether all three pieces are present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current.is_some() && self.forecast.is_some() && self.map.is_some()
    }

    /// JSON document suitable for storing alongside a session record.
    ///
    /// The map raster is summarised rather than embedded.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map = self.map.as_ref().map(|map| {
            json!({
                "coordinates": map.coordinates,
                "zoom": map.zoom,
                "tile": { "x": map.tile.0, "y": map.tile.1 },
                "width": map.width(),
                "height": map.height(),
                "layers": map.layers_applied,
            })
        });

        json!({
            "weather": self.current,
            "forecast": self.forecast,
            "map": map,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::weather::tests::sample_conditions;
    use crate::models::{Coordinates, DaySummary, WeatherLayer};
    use image::RgbaImage;

    #[test]
    fn test_empty_bundle_json() {
        let bundle = WeatherBundle::default();
        assert!(!bundle.is_complete());
        let value = bundle.to_json();
        assert!(value["weather"].is_null());
        assert!(value["forecast"].is_null());
        assert!(value["map"].is_null());
    }

    #[test]
    fn test_full_bundle_json() {
        let coordinates = Coordinates::new(45.52, -122.68).unwrap();
        let bundle = WeatherBundle {
            current: Some(sample_conditions()),
            forecast: Some(ForecastResult::new(
                coordinates,
                -28_800,
                vec![DaySummary {
                    date_epoch: 1_704_110_400,
                    high_temp_f: 50,
                    low_temp_f: 40,
                    description: "Rain".to_string(),
                    icon_code: "10d".to_string(),
                }],
            )),
            map: Some(MapImage {
                coordinates,
                zoom: 5,
                tile: (5, 11),
                layers_applied: vec![WeatherLayer::Clouds],
                raster: RgbaImage::new(256, 256),
            }),
        };

        assert!(bundle.is_complete());
        let value = bundle.to_json();
        assert_eq!(value["weather"]["location_name"], "Portland");
        assert_eq!(value["weather"]["coordinates"]["latitude"], 45.52);
        assert_eq!(value["forecast"]["days"][0]["high_temp_f"], 50);
        assert_eq!(value["map"]["width"], 256);
        assert_eq!(value["map"]["layers"][0], "clouds");
    }
}
