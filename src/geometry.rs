//! GeoJSON line features for trips.
//!
//! Each trip becomes one `LineString` feature over its (longitude, latitude)
//! pairs in timestamp order, tagged with a `stroke` colour. Feature order in a
//! collection matches trip order.

use geo::{BoundingRect, LineString};
use serde::{Deserialize, Serialize};

use crate::Trip;

/// GeoJSON LineString geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// [longitude, latitude] pairs
    pub coordinates: Vec<[f64; 2]>,
}

/// Rendering properties attached to a trip feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    /// Trip name (`trip_<n>`)
    pub name: String,
    /// Line colour as `#RRGGBB`
    pub stroke: String,
}

/// GeoJSON Feature for one trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    /// [min_lon, min_lat, max_lon, max_lat]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    pub geometry: LineGeometry,
    pub properties: FeatureProperties,
}

/// GeoJSON FeatureCollection of every trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }

    /// One feature per trip, coloured with [`trip_color`].
    pub fn from_trips(trips: &[Trip]) -> Self {
        Self::new(
            trips
                .iter()
                .map(|trip| trip_feature(trip, &trip_color(trip.id)))
                .collect(),
        )
    }
}

/// Line geometry through a trip's fixes, x = longitude, y = latitude.
pub fn trip_line_string(trip: &Trip) -> LineString<f64> {
    LineString::from(trip.coordinates())
}

/// Build the GeoJSON feature for a trip.
pub fn trip_feature(trip: &Trip, stroke: &str) -> Feature {
    let line = trip_line_string(trip);
    let bbox = line
        .bounding_rect()
        .map(|r| [r.min().x, r.min().y, r.max().x, r.max().y]);

    Feature {
        kind: "Feature".to_string(),
        bbox,
        geometry: LineGeometry {
            kind: "LineString".to_string(),
            coordinates: line.coords().map(|c| [c.x, c.y]).collect(),
        },
        properties: FeatureProperties {
            name: trip.name(),
            stroke: stroke.to_string(),
        },
    }
}

/// Deterministic stroke colour for a trip id.
///
/// Hues step by 137° around the wheel (coprime with 360), so the first 360
/// trips all get different colours and neighbours contrast.
pub fn trip_color(trip_id: u32) -> String {
    let hue = ((trip_id as u64 * 137) % 360) as f64;
    let (r, g, b) = hsl_to_rgb(hue, 0.65, 0.5);
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}
