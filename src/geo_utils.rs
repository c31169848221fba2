//! Geographic utilities.
//!
//! Distances are great-circle distances on a sphere of radius
//! [`EARTH_RADIUS_KM`], computed with the haversine formula.

use crate::TimedFix;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers between two (latitude, longitude) pairs in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );

    let dlon = lon2 - lon1;
    let dlat = lat2 - lat1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    // Rounding can push `a` a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Haversine distance in kilometers between two fixes.
pub fn fix_distance_km(a: &TimedFix, b: &TimedFix) -> f64 {
    haversine_km(a.latitude, a.longitude, b.latitude, b.longitude)
}
