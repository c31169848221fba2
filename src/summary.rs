//! Per-trip summary statistics.
//!
//! A trip with zero total duration has no defined speed; both speeds are
//! reported as 0.0 in that case so summaries are always finite.

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::Trip;

/// Aggregate distance, duration and speed for one trip.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TripSummary {
    /// Sum of step distances in kilometers
    pub distance_km: f64,
    /// Sum of step durations in minutes
    pub duration_min: f64,
    /// distance / duration in km/h (0 when duration is 0)
    pub avg_speed_kmh: f64,
    /// Fastest single step in km/h (0 when no step has elapsed time)
    pub max_speed_kmh: f64,
}

/// Summarise a single trip.
///
/// # Example
/// ```
/// use trip_splitter::{annotate_fixes, split_trips, summarize_trip, validate_fixes, Fix, TripConfig};
///
/// let raw = vec![
///     Fix::from_raw(0, 45.000, 10.0, "2023-05-01 08:00:00"),
///     Fix::from_raw(1, 45.009, 10.0, "2023-05-01 08:03:00"),
/// ];
/// let fixes = annotate_fixes(&validate_fixes(&raw).valid);
/// let trips = split_trips(&fixes, &TripConfig::default()).unwrap();
/// let summary = summarize_trip(&trips[0]);
/// assert_eq!(summary.duration_min, 3.0);
/// assert!((summary.avg_speed_kmh - 20.0).abs() < 0.1);
/// ```
pub fn summarize_trip(trip: &Trip) -> TripSummary {
    let distance_km: f64 = trip.fixes.iter().map(|f| f.distance_from_prev_km).sum();
    let duration_min: f64 = trip.fixes.iter().map(|f| f.time_from_prev_min).sum();

    let avg_speed_kmh = if duration_min > 0.0 {
        distance_km / (duration_min / 60.0)
    } else {
        0.0
    };

    let max_speed_kmh = trip
        .fixes
        .iter()
        .filter_map(|f| f.step_speed_kmh())
        .fold(None, |max: Option<f64>, s| Some(max.map_or(s, |m| m.max(s))))
        .unwrap_or(0.0);

    TripSummary {
        distance_km,
        duration_min,
        avg_speed_kmh,
        max_speed_kmh,
    }
}

/// Summarise every trip, in trip order.
pub fn summarize_trips(trips: &[Trip]) -> Vec<TripSummary> {
    trips.iter().map(summarize_trip).collect()
}

/// Parallel version of [`summarize_trips`]; output order matches input order.
#[cfg(feature = "parallel")]
pub fn summarize_trips_parallel(trips: &[Trip]) -> Vec<TripSummary> {
    trips.par_iter().map(summarize_trip).collect()
}
