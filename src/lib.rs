//! # Trip Splitter
//!
//! Reconstructs discrete trips from a raw log of timestamped GPS fixes for a
//! single tracked entity.
//!
//! This library provides:
//! - Validation of raw fixes into valid and rejected sets (with reasons)
//! - Haversine distance and elapsed time between consecutive fixes
//! - Threshold-based segmentation of the fix sequence into trips
//! - Per-trip summaries and GeoJSON line features
//!
//! ## Features
//!
//! - **`parallel`** - Summarise trips in parallel with rayon
//! - **`cli`** - Build the `trip-splitter` command-line tool (default)
//!
//! ## Quick Start
//!
//! ```rust
//! use trip_splitter::{process_fixes, Fix, TripConfig};
//!
//! let raw = vec![
//!     Fix::from_raw(0, 51.5074, -0.1278, "2023-05-01 08:00:00"),
//!     Fix::from_raw(1, 51.5080, -0.1290, "2023-05-01 08:05:00"),
//!     Fix::from_raw(2, 52.2053, 0.1218, "2023-05-01 11:00:00"),
//! ];
//!
//! let report = process_fixes(&raw, &TripConfig::default()).unwrap();
//! assert_eq!(report.trips.len(), 2);
//! for (trip, summary) in report.trips.iter().zip(&report.summaries) {
//!     println!("{}: {:.2} km in {:.0} min", trip.name(), summary.distance_km, summary.duration_min);
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, TripSplitError};

// Great-circle distance
pub mod geo_utils;
pub use geo_utils::haversine_km;

// Raw timestamp parsing
pub mod timestamp;
pub use timestamp::parse_timestamp;

// Fix validation (valid / rejected partition)
pub mod validation;
pub use validation::{validate_fixes, RejectReason, RejectedFix, ValidationResult};

// Distance/time annotation between consecutive fixes
pub mod annotate;
pub use annotate::annotate_fixes;

// Trip segmentation
pub mod segmentation;
pub use segmentation::{split_trips, TripConfig};

// Per-trip statistics
pub mod summary;
pub use summary::{summarize_trip, summarize_trips, TripSummary};

// GeoJSON line features for map rendering
pub mod geometry;
pub use geometry::{trip_color, trip_feature, Feature, FeatureCollection};

// End-to-end processing
pub mod pipeline;
pub use pipeline::{process_fixes, TripReport};

// CSV / JSON / GeoJSON files
pub mod io;

// ============================================================================
// Core Types
// ============================================================================

/// A raw GPS observation as loaded from input.
///
/// Coordinates may be out of range (or NaN when the source cell was not a
/// number) and the timestamp may be missing; validation sorts that out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Position in the original input (0-based)
    pub index: usize,
    pub latitude: f64,
    pub longitude: f64,
    /// `None` when the source timestamp was missing or unparseable
    pub timestamp: Option<DateTime<Utc>>,
}

impl Fix {
    /// Create a fix from already-parsed parts.
    pub fn new(
        index: usize,
        latitude: f64,
        longitude: f64,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            index,
            latitude,
            longitude,
            timestamp,
        }
    }

    /// Create a fix from a raw timestamp string.
    ///
    /// # Example
    /// ```
    /// use trip_splitter::Fix;
    /// let fix = Fix::from_raw(0, 51.5074, -0.1278, "2023-05-01 08:00:00");
    /// assert!(fix.timestamp.is_some());
    /// let bad = Fix::from_raw(1, 51.5074, -0.1278, "yesterday");
    /// assert!(bad.timestamp.is_none());
    /// ```
    pub fn from_raw(index: usize, latitude: f64, longitude: f64, raw_timestamp: &str) -> Self {
        Self::new(index, latitude, longitude, parse_timestamp(raw_timestamp))
    }

    /// Both coordinates strictly inside (-90, 90) x (-180, 180).
    ///
    /// Poles and the antimeridian are excluded, and NaN never passes.
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude > -90.0
            && self.latitude < 90.0
            && self.longitude > -180.0
            && self.longitude < 180.0
    }
}

/// A fix that passed validation: coordinates in range and a known timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedFix {
    /// Position in the original input (0-based)
    pub index: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

/// A validated fix annotated with the step from its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatedFix {
    pub fix: TimedFix,
    /// Great-circle distance to the previous fix in kilometers (0 at a trip start)
    pub distance_from_prev_km: f64,
    /// Elapsed time since the previous fix in minutes (0 at a trip start)
    pub time_from_prev_min: f64,
}

impl ValidatedFix {
    /// Same fix with its step from the predecessor zeroed (a trip boundary).
    pub fn as_trip_start(&self) -> Self {
        Self {
            fix: self.fix,
            distance_from_prev_km: 0.0,
            time_from_prev_min: 0.0,
        }
    }

    /// Instantaneous speed over the step from the predecessor, in km/h.
    ///
    /// `None` when no time elapsed, so the step carries no speed sample.
    pub fn step_speed_kmh(&self) -> Option<f64> {
        if self.time_from_prev_min > 0.0 {
            Some(self.distance_from_prev_km / self.time_from_prev_min * 60.0)
        } else {
            None
        }
    }
}

/// A maximal run of fixes with no distance or time jump above the thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Sequential id in discovery order, starting at 0
    pub id: u32,
    /// Fixes in timestamp order; the first has a zero step
    pub fixes: Vec<ValidatedFix>,
}

impl Trip {
    /// Stable name used for file names and feature ordering (`trip_0`, `trip_1`, ...).
    pub fn name(&self) -> String {
        format!("trip_{}", self.id)
    }

    /// Ordered (longitude, latitude) pairs for line geometry.
    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        self.fixes
            .iter()
            .map(|f| (f.fix.longitude, f.fix.latitude))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_coordinate_bounds() {
        assert!(Fix::from_raw(0, 51.5074, -0.1278, "").has_valid_coordinates());
        assert!(Fix::from_raw(0, 89.999, 179.999, "").has_valid_coordinates());
        assert!(!Fix::from_raw(0, 90.0, 0.0, "").has_valid_coordinates());
        assert!(!Fix::from_raw(0, -90.0, 0.0, "").has_valid_coordinates());
        assert!(!Fix::from_raw(0, 0.0, 180.0, "").has_valid_coordinates());
        assert!(!Fix::from_raw(0, 0.0, -180.0, "").has_valid_coordinates());
        assert!(!Fix::from_raw(0, f64::NAN, 0.0, "").has_valid_coordinates());
    }

    #[test]
    fn test_step_speed() {
        let fix = TimedFix {
            index: 0,
            latitude: 0.0,
            longitude: 0.0,
            timestamp: parse_timestamp("2023-05-01 08:00:00").unwrap(),
        };
        let moving = ValidatedFix {
            fix,
            distance_from_prev_km: 10.0,
            time_from_prev_min: 30.0,
        };
        assert_eq!(moving.step_speed_kmh(), Some(20.0));
        assert_eq!(moving.as_trip_start().step_speed_kmh(), None);
        assert_eq!(moving.as_trip_start().distance_from_prev_km, 0.0);
    }

    #[test]
    fn test_trip_name_and_coordinates() {
        let fix = TimedFix {
            index: 3,
            latitude: 51.5,
            longitude: -0.12,
            timestamp: parse_timestamp("2023-05-01 08:00:00").unwrap(),
        };
        let trip = Trip {
            id: 7,
            fixes: vec![ValidatedFix {
                fix,
                distance_from_prev_km: 0.0,
                time_from_prev_min: 0.0,
            }],
        };
        assert_eq!(trip.name(), "trip_7");
        assert_eq!(trip.coordinates(), vec![(-0.12, 51.5)]);
        assert_eq!(trip.len(), 1);
    }
}
