//! Trip segmentation.
//!
//! A single left-to-right scan over the annotated fixes. A step whose distance
//! or elapsed time is strictly greater than its threshold starts a new trip,
//! and the boundary fix has its step zeroed.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TripSplitError};
use crate::{Trip, ValidatedFix};

/// Thresholds for splitting a fix sequence into trips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripConfig {
    /// Largest step distance (km) allowed inside a trip.
    /// Default: 2.0
    pub max_distance_jump_km: f64,

    /// Largest step gap (minutes) allowed inside a trip.
    /// Default: 25.0
    pub max_timedelta_min: f64,
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            max_distance_jump_km: 2.0,
            max_timedelta_min: 25.0,
        }
    }
}

impl TripConfig {
    /// Create a validated config.
    pub fn new(max_distance_jump_km: f64, max_timedelta_min: f64) -> Result<Self> {
        let config = Self {
            max_distance_jump_km,
            max_timedelta_min,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse thresholds given as text (e.g. from a config file or command line).
    ///
    /// # Example
    /// ```
    /// use trip_splitter::TripConfig;
    ///
    /// let config = TripConfig::from_strs("2.5", " 30 ").unwrap();
    /// assert_eq!(config.max_distance_jump_km, 2.5);
    /// assert!(TripConfig::from_strs("two", "30").is_err());
    /// assert!(TripConfig::from_strs("2", "0").is_err());
    /// ```
    pub fn from_strs(max_distance_jump_km: &str, max_timedelta_min: &str) -> Result<Self> {
        let distance = parse_threshold("max_distance_jump_km", max_distance_jump_km)?;
        let time = parse_threshold("max_timedelta_min", max_timedelta_min)?;
        Self::new(distance, time)
    }

    /// Both thresholds must be finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        check_threshold("max_distance_jump_km", self.max_distance_jump_km)?;
        check_threshold("max_timedelta_min", self.max_timedelta_min)
    }

    /// True if the step into `fix` is a jump that starts a new trip.
    pub fn is_jump(&self, fix: &ValidatedFix) -> bool {
        fix.distance_from_prev_km > self.max_distance_jump_km
            || fix.time_from_prev_min > self.max_timedelta_min
    }
}

fn parse_threshold(name: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| TripSplitError::ConfigError {
            message: format!("{} must be a number, got '{}'", name, raw),
        })
}

fn check_threshold(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TripSplitError::InvalidThreshold { name, value })
    }
}

/// Split an annotated, timestamp-ordered fix sequence into trips.
///
/// Trips are numbered 0, 1, 2, ... in scan order. Fails only if `config`
/// is invalid, which is checked before any fix is looked at.
///
/// The first fix of every trip, trip 0 included, has its step zeroed. A
/// slice that starts mid-log therefore opens trip 0 with distance and time 0
/// rather than carrying a step from a fix outside the slice, and that step is
/// never tested against the thresholds.
///
/// # Example
/// ```
/// use trip_splitter::{annotate_fixes, split_trips, validate_fixes, Fix, TripConfig};
///
/// let raw = vec![
///     Fix::from_raw(0, 45.000, 10.0, "2023-05-01 08:00:00"),
///     Fix::from_raw(1, 45.001, 10.0, "2023-05-01 08:05:00"),
///     Fix::from_raw(2, 45.002, 10.0, "2023-05-01 10:00:00"),
/// ];
/// let fixes = annotate_fixes(&validate_fixes(&raw).valid);
/// let trips = split_trips(&fixes, &TripConfig::default()).unwrap();
/// assert_eq!(trips.len(), 2);
/// assert_eq!(trips[1].fixes[0].time_from_prev_min, 0.0);
/// ```
pub fn split_trips(fixes: &[ValidatedFix], config: &TripConfig) -> Result<Vec<Trip>> {
    config.validate()?;

    let (_, trips) = fixes.iter().fold(
        (0u32, Vec::<Trip>::new()),
        |(trip_id, mut trips), fix| {
            let jump = !trips.is_empty() && config.is_jump(fix);
            let trip_id = if jump { trip_id + 1 } else { trip_id };

            if jump {
                debug!(
                    "[Segmenter] Fix {} starts trip_{} ({:.3} km, {:.1} min from previous)",
                    fix.fix.index, trip_id, fix.distance_from_prev_km, fix.time_from_prev_min
                );
                trips.push(Trip {
                    id: trip_id,
                    fixes: vec![fix.as_trip_start()],
                });
            } else {
                match trips.last_mut() {
                    Some(trip) => trip.fixes.push(*fix),
                    None => trips.push(Trip {
                        id: trip_id,
                        fixes: vec![fix.as_trip_start()],
                    }),
                }
            }

            (trip_id, trips)
        },
    );

    info!(
        "[Segmenter] {} fixes -> {} trips (max jump {} km, max gap {} min)",
        fixes.len(),
        trips.len(),
        config.max_distance_jump_km,
        config.max_timedelta_min
    );

    Ok(trips)
}
