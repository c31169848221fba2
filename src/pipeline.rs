//! End-to-end trip processing.
//!
//! validate -> annotate -> segment -> summarise -> build features.
//! Configuration is checked before any fix is touched, so a bad config never
//! produces partial output.

use std::time::Instant;

use log::{debug, info};

use crate::error::Result;
use crate::geometry::FeatureCollection;
use crate::{
    annotate_fixes, split_trips, validate_fixes, Fix, RejectedFix, Trip, TripConfig, TripSummary,
};

/// Everything produced for one run over a fix log.
#[derive(Debug, Clone, PartialEq)]
pub struct TripReport {
    /// Total number of raw fixes processed
    pub total_fixes: usize,
    /// Fixes that failed validation, in input order
    pub rejected: Vec<RejectedFix>,
    /// Trips in discovery order
    pub trips: Vec<Trip>,
    /// One summary per trip, same order as `trips`
    pub summaries: Vec<TripSummary>,
    /// One line feature per trip, same order as `trips`
    pub features: FeatureCollection,
}

impl TripReport {
    /// Number of fixes that made it into a trip.
    pub fn valid_fixes(&self) -> usize {
        self.trips.iter().map(|t| t.len()).sum()
    }

    /// (trip name, summary) pairs in trip order.
    pub fn named_summaries(&self) -> impl Iterator<Item = (String, &TripSummary)> + '_ {
        self.trips
            .iter()
            .map(|t| t.name())
            .zip(self.summaries.iter())
    }
}

/// Run the full pipeline over raw fixes.
///
/// # Example
/// ```
/// use trip_splitter::{process_fixes, Fix, TripConfig};
///
/// let raw = vec![
///     Fix::from_raw(0, 45.000, 10.0, "2023-05-01 08:00:00"),
///     Fix::from_raw(1, 45.001, 10.0, "2023-05-01 08:05:00"),
///     Fix::from_raw(2, 99.000, 10.0, "2023-05-01 08:06:00"),
/// ];
/// let report = process_fixes(&raw, &TripConfig::default()).unwrap();
/// assert_eq!(report.trips.len(), 1);
/// assert_eq!(report.rejected.len(), 1);
/// assert_eq!(report.features.features.len(), 1);
/// ```
pub fn process_fixes(raw: &[Fix], config: &TripConfig) -> Result<TripReport> {
    config.validate()?;
    let start = Instant::now();

    let validation = validate_fixes(raw);
    let annotated = annotate_fixes(&validation.valid);
    let trips = split_trips(&annotated, config)?;

    #[cfg(feature = "parallel")]
    let summaries = crate::summary::summarize_trips_parallel(&trips);
    #[cfg(not(feature = "parallel"))]
    let summaries = crate::summary::summarize_trips(&trips);

    for (trip, summary) in trips.iter().zip(&summaries) {
        debug!(
            "[Pipeline] {}: {} fixes, {:.3} km, {:.1} min, avg {:.1} km/h, max {:.1} km/h",
            trip.name(),
            trip.len(),
            summary.distance_km,
            summary.duration_min,
            summary.avg_speed_kmh,
            summary.max_speed_kmh
        );
    }

    let features = FeatureCollection::from_trips(&trips);

    info!(
        "[Pipeline] Processed {} fixes into {} trips ({} rejected) in {}ms",
        raw.len(),
        trips.len(),
        validation.rejected.len(),
        start.elapsed().as_millis()
    );

    Ok(TripReport {
        total_fixes: raw.len(),
        rejected: validation.rejected,
        trips,
        summaries,
        features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TripSplitError;

    #[test]
    fn test_bad_config_fails_fast() {
        let raw = vec![Fix::from_raw(0, 45.0, 10.0, "2023-05-01 08:00:00")];
        let config = TripConfig {
            max_distance_jump_km: 2.0,
            max_timedelta_min: 0.0,
        };
        assert!(matches!(
            process_fixes(&raw, &config),
            Err(TripSplitError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        let report = process_fixes(&[], &TripConfig::default()).unwrap();
        assert_eq!(report.total_fixes, 0);
        assert!(report.trips.is_empty());
        assert!(report.summaries.is_empty());
        assert!(report.features.features.is_empty());
    }

    #[test]
    fn test_counts_add_up() {
        let raw = vec![
            Fix::from_raw(0, 45.000, 10.0, "2023-05-01 08:00:00"),
            Fix::from_raw(1, 45.001, 10.0, "nope"),
            Fix::from_raw(2, 45.002, 10.0, "2023-05-01 08:05:00"),
            Fix::from_raw(3, 45.003, 190.0, "2023-05-01 08:06:00"),
        ];
        let report = process_fixes(&raw, &TripConfig::default()).unwrap();
        assert_eq!(report.valid_fixes() + report.rejected.len(), report.total_fixes);

        let names: Vec<String> = report.named_summaries().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["trip_0"]);
    }
}
