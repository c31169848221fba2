//! Fix validation.
//!
//! Every raw fix lands in exactly one of the valid or rejected sets. Valid
//! fixes leave sorted by timestamp; ties keep their input order.

use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{Fix, TimedFix};

/// Why a fix was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    InvalidCoordinates,
    BadTimestamp,
    InvalidCoordinatesAndBadTimestamp,
}

impl RejectReason {
    /// Combine the two independent checks into a single reason.
    ///
    /// Returns `None` when both checks pass.
    pub fn from_checks(coordinates_ok: bool, timestamp_ok: bool) -> Option<Self> {
        match (coordinates_ok, timestamp_ok) {
            (true, true) => None,
            (false, true) => Some(RejectReason::InvalidCoordinates),
            (true, false) => Some(RejectReason::BadTimestamp),
            (false, false) => Some(RejectReason::InvalidCoordinatesAndBadTimestamp),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::InvalidCoordinates => "invalid coordinates",
            RejectReason::BadTimestamp => "bad timestamp",
            RejectReason::InvalidCoordinatesAndBadTimestamp => {
                "invalid coordinates and bad timestamp"
            }
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw fix that failed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedFix {
    pub fix: Fix,
    pub reason: RejectReason,
}

/// Output of [`validate_fixes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    /// Valid fixes sorted ascending by timestamp (stable)
    pub valid: Vec<TimedFix>,
    /// Rejected fixes in input order
    pub rejected: Vec<RejectedFix>,
}

/// Validate a single fix.
pub fn validate_fix(fix: &Fix) -> Result<TimedFix, RejectReason> {
    match (fix.has_valid_coordinates(), fix.timestamp) {
        (true, Some(timestamp)) => Ok(TimedFix {
            index: fix.index,
            latitude: fix.latitude,
            longitude: fix.longitude,
            timestamp,
        }),
        (false, Some(_)) => Err(RejectReason::InvalidCoordinates),
        (true, None) => Err(RejectReason::BadTimestamp),
        (false, None) => Err(RejectReason::InvalidCoordinatesAndBadTimestamp),
    }
}

/// Partition raw fixes into valid and rejected sets.
///
/// # Example
/// ```
/// use trip_splitter::{validate_fixes, Fix, RejectReason};
///
/// let raw = vec![
///     Fix::from_raw(0, 51.51, -0.13, "2023-05-01 08:05:00"),
///     Fix::from_raw(1, 95.0, -0.13, "2023-05-01 08:00:00"),
///     Fix::from_raw(2, 51.50, -0.12, "2023-05-01 08:00:00"),
/// ];
/// let result = validate_fixes(&raw);
/// assert_eq!(result.valid.len(), 2);
/// assert_eq!(result.valid[0].index, 2);
/// assert_eq!(result.rejected[0].reason, RejectReason::InvalidCoordinates);
/// ```
pub fn validate_fixes(raw: &[Fix]) -> ValidationResult {
    let mut valid = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for fix in raw {
        match validate_fix(fix) {
            Ok(timed) => valid.push(timed),
            Err(reason) => {
                debug!("[Validator] Rejected fix {}: {}", fix.index, reason);
                rejected.push(RejectedFix {
                    fix: fix.clone(),
                    reason,
                });
            }
        }
    }

    // Vec::sort_by_key is stable, so equal timestamps keep input order
    valid.sort_by_key(|f| f.timestamp);

    info!(
        "[Validator] {} fixes: {} valid, {} rejected",
        raw.len(),
        valid.len(),
        rejected.len()
    );

    ValidationResult { valid, rejected }
}
