//! Distance and elapsed time between consecutive fixes.

use crate::geo_utils::fix_distance_km;
use crate::timestamp::minutes_between;
use crate::{TimedFix, ValidatedFix};

/// Annotate a timestamp-ordered fix sequence with the step from each fix's predecessor.
///
/// The first fix gets a zero step. Non-finite results are stored as 0.
///
/// # Example
/// ```
/// use trip_splitter::{annotate_fixes, validate_fixes, Fix};
///
/// let raw = vec![
///     Fix::from_raw(0, 10.0, 20.0, "2023-05-01 08:00:00"),
///     Fix::from_raw(1, 11.0, 20.0, "2023-05-01 09:00:00"),
/// ];
/// let fixes = annotate_fixes(&validate_fixes(&raw).valid);
/// assert_eq!(fixes[0].distance_from_prev_km, 0.0);
/// assert!((fixes[1].distance_from_prev_km - 111.19).abs() < 0.01);
/// assert_eq!(fixes[1].time_from_prev_min, 60.0);
/// ```
pub fn annotate_fixes(fixes: &[TimedFix]) -> Vec<ValidatedFix> {
    let mut out = Vec::with_capacity(fixes.len());

    if let Some(first) = fixes.first() {
        out.push(ValidatedFix {
            fix: *first,
            distance_from_prev_km: 0.0,
            time_from_prev_min: 0.0,
        });
    }

    out.extend(fixes.windows(2).map(|w| {
        let (prev, curr) = (&w[0], &w[1]);
        ValidatedFix {
            fix: *curr,
            distance_from_prev_km: finite_or_zero(fix_distance_km(prev, curr)),
            time_from_prev_min: finite_or_zero(minutes_between(&prev.timestamp, &curr.timestamp)),
        }
    }));

    out
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
