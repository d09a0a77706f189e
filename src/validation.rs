use crate::error::{TrailError, TrailResult};
use crate::types::ActivityKind;

pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

pub fn all_positive(values: &[f64]) -> bool {
    values.iter().all(|&v| v > 0.0)
}

/// Numeric coercion of a form field: blank reads as 0, garbage as NaN.
pub fn parse_field(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Values that passed the per-activity checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checked {
    pub distance: f64,
    pub duration: f64,
    /// Cadence for runs, elevation gain for rides.
    pub extra: f64,
}

/// Runs need all three values positive; rides only distance and duration,
/// since net elevation gain can be zero or negative.
pub fn check(kind: ActivityKind, distance: f64, duration: f64, extra: f64) -> TrailResult<Checked> {
    let values = [distance, duration, extra];
    let positive: &[f64] = match kind {
        ActivityKind::Running => &values,
        ActivityKind::Cycling => &values[..2],
    };

    if !all_finite(&values) {
        return Err(TrailError::InvalidInput(format!(
            "{kind} values must be numbers: {values:?}"
        )));
    }
    if !all_positive(positive) {
        return Err(TrailError::InvalidInput(format!(
            "{kind} values must be positive: {positive:?}"
        )));
    }

    Ok(Checked {
        distance,
        duration,
        extra,
    })
}
