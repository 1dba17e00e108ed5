//! Coordinate quantization: bounded decimal precision and optional
//! elevation removal.

use crate::TrackPoint;

/// Round latitude/longitude to `precision` decimal digits and optionally
/// drop elevation.
///
/// When `precision` is `None` and `drop_elevation` is false this is a
/// no-op fast path returning the input unchanged.
///
/// Rounding policy: round-half-away-from-zero (`f64::round` semantics),
/// chosen for platform-independent fixture reproducibility. Applying the
/// same precision twice is idempotent.
pub fn round_coordinates(
    points: &[TrackPoint],
    precision: Option<u32>,
    drop_elevation: bool,
) -> Vec<TrackPoint> {
    if precision.is_none() && !drop_elevation {
        return points.to_vec();
    }

    points
        .iter()
        .map(|p| {
            let mut out = *p;
            if let Some(digits) = precision {
                out.latitude = round_to(p.latitude, digits);
                out.longitude = round_to(p.longitude, digits);
            }
            if drop_elevation {
                out.elevation = None;
            }
            out
        })
        .collect()
}

fn round_to(value: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits as i32);
    (value * scale).round() / scale
}
