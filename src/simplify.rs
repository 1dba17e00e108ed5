//! Polyline simplification with the Ramer-Douglas-Peucker algorithm.
//!
//! Tolerance is expressed in meters of perpendicular deviation, so the
//! result is independent of latitude (a pure degree-space tolerance would
//! shrink with the longitude scale).

use log::debug;

use crate::geo_utils::point_segment_deviation;
use crate::TrackPoint;

/// Simplify a point sequence, keeping every point whose removal would let
/// the polyline deviate more than `tolerance_m` meters from the original.
///
/// Endpoints are always retained. A tolerance of zero or fewer than 3
/// points returns the input unchanged. Deterministic for identical input
/// and tolerance.
pub fn simplify_points(points: &[TrackPoint], tolerance_m: f64) -> Vec<TrackPoint> {
    if tolerance_m <= 0.0 || points.len() < 3 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    rdp_mark(points, 0, points.len() - 1, tolerance_m, &mut keep);

    let simplified: Vec<TrackPoint> = points
        .iter()
        .zip(keep.iter())
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect();

    debug!(
        "simplified {} -> {} points at {:.2}m tolerance",
        points.len(),
        simplified.len(),
        tolerance_m
    );

    simplified
}

/// Mark the points between `start` and `end` (exclusive) that must survive:
/// find the maximum perpendicular deviation from the chord; if it exceeds
/// the tolerance, keep that point and recurse into both halves, otherwise
/// discard everything in between.
fn rdp_mark(points: &[TrackPoint], start: usize, end: usize, tolerance_m: f64, keep: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_deviation = 0.0;
    let mut max_index = start;
    for i in (start + 1)..end {
        let deviation = point_segment_deviation(&points[i], &points[start], &points[end]);
        if deviation > max_deviation {
            max_deviation = deviation;
            max_index = i;
        }
    }

    if max_deviation > tolerance_m {
        keep[max_index] = true;
        rdp_mark(points, start, max_index, tolerance_m, keep);
        rdp_mark(points, max_index, end, tolerance_m, keep);
    }
}
