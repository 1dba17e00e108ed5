//! Uniform time resampling via linear interpolation.

use time::{Duration, OffsetDateTime};

use crate::TrackPoint;

/// Re-sample a strictly time-ordered track onto a fixed time grid.
///
/// A virtual clock steps from the first point's timestamp to the last in
/// increments of `interval_secs` (both endpoints inclusive). Each step is
/// produced by linearly interpolating the bracketing pair of input points;
/// the search cursor only ever advances, so the input is scanned once.
/// Steps that coincide with or fall outside an endpoint use that endpoint
/// directly (clamping, never extrapolation).
///
/// Inputs with fewer than 2 points, a missing timestamp on either endpoint,
/// or a non-positive interval are returned unchanged.
pub fn resample_uniform(points: &[TrackPoint], interval_secs: f64) -> Vec<TrackPoint> {
    if points.len() < 2 || interval_secs <= 0.0 {
        return points.to_vec();
    }
    let (Some(start), Some(end)) = (points[0].time, points[points.len() - 1].time) else {
        return points.to_vec();
    };

    let step = Duration::seconds_f64(interval_secs);
    let mut out = Vec::new();
    let mut t = start;
    let mut cursor = 0usize;

    while t <= end {
        // Advance to the segment whose end is the first point past `t`.
        while cursor < points.len() - 2 && points[cursor + 1].time.is_some_and(|pt| pt <= t) {
            cursor += 1;
        }
        let p1 = &points[cursor];
        let p2 = &points[(cursor + 1).min(points.len() - 1)];
        out.push(sample_between(p1, p2, t));
        t += step;
    }

    out
}

/// Point at time `t` on the segment `p1`..`p2`: clamped to an endpoint when
/// `t` lies outside the segment, linearly interpolated otherwise. A
/// degenerate segment (equal timestamps) yields `p1`.
fn sample_between(p1: &TrackPoint, p2: &TrackPoint, t: OffsetDateTime) -> TrackPoint {
    let (Some(t1), Some(t2)) = (p1.time, p2.time) else {
        return p1.at_time(t);
    };
    if t <= t1 {
        return *p1;
    }
    if t >= t2 {
        return *p2;
    }
    if t2 == t1 {
        return *p1;
    }

    let frac = (t - t1).as_seconds_f64() / (t2 - t1).as_seconds_f64();
    let mut sampled = TrackPoint::new(
        p1.latitude + frac * (p2.latitude - p1.latitude),
        p1.longitude + frac * (p2.longitude - p1.longitude),
    );
    // Elevation is interpolated only when both endpoints carry it.
    if let (Some(e1), Some(e2)) = (p1.elevation, p2.elevation) {
        sampled.elevation = Some(e1 + frac * (e2 - e1));
    }
    sampled.time = Some(t);
    sampled
}
