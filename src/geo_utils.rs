//! Geographic utilities: great-circle distance, path length and
//! point-to-segment deviation.
//!
//! All distances are in meters. Inputs are not validated; NaN coordinates
//! propagate to the result (callers filter invalid points first).

use crate::TrackPoint;

/// Mean Earth radius in meters used for all great-circle math.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points using the Haversine formula.
pub fn haversine_distance(p1: &TrackPoint, p2: &TrackPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = (p2.latitude - p1.latitude).to_radians();
    let dlon = (p2.longitude - p1.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// Total length of a point sequence: sum of Haversine distances over
/// adjacent pairs. Zero for fewer than 2 points.
pub fn path_length(points: &[TrackPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Perpendicular distance in meters from `point` to the segment
/// `start`..`end`.
///
/// Works in a local equirectangular projection centered on `start`, which is
/// accurate to well under a percent at the segment lengths seen in GPS
/// tracks. The projection parameter is clamped to [0, 1], so points beyond
/// either endpoint measure their distance to that endpoint.
pub fn point_segment_deviation(point: &TrackPoint, start: &TrackPoint, end: &TrackPoint) -> f64 {
    let origin_lat = start.latitude.to_radians();
    let meters_per_deg_lat = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
    let meters_per_deg_lon = meters_per_deg_lat * origin_lat.cos();

    // Local planar coordinates relative to the segment start.
    let ex = (end.longitude - start.longitude) * meters_per_deg_lon;
    let ey = (end.latitude - start.latitude) * meters_per_deg_lat;
    let px = (point.longitude - start.longitude) * meters_per_deg_lon;
    let py = (point.latitude - start.latitude) * meters_per_deg_lat;

    let segment_length_sq = ex * ex + ey * ey;
    if segment_length_sq == 0.0 {
        return (px * px + py * py).sqrt();
    }

    let t = ((px * ex + py * ey) / segment_length_sq).clamp(0.0, 1.0);
    let dx = px - t * ex;
    let dy = py - t * ey;
    (dx * dx + dy * dy).sqrt()
}
