//! Tests for the uniform time resampler.

use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use tracktidy::{resample_uniform, TrackPoint};

const METERS_PER_DEG_LAT: f64 = 111_194.9266;
const START: OffsetDateTime = datetime!(2024-06-01 10:00:00 UTC);

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn point_at(meters: f64, secs: f64) -> TrackPoint {
    TrackPoint::new(meters / METERS_PER_DEG_LAT, 0.0)
        .at_time(START + Duration::seconds_f64(secs))
}

#[test]
fn test_two_points_resampled_to_eleven() {
    // 100m apart over 100s at 10s interval: 11 evenly spaced points with
    // linearly interpolated coordinates.
    let points = vec![point_at(0.0, 0.0), point_at(100.0, 100.0)];
    let resampled = resample_uniform(&points, 10.0);

    assert_eq!(resampled.len(), 11);
    for (i, p) in resampled.iter().enumerate() {
        let expected_time = START + Duration::seconds(10 * i as i64);
        assert_eq!(p.time.unwrap(), expected_time);
        let expected_lat = (i as f64 * 10.0) / METERS_PER_DEG_LAT;
        assert!(approx_eq(p.latitude, expected_lat, 1e-9));
    }
}

#[test]
fn test_span_preserved() {
    let points = vec![
        point_at(0.0, 0.0),
        point_at(50.0, 33.0),
        point_at(180.0, 100.0),
    ];
    let resampled = resample_uniform(&points, 15.0);

    // First output timestamp equals the input's first; the last is within
    // one interval of the input's last.
    assert_eq!(resampled[0].time, points[0].time);
    let last_in = points[2].time.unwrap();
    let last_out = resampled.last().unwrap().time.unwrap();
    assert!(last_out <= last_in);
    assert!((last_in - last_out).as_seconds_f64() < 15.0);
    // floor(100 / 15) + 1 grid steps
    assert_eq!(resampled.len(), 7);
}

#[test]
fn test_fewer_than_two_points_unchanged() {
    assert!(resample_uniform(&[], 10.0).is_empty());

    let single = vec![point_at(0.0, 0.0)];
    assert_eq!(resample_uniform(&single, 10.0), single);
}

#[test]
fn test_non_positive_interval_unchanged() {
    let points = vec![point_at(0.0, 0.0), point_at(100.0, 100.0)];
    assert_eq!(resample_uniform(&points, 0.0), points);
    assert_eq!(resample_uniform(&points, -1.5), points);
}

#[test]
fn test_elevation_interpolated_when_both_present() {
    let mut a = point_at(0.0, 0.0);
    a.elevation = Some(100.0);
    let mut b = point_at(100.0, 100.0);
    b.elevation = Some(200.0);

    let resampled = resample_uniform(&[a, b], 50.0);
    assert_eq!(resampled.len(), 3);
    assert!(approx_eq(resampled[1].elevation.unwrap(), 150.0, 1e-9));
}

#[test]
fn test_elevation_omitted_when_one_endpoint_lacks_it() {
    let mut a = point_at(0.0, 0.0);
    a.elevation = Some(100.0);
    let b = point_at(100.0, 100.0);

    let resampled = resample_uniform(&[a, b], 50.0);
    assert_eq!(resampled[1].elevation, None);
}

#[test]
fn test_grid_times_on_endpoints_are_clamped() {
    // Steps landing exactly on input points reuse those points, elevation
    // included.
    let mut a = point_at(0.0, 0.0);
    a.elevation = Some(7.0);
    let b = point_at(100.0, 100.0);
    let resampled = resample_uniform(&[a, b], 100.0);
    assert_eq!(resampled.len(), 2);
    assert_eq!(resampled[0], a);
    assert_eq!(resampled[1], b);
}

#[test]
fn test_degenerate_equal_timestamps() {
    // Both points at the same instant: the step lands on the first point,
    // no division by zero.
    let a = point_at(0.0, 0.0);
    let b = point_at(100.0, 0.0);
    let resampled = resample_uniform(&[a, b], 10.0);
    assert_eq!(resampled, vec![a]);
}

#[test]
fn test_cursor_advances_over_many_segments() {
    let points: Vec<TrackPoint> = (0..100)
        .map(|i| point_at(i as f64 * 10.0, i as f64 * 3.0))
        .collect();
    let resampled = resample_uniform(&points, 1.5);

    // 297s span at 1.5s: 199 grid steps
    assert_eq!(resampled.len(), 199);
    for pair in resampled.windows(2) {
        let dt = (pair[1].time.unwrap() - pair[0].time.unwrap()).as_seconds_f64();
        assert!(approx_eq(dt, 1.5, 1e-9));
        // Latitude grows monotonically along the track
        assert!(pair[1].latitude >= pair[0].latitude);
    }
}
