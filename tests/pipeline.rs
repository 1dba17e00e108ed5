//! End-to-end tests for the file pipeline: GPX in, normalized GPX out.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use tracktidy::{
    collect_track_points, normalize_points, process_file, retime_file, MotionProfile,
    PipelineConfig, ProfileOverrides, TrackError, TrackPoint,
};

const METERS_PER_DEG_LAT: f64 = 111_194.9266;
const START: OffsetDateTime = datetime!(2024-06-01 10:00:00 UTC);

/// Fresh scratch directory for one test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tracktidy_{}_{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn to_waypoint(point: &TrackPoint) -> Waypoint {
    let mut wpt = Waypoint::new(Point::new(point.longitude, point.latitude));
    wpt.elevation = point.elevation;
    wpt.time = point.time.map(Into::into);
    wpt
}

fn make_gpx(points: &[TrackPoint]) -> Gpx {
    let mut segment = TrackSegment::new();
    segment.points = points.iter().map(to_waypoint).collect();
    let mut track = Track::new();
    track.name = Some("Morning ride".to_string());
    track.segments.push(segment);

    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some("test-fixture".to_string()),
        ..Gpx::default()
    };
    gpx.tracks.push(track);
    gpx
}

fn write_gpx(gpx: &Gpx, path: &PathBuf) {
    let file = File::create(path).unwrap();
    gpx::write(gpx, file).unwrap();
}

fn read_gpx(path: &PathBuf) -> Gpx {
    gpx::read(BufReader::new(File::open(path).unwrap())).unwrap()
}

/// Wobbly northbound track: 100m steps with a 30m east-west zigzag so
/// simplification keeps interior points.
fn zigzag_track(count: usize, timed: bool) -> Vec<TrackPoint> {
    (0..count)
        .map(|i| {
            let north = i as f64 * 100.0 / METERS_PER_DEG_LAT;
            let east = (i % 2) as f64 * 30.0 / METERS_PER_DEG_LAT;
            let mut p = TrackPoint::with_elevation(north, east, 100.0 + i as f64);
            if timed {
                p.time = Some(START + Duration::seconds(10 * i as i64));
            }
            p
        })
        .collect()
}

#[test]
fn test_collect_flattens_tracks_and_segments() {
    let points = zigzag_track(6, true);
    let mut gpx = make_gpx(&points[..3]);

    // Second segment on the first track plus a whole second track
    let mut extra_segment = TrackSegment::new();
    extra_segment.points = points[3..4].iter().map(to_waypoint).collect();
    gpx.tracks[0].segments.push(extra_segment);

    let mut second_track = Track::new();
    let mut seg = TrackSegment::new();
    seg.points = points[4..].iter().map(to_waypoint).collect();
    second_track.segments.push(seg);
    gpx.tracks.push(second_track);

    let collected = collect_track_points(&gpx);
    assert_eq!(collected.len(), 6);
    for (orig, got) in points.iter().zip(collected.iter()) {
        assert!((orig.latitude - got.latitude).abs() < 1e-12);
        assert_eq!(orig.elevation, got.elevation);
        assert_eq!(orig.time, got.time);
    }
}

#[test]
fn test_normalize_points_produces_monotonic_output() {
    let config = PipelineConfig::default();
    let (normalized, generated) = normalize_points(&zigzag_track(10, true), &config).unwrap();

    assert!(!generated);
    assert!(normalized.len() >= 2);
    for pair in normalized.windows(2) {
        assert!(pair[1].time.unwrap() > pair[0].time.unwrap());
    }
    // Default profile drops elevation
    assert!(normalized.iter().all(|p| p.elevation.is_none()));
}

#[test]
fn test_process_file_end_to_end() {
    let dir = scratch_dir("process");
    let input = dir.join("ride.gpx");
    let output = dir.join("ride_fix.gpx");
    write_gpx(&make_gpx(&zigzag_track(20, true)), &input);

    let config = PipelineConfig::default();
    let summary = process_file(&input, &output, &config).unwrap();

    let out = read_gpx(&output);
    assert_eq!(out.version, GpxVersion::Gpx11);
    assert!(out.metadata.is_none());
    assert_eq!(out.tracks.len(), 1);
    assert_eq!(out.tracks[0].segments.len(), 1);
    assert_eq!(out.tracks[0].name.as_deref(), Some("Morning ride"));

    let out_points = collect_track_points(&out);
    assert_eq!(out_points.len(), summary.point_count);
    assert!(!summary.timestamps_generated);
    assert!(summary.output_size_bytes > 0);

    // Every output point is timestamped and strictly ordered
    for pair in out_points.windows(2) {
        assert!(pair[1].time.unwrap() > pair[0].time.unwrap());
    }
    // Elevation dropped by the default profile
    assert!(out_points.iter().all(|p| p.elevation.is_none()));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_process_file_generates_timestamps_for_untimed_input() {
    let dir = scratch_dir("untimed");
    let input = dir.join("route.gpx");
    let output = dir.join("route_fix.gpx");
    write_gpx(&make_gpx(&zigzag_track(10, false)), &input);

    let summary = process_file(&input, &output, &PipelineConfig::default()).unwrap();
    assert!(summary.timestamps_generated);

    let out_points = collect_track_points(&read_gpx(&output));
    assert!(out_points.iter().all(|p| p.time.is_some()));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_process_file_skips_untimed_when_generation_disabled() {
    let dir = scratch_dir("skip");
    let input = dir.join("route.gpx");
    let output = dir.join("route_fix.gpx");
    write_gpx(&make_gpx(&zigzag_track(10, false)), &input);

    let overrides = ProfileOverrides {
        synthesize_timestamps: Some(false),
        ..Default::default()
    };
    let config = PipelineConfig::resolve(MotionProfile::Car, &overrides);
    let err = process_file(&input, &output, &config).unwrap_err();
    assert!(matches!(&err, TrackError::NoTimestampedPoints));
    assert!(err.is_skippable());
    assert!(!output.exists());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_process_file_missing_input() {
    let dir = scratch_dir("missing");
    let result = process_file(
        &dir.join("nope.gpx"),
        &dir.join("out.gpx"),
        &PipelineConfig::default(),
    );
    assert!(matches!(result, Err(TrackError::Io { .. })));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_process_file_malformed_input() {
    let dir = scratch_dir("malformed");
    let input = dir.join("broken.gpx");
    fs::write(&input, "this is not xml at all").unwrap();

    let result = process_file(&input, &dir.join("out.gpx"), &PipelineConfig::default());
    assert!(matches!(result, Err(TrackError::Gpx(_))));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_metadata_kept_when_requested() {
    let dir = scratch_dir("metadata");
    let input = dir.join("ride.gpx");
    let output = dir.join("ride_fix.gpx");

    let mut gpx = make_gpx(&zigzag_track(10, true));
    gpx.metadata = Some(gpx::Metadata {
        name: Some("Collection".to_string()),
        ..Default::default()
    });
    write_gpx(&gpx, &input);

    let overrides = ProfileOverrides {
        drop_metadata: Some(false),
        ..Default::default()
    };
    let config = PipelineConfig::resolve(MotionProfile::Car, &overrides);
    process_file(&input, &output, &config).unwrap();

    let out = read_gpx(&output);
    assert_eq!(
        out.metadata.as_ref().and_then(|m| m.name.as_deref()),
        Some("Collection")
    );

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_gpx_10_output() {
    let dir = scratch_dir("gpx10");
    let input = dir.join("ride.gpx");
    let output = dir.join("ride_fix.gpx");
    write_gpx(&make_gpx(&zigzag_track(10, true)), &input);

    let overrides = ProfileOverrides {
        output_version: Some(GpxVersion::Gpx10),
        ..Default::default()
    };
    let config = PipelineConfig::resolve(MotionProfile::Car, &overrides);
    process_file(&input, &output, &config).unwrap();

    assert_eq!(read_gpx(&output).version, GpxVersion::Gpx10);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_extensions_never_survive_processing() {
    // Extension preservation is not supported by the document model: even
    // with stripping disabled, the output carries no <extensions> blocks.
    let dir = scratch_dir("extensions");
    let input = dir.join("ride.gpx");
    let output = dir.join("ride_fix.gpx");

    let trkpts: String = (0..5)
        .map(|i| {
            format!(
                "<trkpt lat=\"{:.9}\" lon=\"0.0\">\
                 <time>2024-06-01T10:00:{:02}Z</time>\
                 <extensions><speed>10.0</speed></extensions>\
                 </trkpt>",
                i as f64 * 100.0 / METERS_PER_DEG_LAT,
                i * 10
            )
        })
        .collect();
    let doc = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <gpx version=\"1.1\" creator=\"test-fixture\" \
         xmlns=\"http://www.topografix.com/GPX/1/1\">\
         <trk><name>Ext</name><trkseg>{trkpts}</trkseg></trk></gpx>"
    );
    fs::write(&input, doc).unwrap();

    let overrides = ProfileOverrides {
        strip_extensions: Some(false),
        ..Default::default()
    };
    let config = PipelineConfig::resolve(MotionProfile::Car, &overrides);
    let summary = process_file(&input, &output, &config).unwrap();
    assert!(summary.point_count >= 2);

    let written = fs::read_to_string(&output).unwrap();
    assert!(!written.contains("<extensions"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_retime_file_end_to_end() {
    let dir = scratch_dir("retime");
    let input = dir.join("route.gpx");
    let output = dir.join("route_10min.gpx");

    // 2km of geometry re-timed to 10 minutes: 12 km/h, above the floor
    let points: Vec<TrackPoint> = (0..5)
        .map(|i| TrackPoint::new(i as f64 * 500.0 / METERS_PER_DEG_LAT, 0.0))
        .collect();
    write_gpx(&make_gpx(&points), &input);

    let (retime, summary) = retime_file(&input, &output, 10.0, &PipelineConfig::default()).unwrap();
    assert!((retime.realized_speed_kmh - 12.0).abs() < 0.1);
    assert_eq!(summary.point_count, 5);

    let out_points = collect_track_points(&read_gpx(&output));
    let elapsed = (out_points.last().unwrap().time.unwrap()
        - out_points[0].time.unwrap())
    .as_seconds_f64();
    assert!((elapsed - 600.0).abs() < 1.0);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_retime_file_rejects_single_point() {
    let dir = scratch_dir("retime_single");
    let input = dir.join("route.gpx");
    write_gpx(&make_gpx(&[TrackPoint::new(1.0, 1.0)]), &input);

    let result = retime_file(
        &input,
        &dir.join("out.gpx"),
        10.0,
        &PipelineConfig::default(),
    );
    assert!(matches!(
        result,
        Err(TrackError::EmptyGeometry { point_count: 1 })
    ));

    fs::remove_dir_all(&dir).ok();
}
