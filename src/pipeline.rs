//! File-level pipeline: GPX in, normalized GPX out.
//!
//! The stages form a strict sequential chain (clean → resample → simplify →
//! quantize) and each run owns its working copy of the points, so a single
//! file is always processed synchronously. Batch callers may process
//! independent files in parallel; nothing here shares mutable state across
//! invocations.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use geo_types::Point;
use gpx::{Gpx, Track, TrackSegment, Waypoint};
use log::{debug, info, warn};
use time::OffsetDateTime;

use crate::cleaner::clean_points;
use crate::error::{Result, TrackError};
use crate::profile::PipelineConfig;
use crate::quantize::round_coordinates;
use crate::resample::resample_uniform;
use crate::simplify::simplify_points;
use crate::timestamps::{retime_for_duration, RetimeSummary};
use crate::TrackPoint;

/// Per-file processing report, derived and returned to the caller; never
/// persisted.
#[derive(Debug, Clone, Copy)]
pub struct ProcessingSummary {
    /// Points in the output track.
    pub point_count: usize,
    /// Serialized output size in bytes.
    pub output_size_bytes: usize,
    /// Size reduction versus the input file, in percent.
    pub reduction_percent: f64,
    /// True when the input had no timestamps and synthetic ones were
    /// generated.
    pub timestamps_generated: bool,
}

impl ProcessingSummary {
    /// Output size in kilobytes, for display.
    pub fn output_size_kb(&self) -> f64 {
        self.output_size_bytes as f64 / 1024.0
    }
}

/// Flatten every track and segment of a document into one ordered point
/// sequence. Multi-track/multi-segment inputs become a single continuous
/// path; order within the document is preserved.
pub fn collect_track_points(gpx: &Gpx) -> Vec<TrackPoint> {
    let mut points = Vec::new();
    for track in &gpx.tracks {
        for segment in &track.segments {
            for wpt in &segment.points {
                let mut point = TrackPoint::new(wpt.point().y(), wpt.point().x());
                point.elevation = wpt.elevation;
                point.time = wpt.time.map(OffsetDateTime::from);
                points.push(point);
            }
        }
    }
    points
}

/// Run the in-memory normalization chain over a raw point sequence.
///
/// Cleaning always runs; resampling and simplification are governed by the
/// configuration; quantization runs last so rounded coordinates are what
/// the output serializes.
pub fn normalize_points(
    points: &[TrackPoint],
    config: &PipelineConfig,
) -> Result<(Vec<TrackPoint>, bool)> {
    let cleaned = clean_points(points, config)?;

    let mut pts = cleaned.points;
    if config.resample {
        pts = resample_uniform(&pts, config.resample_interval);
    }
    if config.simplify_tolerance > 0.0 {
        pts = simplify_points(&pts, config.simplify_tolerance);
    }
    pts = round_coordinates(&pts, config.coordinate_precision, config.drop_elevation);

    Ok((pts, cleaned.timestamps_generated))
}

/// Build the output document: one track with one segment, the selected GPX
/// version, and metadata reduced according to the configuration. The track
/// name of the first input track survives even with metadata stripping.
/// `<extensions>` blocks are never written regardless of configuration.
pub fn build_output_gpx(
    points: &[TrackPoint],
    source: &Gpx,
    config: &PipelineConfig,
) -> Gpx {
    if !config.strip_extensions {
        warn!("<extensions> blocks cannot be preserved; the output will not contain them");
    }

    let mut segment = TrackSegment::new();
    segment.points = points.iter().map(to_waypoint).collect();

    let mut track = Track::new();
    track.name = source.tracks.first().and_then(|t| t.name.clone());
    track.segments.push(segment);

    let mut out = Gpx {
        version: config.output_version,
        creator: Some(env!("CARGO_PKG_NAME").to_string()),
        ..Gpx::default()
    };
    if !config.drop_metadata {
        out.metadata = source.metadata.clone();
    }
    out.tracks.push(track);
    out
}

fn to_waypoint(point: &TrackPoint) -> Waypoint {
    let mut wpt = Waypoint::new(Point::new(point.longitude, point.latitude));
    wpt.elevation = point.elevation;
    wpt.time = point.time.map(Into::into);
    wpt
}

/// Process a single GPX file end to end and write the normalized result.
///
/// The input file is never mutated. Failures propagate without retry; none
/// of them are transient.
pub fn process_file(
    input: &Path,
    output: &Path,
    config: &PipelineConfig,
) -> Result<ProcessingSummary> {
    let input_size = fs::metadata(input)
        .map_err(|e| TrackError::io(input, e))?
        .len() as usize;

    let gpx = read_gpx(input)?;
    let raw_points = collect_track_points(&gpx);
    debug!("{}: {} raw points", input.display(), raw_points.len());

    let (normalized, timestamps_generated) = normalize_points(&raw_points, config)?;
    let out_gpx = build_output_gpx(&normalized, &gpx, config);

    let mut buffer = Vec::new();
    gpx::write(&out_gpx, &mut buffer)?;
    fs::write(output, &buffer).map_err(|e| TrackError::io(output, e))?;

    let summary = ProcessingSummary {
        point_count: normalized.len(),
        output_size_bytes: buffer.len(),
        reduction_percent: reduction_percent(input_size, buffer.len()),
        timestamps_generated,
    };

    info!(
        "{}: {} points, {:.1} KB, -{:.1}%",
        output.display(),
        summary.point_count,
        summary.output_size_kb(),
        summary.reduction_percent
    );

    Ok(summary)
}

/// Re-time a route file to a target total duration and write the result.
///
/// The route's geometry is taken as-is (coordinates are assumed already
/// normalized); only timestamps are recomputed, at a speed derived from the
/// path length and clamped to the minimum replay speed.
pub fn retime_file(
    input: &Path,
    output: &Path,
    duration_minutes: f64,
    config: &PipelineConfig,
) -> Result<(RetimeSummary, ProcessingSummary)> {
    let input_size = fs::metadata(input)
        .map_err(|e| TrackError::io(input, e))?
        .len() as usize;

    let gpx = read_gpx(input)?;
    let points: Vec<TrackPoint> = collect_track_points(&gpx)
        .into_iter()
        .filter(|p| p.is_valid())
        .collect();

    let (retimed, retime) = retime_for_duration(&points, duration_minutes, None)?;
    let out_gpx = build_output_gpx(&retimed, &gpx, config);

    let mut buffer = Vec::new();
    gpx::write(&out_gpx, &mut buffer)?;
    fs::write(output, &buffer).map_err(|e| TrackError::io(output, e))?;

    let summary = ProcessingSummary {
        point_count: retimed.len(),
        output_size_bytes: buffer.len(),
        reduction_percent: reduction_percent(input_size, buffer.len()),
        timestamps_generated: true,
    };

    info!(
        "{}: {} points re-timed to {:.1} km/h",
        output.display(),
        summary.point_count,
        retime.realized_speed_kmh
    );

    Ok((retime, summary))
}

fn read_gpx(path: &Path) -> Result<Gpx> {
    let file = File::open(path).map_err(|e| TrackError::io(path, e))?;
    let gpx = gpx::read(BufReader::new(file))?;
    Ok(gpx)
}

fn reduction_percent(input_size: usize, output_size: usize) -> f64 {
    if input_size == 0 {
        return 0.0;
    }
    (input_size as f64 - output_size as f64) / input_size as f64 * 100.0
}
