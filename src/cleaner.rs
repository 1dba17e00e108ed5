//! Point cleaning: coordinate validation, timestamp monotonicity,
//! near-duplicate removal and speed-spike rejection.
//!
//! This is the first pipeline stage and the only one allowed to reorder
//! points (a single sort by timestamp). Spike points are permanently
//! discarded, never smoothed: track cleanliness wins over point-count
//! preservation.

use log::debug;
use time::OffsetDateTime;

use crate::error::{Result, TrackError};
use crate::geo_utils::haversine_distance;
use crate::profile::PipelineConfig;
use crate::timestamps::generate_timestamps;
use crate::TrackPoint;

/// Outcome of cleaning, including whether synthetic timestamps were used.
#[derive(Debug, Clone)]
pub struct CleanedTrack {
    /// Strictly time-ordered, speed-bounded points.
    pub points: Vec<TrackPoint>,
    /// True when the input carried no timestamps and the generator supplied
    /// them.
    pub timestamps_generated: bool,
}

/// Clean a raw point sequence according to `config`.
///
/// Steps, in order:
/// 1. Keep only points with valid coordinates.
/// 2. If no point has a timestamp: fail with
///    [`TrackError::NoTimestampedPoints`] unless synthetic generation is
///    enabled, in which case all points receive generated times at the
///    profile's assumed average speed.
/// 3. Otherwise drop the points that lack a timestamp.
/// 4. Sort by timestamp ascending.
/// 5. Drop any point whose timestamp is not strictly greater than the last
///    kept one.
/// 6. Walk the remainder keeping the first point; drop a point when its
///    distance from the last kept point is below `min_point_distance` or
///    its implied speed exceeds `max_speed`. Boundary policy is strict:
///    exact equality on either threshold keeps the point.
pub fn clean_points(points: &[TrackPoint], config: &PipelineConfig) -> Result<CleanedTrack> {
    let valid: Vec<TrackPoint> = points.iter().filter(|p| p.is_valid()).copied().collect();

    let has_timestamps = valid.iter().any(|p| p.time.is_some());

    let mut timestamps_generated = false;
    let mut timed: Vec<TrackPoint> = if has_timestamps {
        valid.into_iter().filter(|p| p.time.is_some()).collect()
    } else if config.synthesize_timestamps {
        if valid.is_empty() {
            return Err(TrackError::NoTimestampedPoints);
        }
        timestamps_generated = true;
        generate_timestamps(&valid, config.assumed_avg_speed, None)?
    } else {
        return Err(TrackError::NoTimestampedPoints);
    };

    if timed.is_empty() {
        return Err(TrackError::NoTimestampedPoints);
    }

    timed.sort_by_key(|p| p.time);

    // Strict monotonicity: drop duplicates and rewinds against the last
    // kept timestamp.
    let mut monotonic: Vec<TrackPoint> = Vec::with_capacity(timed.len());
    let mut last_time: Option<OffsetDateTime> = None;
    for point in timed {
        let Some(t) = point.time else { continue };
        if let Some(last) = last_time {
            if t <= last {
                continue;
            }
        }
        monotonic.push(point);
        last_time = Some(t);
    }

    // Spacing and speed filtering against the last *kept* point.
    let mut kept: Vec<TrackPoint> = Vec::with_capacity(monotonic.len());
    let mut dropped_close = 0usize;
    let mut dropped_spikes = 0usize;
    for point in monotonic {
        let Some(last) = kept.last() else {
            kept.push(point);
            continue;
        };
        let (Some(t), Some(last_t)) = (point.time, last.time) else {
            continue;
        };
        let elapsed = (t - last_t).as_seconds_f64();
        if elapsed <= 0.0 {
            continue;
        }
        let dist = haversine_distance(last, &point);
        if dist < config.min_point_distance {
            dropped_close += 1;
            continue;
        }
        if dist / elapsed > config.max_speed {
            dropped_spikes += 1;
            continue;
        }
        kept.push(point);
    }

    if kept.is_empty() {
        return Err(TrackError::NoTimestampedPoints);
    }

    debug!(
        "cleaned {} -> {} points ({} near-duplicates, {} speed spikes dropped)",
        points.len(),
        kept.len(),
        dropped_close,
        dropped_spikes
    );

    Ok(CleanedTrack {
        points: kept,
        timestamps_generated,
    })
}
