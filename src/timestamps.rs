//! Synthetic timestamps for untimed tracks, and duration-based re-timing.
//!
//! Both operations only look at geometry: the generator walks the point
//! sequence, converts each segment's Haversine length into a time delta at
//! an assumed constant speed, and advances a running clock. Zero-length
//! segments therefore produce duplicate timestamps; removing those is the
//! point cleaner's strict-monotonicity pass, not this module.

use log::debug;
use time::{Duration, OffsetDateTime};

use crate::error::{Result, TrackError};
use crate::geo_utils::{haversine_distance, path_length};
use crate::TrackPoint;

/// Minimum replay speed floor for duration re-timing: 6 km/h in m/s.
pub const MIN_REPLAY_SPEED: f64 = 6.0 * 1000.0 / 3600.0;

/// Assign monotonically non-decreasing timestamps to a point sequence,
/// assuming constant travel at `avg_speed` m/s.
///
/// The first point receives `start` (current UTC time when `None`). Each
/// subsequent point advances the clock by `distance / avg_speed` seconds.
/// A non-positive `avg_speed` degrades to one second per segment rather
/// than dividing by zero.
///
/// Returns [`TrackError::NoCoordinatePoints`] for an empty input.
pub fn generate_timestamps(
    points: &[TrackPoint],
    avg_speed: f64,
    start: Option<OffsetDateTime>,
) -> Result<Vec<TrackPoint>> {
    if points.is_empty() {
        return Err(TrackError::NoCoordinatePoints);
    }

    let start = start.unwrap_or_else(OffsetDateTime::now_utc);
    let mut clock = start;
    let mut out = Vec::with_capacity(points.len());
    out.push(points[0].at_time(clock));

    for pair in points.windows(2) {
        let dist = haversine_distance(&pair[0], &pair[1]);
        let delta_secs = if avg_speed > 0.0 { dist / avg_speed } else { 1.0 };
        clock += Duration::seconds_f64(delta_secs);
        out.push(pair[1].at_time(clock));
    }

    debug!(
        "generated timestamps for {} points at {:.1} m/s ({:.0}s total)",
        out.len(),
        avg_speed,
        (clock - start).as_seconds_f64()
    );

    Ok(out)
}

/// Outcome of a duration-based re-timing, for caller display.
#[derive(Debug, Clone, Copy)]
pub struct RetimeSummary {
    /// Speed actually used for the new timestamps, in m/s.
    pub target_speed: f64,
    /// The same speed in km/h.
    pub realized_speed_kmh: f64,
    /// Total Haversine path length in meters.
    pub total_distance: f64,
    /// Elapsed time of the re-timed track in seconds.
    pub realized_duration_secs: f64,
}

/// Recompute a track's timestamps so its total elapsed time matches
/// `duration_minutes`, subject to the [`MIN_REPLAY_SPEED`] floor.
///
/// Only geometry is used; any original timestamps are discarded. When the
/// requested duration would imply a pace below the floor, the floor wins
/// and the realized duration comes out shorter than requested: duration is
/// a target, not a guarantee.
///
/// Returns [`TrackError::EmptyGeometry`] for fewer than 2 points and
/// [`TrackError::InvalidDuration`] for a non-positive or non-finite target.
pub fn retime_for_duration(
    points: &[TrackPoint],
    duration_minutes: f64,
    start: Option<OffsetDateTime>,
) -> Result<(Vec<TrackPoint>, RetimeSummary)> {
    if points.len() < 2 {
        return Err(TrackError::EmptyGeometry {
            point_count: points.len(),
        });
    }
    if !duration_minutes.is_finite() || duration_minutes <= 0.0 {
        return Err(TrackError::InvalidDuration {
            minutes: duration_minutes,
        });
    }

    let total_distance = path_length(points);
    let requested_speed = total_distance / (duration_minutes * 60.0);
    let target_speed = requested_speed.max(MIN_REPLAY_SPEED);

    let retimed = generate_timestamps(points, target_speed, start)?;

    let summary = RetimeSummary {
        target_speed,
        realized_speed_kmh: target_speed * 3.6,
        total_distance,
        realized_duration_secs: total_distance / target_speed,
    };

    debug!(
        "re-timed {} points: {:.0}m at {:.1} km/h over {:.0}s",
        retimed.len(),
        summary.total_distance,
        summary.realized_speed_kmh,
        summary.realized_duration_secs
    );

    Ok((retimed, summary))
}
