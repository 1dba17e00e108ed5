//! # tracktidy
//!
//! Track-normalization pipeline for noisy GPS logs: turns irregular,
//! possibly timestamp-less GPX tracks into monotonic, evenly time-sampled,
//! speed-bounded, simplified trajectories suitable for deterministic
//! playback by a location-simulation consumer.
//!
//! The pipeline stages, leaf to root:
//! - Haversine distance and segment deviation ([`geo_utils`])
//! - Synthetic timestamps and duration re-timing ([`timestamps`])
//! - Point cleaning: monotonic times, duplicate and spike removal
//!   ([`cleaner`])
//! - Uniform time resampling ([`resample`])
//! - Ramer-Douglas-Peucker simplification ([`simplify`])
//! - Coordinate quantization ([`quantize`])
//!
//! Each stage is a pure function over an owned point sequence; nothing
//! shares mutable state across a file's run, so batches of independent
//! files parallelize trivially (the CLI does this with rayon).
//!
//! ## Quick start
//!
//! ```
//! use tracktidy::{clean_points, resample_uniform, MotionProfile, PipelineConfig,
//!                 ProfileOverrides, TrackPoint};
//! use time::macros::datetime;
//!
//! let raw = vec![
//!     TrackPoint::new(51.5074, -0.1278).at_time(datetime!(2024-06-01 10:00:00 UTC)),
//!     TrackPoint::new(51.5080, -0.1290).at_time(datetime!(2024-06-01 10:00:30 UTC)),
//!     TrackPoint::new(51.5090, -0.1300).at_time(datetime!(2024-06-01 10:01:00 UTC)),
//! ];
//!
//! let config = PipelineConfig::resolve(MotionProfile::Bike, &ProfileOverrides::default());
//! let cleaned = clean_points(&raw, &config).unwrap();
//! let resampled = resample_uniform(&cleaned.points, config.resample_interval);
//! assert!(resampled.len() >= cleaned.points.len());
//! ```

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// Unified error handling
pub mod error;
pub use error::{Result, TrackError};

// Geographic utilities (distance, path length, segment deviation)
pub mod geo_utils;
pub use geo_utils::{haversine_distance, path_length, EARTH_RADIUS_M};

// Motion profiles and resolved configuration
pub mod profile;
pub use profile::{MotionProfile, PipelineConfig, ProfileOverrides};

// Synthetic timestamps and duration re-timing
pub mod timestamps;
pub use timestamps::{generate_timestamps, retime_for_duration, RetimeSummary, MIN_REPLAY_SPEED};

// Point cleaning (monotonicity, duplicates, speed spikes)
pub mod cleaner;
pub use cleaner::{clean_points, CleanedTrack};

// Uniform time resampling
pub mod resample;
pub use resample::resample_uniform;

// Polyline simplification (meters-tolerance RDP)
pub mod simplify;
pub use simplify::simplify_points;

// Coordinate quantization
pub mod quantize;
pub use quantize::round_coordinates;

// File-level pipeline (GPX read -> stages -> GPX write)
pub mod pipeline;
pub use pipeline::{
    build_output_gpx, collect_track_points, normalize_points, process_file, retime_file,
    ProcessingSummary,
};

// ============================================================================
// Core Types
// ============================================================================

/// A single GPS track point: coordinates, optional elevation and optional
/// timestamp.
///
/// After cleaning, every point in a track carries a timestamp and
/// timestamps are strictly increasing.
///
/// # Example
/// ```
/// use tracktidy::TrackPoint;
/// let point = TrackPoint::new(51.5074, -0.1278); // London
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters above sea level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    /// UTC timestamp of the fix.
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<OffsetDateTime>,
}

impl TrackPoint {
    /// Create a point without elevation or timestamp.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
            time: None,
        }
    }

    /// Create a point with elevation.
    pub fn with_elevation(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: Some(elevation),
            time: None,
        }
    }

    /// Copy of this point with its timestamp set to `time`.
    pub fn at_time(&self, time: OffsetDateTime) -> Self {
        Self {
            time: Some(time),
            ..*self
        }
    }

    /// Check that the coordinates are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}
