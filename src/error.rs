//! Unified error handling for the track normalization pipeline.
//!
//! Every pipeline stage reports failures through [`TrackError`] so that
//! batch callers can pattern-match outcomes (skip vs. error) instead of
//! string-matching messages. None of these failures are transient, so no
//! stage retries internally.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the track normalization pipeline.
#[derive(Error, Debug)]
pub enum TrackError {
    /// The input has no timestamped points and synthetic timestamp
    /// generation is disabled. Recoverable only by enabling generation or
    /// supplying different input.
    #[error("no timestamped track points found (enable synthetic timestamps to process untimed tracks)")]
    NoTimestampedPoints,

    /// The synthetic timestamp generator was given a track with no usable
    /// geometry.
    #[error("track contains no points with valid coordinates")]
    NoCoordinatePoints,

    /// The duration re-timer needs at least two points to compute a path
    /// length.
    #[error("track has {point_count} point(s); at least 2 are required to compute a route distance")]
    EmptyGeometry { point_count: usize },

    /// The duration re-timer was given a non-positive or non-finite target.
    #[error("invalid target duration of {minutes} minute(s); must be a positive number")]
    InvalidDuration { minutes: f64 },

    /// Malformed input document. Propagated as-is; no partial recovery of a
    /// corrupt file is attempted.
    #[error("failed to parse GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),

    /// File could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TrackError {
    /// Attach a file path to a raw I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures a batch driver should report as "skipped" rather
    /// than as an error: the file is well-formed but has nothing we can
    /// replay without synthetic timestamps.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::NoTimestampedPoints)
    }
}

/// Result type alias using [`TrackError`].
pub type Result<T> = std::result::Result<T, TrackError>;
