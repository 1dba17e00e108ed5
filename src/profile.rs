//! Motion profiles and the resolved pipeline configuration.
//!
//! A [`MotionProfile`] is a named bundle of default thresholds tuned for a
//! mode of travel. Resolution happens exactly once per invocation: profile
//! defaults plus explicit [`ProfileOverrides`] produce an immutable
//! [`PipelineConfig`] that is passed by reference into every stage. No
//! stage reads ambient global settings.

use std::fmt;
use std::str::FromStr;

use gpx::GpxVersion;

/// Named motion profile selecting default speed/distance thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionProfile {
    #[default]
    Car,
    Bike,
    Walk,
}

impl MotionProfile {
    /// Maximum plausible instantaneous speed in m/s; faster implied speeds
    /// are treated as GPS spikes and dropped.
    pub fn max_speed(&self) -> f64 {
        match self {
            Self::Car => 45.0,
            Self::Bike => 20.0,
            Self::Walk => 3.0,
        }
    }

    /// Minimum spacing in meters between kept points during cleaning.
    pub fn min_point_distance(&self) -> f64 {
        match self {
            Self::Car => 2.0,
            Self::Bike => 1.0,
            Self::Walk => 0.5,
        }
    }

    /// Assumed constant travel speed in m/s for synthetic timestamp
    /// generation (car 50 km/h, bike 20 km/h, walk 5 km/h).
    pub fn assumed_avg_speed(&self) -> f64 {
        match self {
            Self::Car => 13.9,
            Self::Bike => 5.6,
            Self::Walk => 1.4,
        }
    }
}

impl fmt::Display for MotionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Car => "car",
            Self::Bike => "bike",
            Self::Walk => "walk",
        };
        f.write_str(name)
    }
}

impl FromStr for MotionProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "car" => Ok(Self::Car),
            "bike" => Ok(Self::Bike),
            "walk" => Ok(Self::Walk),
            other => Err(format!("unknown profile '{other}' (expected car, bike or walk)")),
        }
    }
}

/// Fully resolved, immutable configuration for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Profile the defaults were taken from (kept for reporting).
    pub profile: MotionProfile,
    /// Spike filter: implied speeds strictly above this are dropped (m/s).
    pub max_speed: f64,
    /// Near-duplicate filter: spacings strictly below this are dropped (m).
    pub min_point_distance: f64,
    /// Assumed travel speed for synthetic timestamps (m/s).
    pub assumed_avg_speed: f64,
    /// Fixed time grid for resampling (seconds).
    pub resample_interval: f64,
    /// Douglas-Peucker tolerance in meters; 0 disables simplification.
    pub simplify_tolerance: f64,
    /// Decimal digits to keep on lat/lon; `None` leaves coordinates as-is.
    pub coordinate_precision: Option<u32>,
    /// Remove elevation from output points.
    pub drop_elevation: bool,
    /// The output never contains `<extensions>` blocks; the document model
    /// does not carry them. `false` requests preservation, which is not
    /// supported and only produces a warning.
    pub strip_extensions: bool,
    /// Omit document-level metadata (time, author, link, description,
    /// bounds) from the output. The track name is always preserved.
    pub drop_metadata: bool,
    /// Re-sample onto the fixed time grid; disable to keep the cleaned
    /// track's original cadence.
    pub resample: bool,
    /// Generate timestamps for tracks that have none.
    pub synthesize_timestamps: bool,
    /// GPX version of the output document.
    pub output_version: GpxVersion,
}

impl PipelineConfig {
    /// Resolve a profile's defaults, then apply explicit overrides on top.
    /// An explicit value always wins over the profile default.
    pub fn resolve(profile: MotionProfile, overrides: &ProfileOverrides) -> Self {
        Self {
            profile,
            max_speed: overrides.max_speed.unwrap_or_else(|| profile.max_speed()),
            min_point_distance: overrides
                .min_point_distance
                .unwrap_or_else(|| profile.min_point_distance()),
            assumed_avg_speed: overrides
                .assumed_avg_speed
                .unwrap_or_else(|| profile.assumed_avg_speed()),
            resample_interval: overrides.resample_interval.unwrap_or(1.5),
            simplify_tolerance: overrides.simplify_tolerance.unwrap_or(0.2),
            coordinate_precision: overrides.coordinate_precision.unwrap_or(Some(7)),
            drop_elevation: overrides.drop_elevation.unwrap_or(true),
            strip_extensions: overrides.strip_extensions.unwrap_or(true),
            drop_metadata: overrides.drop_metadata.unwrap_or(true),
            resample: overrides.resample.unwrap_or(true),
            synthesize_timestamps: overrides.synthesize_timestamps.unwrap_or(true),
            output_version: overrides.output_version.unwrap_or(GpxVersion::Gpx11),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::resolve(MotionProfile::default(), &ProfileOverrides::default())
    }
}

/// Explicit user-supplied settings. `None` means "use the profile default";
/// `Some` is preserved verbatim, including keep-* style negations
/// (`Some(false)` on a boolean the profile defaults to `true`).
#[derive(Debug, Clone, Default)]
pub struct ProfileOverrides {
    pub max_speed: Option<f64>,
    pub min_point_distance: Option<f64>,
    pub assumed_avg_speed: Option<f64>,
    pub resample_interval: Option<f64>,
    pub simplify_tolerance: Option<f64>,
    /// Outer `None` = default; `Some(None)` = explicitly disable rounding.
    pub coordinate_precision: Option<Option<u32>>,
    pub drop_elevation: Option<bool>,
    pub strip_extensions: Option<bool>,
    pub drop_metadata: Option<bool>,
    pub resample: Option<bool>,
    pub synthesize_timestamps: Option<bool>,
    pub output_version: Option<GpxVersion>,
}
