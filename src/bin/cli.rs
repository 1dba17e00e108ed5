//! tracktidy CLI - Normalize and shrink GPX tracks for replay
//!
//! Usage:
//!   tracktidy-cli fix <file-or-folder> [--profile car|bike|walk] [options]
//!   tracktidy-cli retime <file> --duration <minutes> [--output <file>]
//!
//! `fix` runs the full normalization pipeline (clean, resample, simplify,
//! quantize) over a single file or every .gpx file in a folder. A failure
//! on one file of a batch never aborts the rest; each file's outcome is
//! reported independently, with a final tally.

use clap::{Args, Parser, Subcommand};
use gpx::GpxVersion;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracktidy::{
    pipeline::{process_file, retime_file},
    MotionProfile, PipelineConfig, ProcessingSummary, ProfileOverrides, TrackError,
};

#[derive(Parser)]
#[command(name = "tracktidy-cli")]
#[command(about = "Normalize and shrink GPX tracks for smooth replay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean, resample, simplify and quantize GPX files
    Fix {
        /// Input GPX file, or a folder of .gpx files for batch mode
        input: PathBuf,

        /// Output file (single mode) or folder (batch mode).
        /// Defaults to <stem>_fix.gpx next to the input, or <folder>/fixed/
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: PipelineOptions,
    },

    /// Re-time a route so its total duration matches a target
    Retime {
        /// Input GPX file (geometry is used as-is)
        input: PathBuf,

        /// Target total duration in minutes
        #[arg(short, long)]
        duration: f64,

        /// Output file. Defaults to <stem>_<duration>min.gpx
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: PipelineOptions,
    },
}

/// Pipeline settings. Anything left unset falls back to the profile
/// defaults; explicit flags always win, including the keep-* negations.
#[derive(Args)]
struct PipelineOptions {
    /// Tuning preset
    #[arg(long, default_value = "car")]
    profile: MotionProfile,

    /// Resample interval in seconds
    #[arg(long)]
    interval: Option<f64>,

    /// Max speed in m/s to keep (spike filter)
    #[arg(long)]
    max_speed: Option<f64>,

    /// Min spacing in meters during cleaning
    #[arg(long)]
    min_distance: Option<f64>,

    /// Assumed average speed in m/s for synthetic timestamps
    #[arg(long)]
    avg_speed: Option<f64>,

    /// Douglas-Peucker tolerance in meters (0 disables)
    #[arg(long)]
    simplify: Option<f64>,

    /// Round lat/lon to N decimals
    #[arg(long)]
    precision: Option<u32>,

    /// Drop elevation from output points
    #[arg(long, overrides_with = "keep_ele")]
    drop_ele: bool,
    /// Keep elevation (override profile)
    #[arg(long)]
    keep_ele: bool,

    /// Strip all <extensions> blocks
    #[arg(long, overrides_with = "keep_extensions")]
    strip_extensions: bool,
    /// Keep <extensions> blocks
    #[arg(long)]
    keep_extensions: bool,

    /// Drop document-level GPX metadata
    #[arg(long, overrides_with = "keep_metadata")]
    no_metadata: bool,
    /// Keep document-level GPX metadata
    #[arg(long)]
    keep_metadata: bool,

    /// Only clean/simplify; keep the original cadence
    #[arg(long)]
    no_resample: bool,

    /// Generate timestamps for files without them (default: enabled)
    #[arg(long, overrides_with = "no_add_timestamps")]
    add_timestamps: bool,
    /// Disable automatic timestamp generation
    #[arg(long)]
    no_add_timestamps: bool,

    /// Output GPX version
    #[arg(long, value_parser = parse_gpx_version)]
    gpx_version: Option<GpxVersion>,
}

fn parse_gpx_version(s: &str) -> Result<GpxVersion, String> {
    match s {
        "1.0" => Ok(GpxVersion::Gpx10),
        "1.1" => Ok(GpxVersion::Gpx11),
        other => Err(format!("unsupported GPX version '{other}' (expected 1.0 or 1.1)")),
    }
}

impl PipelineOptions {
    fn resolve(&self) -> PipelineConfig {
        let overrides = ProfileOverrides {
            max_speed: self.max_speed,
            min_point_distance: self.min_distance,
            assumed_avg_speed: self.avg_speed,
            resample_interval: self.interval,
            simplify_tolerance: self.simplify,
            coordinate_precision: self.precision.map(Some),
            drop_elevation: flag_pair(self.drop_ele, self.keep_ele),
            strip_extensions: flag_pair(self.strip_extensions, self.keep_extensions),
            drop_metadata: flag_pair(self.no_metadata, self.keep_metadata),
            resample: self.no_resample.then_some(false),
            synthesize_timestamps: flag_pair(self.add_timestamps, self.no_add_timestamps),
            output_version: self.gpx_version,
        };
        PipelineConfig::resolve(self.profile, &overrides)
    }
}

/// Map an enable/disable flag pair to an explicit override. Neither flag
/// set means "use the profile default".
fn flag_pair(enable: bool, disable: bool) -> Option<bool> {
    if disable {
        Some(false)
    } else if enable {
        Some(true)
    } else {
        None
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    match cli.command {
        Commands::Fix {
            input,
            output,
            options,
        } => {
            let config = options.resolve();
            if input.is_dir() {
                run_batch(&input, output.as_deref(), &config)
            } else {
                run_single(&input, output.as_deref(), &config)
            }
        }
        Commands::Retime {
            input,
            duration,
            output,
            options,
        } => run_retime(&input, duration, output.as_deref(), &options.resolve()),
    }
}

/// Process one file; surface the error and a non-zero exit status on
/// failure.
fn run_single(input: &Path, output: Option<&Path>, config: &PipelineConfig) -> ExitCode {
    let output = output
        .map(PathBuf::from)
        .unwrap_or_else(|| suffixed_path(input, "_fix"));

    match process_file(input, &output, config) {
        Ok(summary) => {
            println!(
                "[OK] {} | profile={} | points={} | {:.1} KB | -{:.1}%{}",
                output.display(),
                config.profile,
                summary.point_count,
                summary.output_size_kb(),
                summary.reduction_percent,
                if summary.timestamps_generated {
                    " | timestamps added"
                } else {
                    ""
                }
            );
            ExitCode::SUCCESS
        }
        Err(TrackError::NoTimestampedPoints) => {
            eprintln!(
                "Error: {} has no timestamped GPS track points (enable --add-timestamps to process it)",
                input.display()
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error processing {}: {}", input.display(), e);
            ExitCode::FAILURE
        }
    }
}

/// Per-file outcome in batch mode. A single file's failure never aborts
/// the batch.
enum FileOutcome {
    Processed(ProcessingSummary),
    Skipped,
    Error(String),
}

fn run_batch(folder: &Path, output: Option<&Path>, config: &PipelineConfig) -> ExitCode {
    let output_dir = output
        .map(PathBuf::from)
        .unwrap_or_else(|| folder.join("fixed"));
    if let Err(e) = fs::create_dir_all(&output_dir) {
        eprintln!(
            "Error creating output folder {}: {}",
            output_dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let mut files = gpx_files_in(folder);
    files.sort();
    if files.is_empty() {
        eprintln!("No GPX files found in {}", folder.display());
        return ExitCode::SUCCESS;
    }

    println!("{}", "=".repeat(60));
    println!(
        "Processing {} GPX file(s) from {} (profile: {})",
        files.len(),
        folder.display(),
        config.profile
    );
    println!("{}", "=".repeat(60));

    let outcomes = process_batch(&files, &output_dir, config);

    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut errors = 0usize;
    let mut timestamps_added = 0usize;

    for (path, outcome) in files.iter().zip(outcomes.iter()) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match outcome {
            FileOutcome::Processed(summary) => {
                processed += 1;
                if summary.timestamps_generated {
                    timestamps_added += 1;
                }
                println!(
                    "  [OK]   {:40} points={:5} | {:7.1} KB | -{:5.1}%{}",
                    name,
                    summary.point_count,
                    summary.output_size_kb(),
                    summary.reduction_percent,
                    if summary.timestamps_generated {
                        " | timestamps added"
                    } else {
                        ""
                    }
                );
            }
            FileOutcome::Skipped => {
                skipped += 1;
                println!("  [SKIP] {:40} no timestamped GPS points", name);
            }
            FileOutcome::Error(msg) => {
                errors += 1;
                println!("  [ERR]  {:40} {}", name, msg);
            }
        }
    }

    println!("{}", "=".repeat(60));
    print!(
        "Processed: {} | Skipped: {} | Errors: {}",
        processed, skipped, errors
    );
    if timestamps_added > 0 {
        print!(" | Timestamps added: {}", timestamps_added);
    }
    println!();
    println!("Fixed files saved to: {}", output_dir.display());

    ExitCode::SUCCESS
}

/// Each file runs its own independent pipeline; with the `parallel`
/// feature the batch fans out across rayon workers.
#[cfg(feature = "parallel")]
fn process_batch(files: &[PathBuf], output_dir: &Path, config: &PipelineConfig) -> Vec<FileOutcome> {
    use rayon::prelude::*;
    files
        .par_iter()
        .map(|path| process_one(path, output_dir, config))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn process_batch(files: &[PathBuf], output_dir: &Path, config: &PipelineConfig) -> Vec<FileOutcome> {
    files
        .iter()
        .map(|path| process_one(path, output_dir, config))
        .collect()
}

fn process_one(path: &Path, output_dir: &Path, config: &PipelineConfig) -> FileOutcome {
    let Some(file_name) = path.file_name() else {
        return FileOutcome::Error("invalid file name".to_string());
    };
    let output = output_dir.join(file_name);
    match process_file(path, &output, config) {
        Ok(summary) => FileOutcome::Processed(summary),
        Err(e) if e.is_skippable() => FileOutcome::Skipped,
        Err(e) => FileOutcome::Error(e.to_string()),
    }
}

fn run_retime(
    input: &Path,
    duration: f64,
    output: Option<&Path>,
    config: &PipelineConfig,
) -> ExitCode {
    if !duration.is_finite() || duration <= 0.0 {
        eprintln!("Error: --duration must be a positive number of minutes (got {duration})");
        return ExitCode::FAILURE;
    }

    let output = output
        .map(PathBuf::from)
        .unwrap_or_else(|| suffixed_path(input, &format!("_{}min", duration.round() as i64)));

    match retime_file(input, &output, duration, config) {
        Ok((retime, summary)) => {
            println!(
                "[OK] {} | points={} | {:.2} km at {:.1} km/h ({:.1} min realized)",
                output.display(),
                summary.point_count,
                retime.total_distance / 1000.0,
                retime.realized_speed_kmh,
                retime.realized_duration_secs / 60.0
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error re-timing {}: {}", input.display(), e);
            ExitCode::FAILURE
        }
    }
}

fn gpx_files_in(folder: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(folder) else {
        return Vec::new();
    };
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("gpx"))
        })
        .collect()
}

/// `trip.gpx` + `_fix` -> `trip_fix.gpx`, next to the input.
fn suffixed_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "gpx".to_string());
    input.with_file_name(format!("{stem}{suffix}.{ext}"))
}
