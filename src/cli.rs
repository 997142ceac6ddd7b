//! Command-line interface definitions for rpacs-pack.
//!
//! Global options (verbosity, color, config file) apply to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Package new cases using the configured directories
//! rpacs-pack pack
//!
//! # Explicit directories, dry run
//! rpacs-pack pack --scans-dir /data/Participants \
//!     --staging-dir /data/ResearchRadiologyPACS/Not_Uploaded --dry-run
//!
//! # Only check archive sizes
//! rpacs-pack report --staging-dir /data/ResearchRadiologyPACS/Not_Uploaded
//!
//! # Plot percentile scores
//! rpacs-pack plot scores.csv --output-file dc001.png
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Package DICOM case folders into tarballs for rPACS upload.
#[derive(Debug, Parser)]
#[command(name = "rpacs-pack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (TOML); defaults to the platform config directory
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Copy, strip and archive new cases, then report oversized archives
    Pack(PackArgs),
    /// Report archives larger than the upload limit
    Report(ReportArgs),
    /// Render a horizontal bar chart of percentile scores
    Plot(PlotArgs),
    /// Write a config file with the default settings
    InitConfig(InitConfigArgs),
}

/// Arguments for the pack subcommand.
#[derive(Debug, Args)]
pub struct PackArgs {
    /// Directory holding one folder per case
    #[arg(long, value_name = "DIR")]
    pub scans_dir: Option<PathBuf>,

    /// Directory where archives are written
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Case folder prefix (repeatable; replaces the configured list)
    #[arg(long = "prefix", value_name = "PREFIX")]
    pub prefixes: Vec<String>,

    /// Scan folder allow-list entry (repeatable; replaces the configured list)
    #[arg(long = "scan-type", value_name = "NAME")]
    pub scan_types: Vec<String>,

    /// Archive size above which a warning is printed (e.g., 80MB, 76MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub size_limit: Option<u64>,

    /// List the cases that would be packaged without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for the run summary
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the report subcommand.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Directory holding the archives
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Archive size above which a warning is printed (e.g., 80MB, 76MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub size_limit: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the plot subcommand.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// CSV file with a `task,score` header and one row per task
    #[arg(value_name = "SCORES_CSV")]
    pub scores: PathBuf,

    /// PNG file to write (defaults to the CSV path with a .png extension)
    #[arg(long, value_name = "PNG")]
    pub output_file: Option<PathBuf>,

    /// Caption above the chart
    #[arg(long)]
    pub title: Option<String>,

    /// Canvas width in pixels
    #[arg(long, value_name = "PX", default_value = "400")]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, value_name = "PX", default_value = "800")]
    pub height: u32,
}

/// Arguments for the init-config subcommand.
#[derive(Debug, Args)]
pub struct InitConfigArgs {
    /// Where to write the file; defaults to the platform config directory
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Output format for run summaries and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use rpacs_pack::cli::parse_size;
///
/// assert_eq!(parse_size("80MB").unwrap(), 80_000_000);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    if s.starts_with('-') {
        return Err("Size cannot be negative".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
