//! rpacs-pack - Research Radiology PACS case packager
//!
//! Copies allow-listed DICOM scan folders of new cases into a staging
//! directory, strips derived NIfTI files, archives each case as `<case>.tgz`
//! and flags archives too large to upload. Also renders percentile score
//! bar charts.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod packager;
pub mod plot;
pub mod progress;
pub mod signal;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, InitConfigArgs, OutputFormat, PackArgs, PlotArgs, ReportArgs};
use crate::config::Config;
use crate::error::ExitCode;
use crate::output::{JsonPackOutput, JsonReportOutput, TextOutput};
use crate::packager::{find_oversized, PackConfig, PackSummary, Packager};
use crate::plot::{horiz_bar_plot, read_scores_csv, BarChartOptions};
use crate::progress::Progress;

/// Run the application for parsed CLI arguments.
///
/// # Errors
///
/// Returns an error for missing settings, configuration problems and any
/// failure of the selected command.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    match cli.command {
        Commands::Pack(ref args) => run_pack(&cli, args),
        Commands::Report(ref args) => run_report(&cli, args),
        Commands::Plot(ref args) => run_plot(args),
        Commands::InitConfig(ref args) => run_init_config(args),
    }
}

fn run_pack(cli: &Cli, args: &PackArgs) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    let pack_config = pack_config(args, config)?;

    let handler = signal::install_handler()?;
    let quiet_progress = cli.quiet || args.dry_run || args.output == OutputFormat::Json;

    let summary = Packager::new(pack_config)
        .with_shutdown_flag(handler.get_flag())
        .with_progress(Arc::new(Progress::new(quiet_progress)))
        .run()
        .context("Packaging failed")?;

    let exit_code = pack_exit_code(&summary);
    let mut stdout = io::stdout().lock();
    match args.output {
        OutputFormat::Text => TextOutput::for_summary(&summary).write_to(&mut stdout)?,
        OutputFormat::Json => JsonPackOutput::new(&summary, exit_code).write_to(&mut stdout)?,
    }
    Ok(exit_code)
}

/// Merge CLI overrides into the loaded configuration.
///
/// # Errors
///
/// Returns an error when the scans or staging directory is configured
/// nowhere.
pub fn pack_config(args: &PackArgs, config: Config) -> Result<PackConfig> {
    let scans_dir = args.scans_dir.clone().or(config.scans_dir).ok_or_else(|| {
        anyhow::anyhow!("No scans directory: pass --scans-dir or set scans_dir in the config")
    })?;
    let staging_dir = args.staging_dir.clone().or(config.staging_dir).ok_or_else(|| {
        anyhow::anyhow!("No staging directory: pass --staging-dir or set staging_dir in the config")
    })?;

    let mut pack = PackConfig::new(scans_dir, staging_dir)
        .with_size_limit(args.size_limit.unwrap_or(config.size_limit))
        .with_dry_run(args.dry_run);
    pack.scan_prefixes = pick(&args.prefixes, config.scan_prefixes);
    pack.scan_types = pick(&args.scan_types, config.scan_types);
    pack.derived_suffixes = config.derived_suffixes;
    Ok(pack)
}

fn pick(cli: &[String], configured: Vec<String>) -> Vec<String> {
    if cli.is_empty() {
        configured
    } else {
        cli.to_vec()
    }
}

/// Exit code for a finished packaging run.
#[must_use]
pub fn pack_exit_code(summary: &PackSummary) -> ExitCode {
    if summary.interrupted {
        ExitCode::Interrupted
    } else if !summary.oversized.is_empty() {
        ExitCode::Oversized
    } else if summary.selection.pending.is_empty() {
        ExitCode::NothingToDo
    } else {
        ExitCode::Success
    }
}

fn run_report(cli: &Cli, args: &ReportArgs) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    let staging_dir = args.staging_dir.clone().or(config.staging_dir).ok_or_else(|| {
        anyhow::anyhow!("No staging directory: pass --staging-dir or set staging_dir in the config")
    })?;
    let size_limit = args.size_limit.unwrap_or(config.size_limit);

    let oversized = find_oversized(&staging_dir, size_limit)?;
    let exit_code = if oversized.is_empty() {
        ExitCode::Success
    } else {
        ExitCode::Oversized
    };

    let mut stdout = io::stdout().lock();
    match args.output {
        OutputFormat::Text => {
            TextOutput::for_report(&oversized, size_limit).write_to(&mut stdout)?;
        }
        OutputFormat::Json => {
            JsonReportOutput::new(&staging_dir, size_limit, &oversized, exit_code)
                .write_to(&mut stdout)?;
        }
    }
    Ok(exit_code)
}

fn run_plot(args: &PlotArgs) -> Result<ExitCode> {
    let (names, scores) = read_scores_csv(&args.scores)?;
    let output_file = args
        .output_file
        .clone()
        .unwrap_or_else(|| args.scores.with_extension("png"));

    let mut options = BarChartOptions::save_to(&output_file).with_size(args.width, args.height);
    if let Some(ref title) = args.title {
        options = options.with_title(title.clone());
    }

    horiz_bar_plot(&names, &scores, &options)
        .with_context(|| format!("Failed to plot {}", args.scores.display()))?;
    Ok(ExitCode::Success)
}

fn run_init_config(args: &InitConfigArgs) -> Result<ExitCode> {
    let path = match args.path {
        Some(ref p) => p.clone(),
        None => Config::config_path()?,
    };
    if path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let written = Config::default().save(Some(&path))?;
    log::info!("Wrote default configuration to {}", written.display());
    Ok(ExitCode::Success)
}
