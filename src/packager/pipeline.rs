//! Per-case packaging driver.
//!
//! # Overview
//!
//! [`Packager::run`] performs, in order:
//! 1. **Selection**: matching case folders without an existing archive
//! 2. **Per case**: stage folder, copy scan folders, strip derived files,
//!    write `<case>.tgz`, remove the staged folder
//! 3. **Report**: every archive in staging above the size limit
//!
//! The staged folder is removed whether or not the case succeeds, so a
//! failed or interrupted case is simply picked up again on the next run.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bytesize::ByteSize;

use super::{
    archive_case, archive_path_for, copy_scan_folders, find_oversized, select_cases,
    strip_derived_files, CaseOutcome, PackConfig, PackError, PackSummary,
};
use crate::progress::ProgressCallback;

/// Drives a packaging run.
pub struct Packager {
    config: PackConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl Packager {
    /// Create a packager for `config`.
    #[must_use]
    pub fn new(config: PackConfig) -> Self {
        Self {
            config,
            shutdown_flag: None,
            progress: None,
        }
    }

    /// Set the shutdown flag checked between cases and steps.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The configuration this packager runs with.
    #[must_use]
    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn check_shutdown(&self) -> Result<(), PackError> {
        if self.is_shutdown_requested() {
            Err(PackError::Interrupted)
        } else {
            Ok(())
        }
    }

    fn step(&self, case: &str, step: &str) {
        log::debug!("{case}: {step}");
        if let Some(ref cb) = self.progress {
            cb.on_step(case, step);
        }
    }

    /// Run selection, packaging and the size report.
    ///
    /// An interrupted run returns `Ok` with `interrupted` set; the report is
    /// still produced for archives that exist at that point.
    ///
    /// # Errors
    ///
    /// Any selection, filesystem or report error ends the run.
    pub fn run(&self) -> Result<PackSummary, PackError> {
        let start = Instant::now();
        let config = &self.config;

        let selection = select_cases(
            &config.scans_dir,
            &config.staging_dir,
            &config.scan_prefixes,
        )?;

        if selection.pending.is_empty() {
            log::info!("No new cases to package");
        } else {
            let verb = if config.dry_run { "would be" } else { "will be" };
            log::info!("The following cases {verb} copied:");
            for case in &selection.pending {
                log::info!("  {case}");
            }
        }

        let mut summary = PackSummary {
            selection,
            size_limit: config.size_limit,
            dry_run: config.dry_run,
            ..Default::default()
        };

        if !config.dry_run {
            self.pack_pending(&mut summary)?;
        }

        summary.oversized = if config.dry_run && !config.staging_dir.exists() {
            Vec::new()
        } else {
            find_oversized(&config.staging_dir, config.size_limit)?
        };
        summary.duration = start.elapsed();
        Ok(summary)
    }

    fn pack_pending(&self, summary: &mut PackSummary) -> Result<(), PackError> {
        let staging_dir = &self.config.staging_dir;
        if !staging_dir.exists() {
            log::info!("Creating staging directory {}", staging_dir.display());
            fs::create_dir_all(staging_dir).map_err(PackError::io(staging_dir))?;
        }

        let pending = summary.selection.pending.clone();
        if let Some(ref cb) = self.progress {
            cb.on_start(pending.len());
        }

        let result = self.pack_each(&pending, summary);

        if let Some(ref cb) = self.progress {
            cb.on_finish();
        }
        result
    }

    fn pack_each(&self, pending: &[String], summary: &mut PackSummary) -> Result<(), PackError> {
        for (index, case) in pending.iter().enumerate() {
            if let Some(ref cb) = self.progress {
                cb.on_case_start(index + 1, case);
            }

            match self.pack_case(case) {
                Ok(outcome) => {
                    log::info!(
                        "Packaged {} ({} scan folder(s), {})",
                        case,
                        outcome.copied.folders,
                        ByteSize::b(outcome.archive_size)
                    );
                    if let Some(ref cb) = self.progress {
                        cb.on_case_done(case, outcome.archive_size);
                    }
                    summary.packaged.push(outcome);
                }
                Err(PackError::Interrupted) => {
                    log::warn!("Interrupted while packaging {case}; staged files removed");
                    summary.interrupted = true;
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Package a single case into `<staging>/<case>.tgz`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::StagingExists`] if a staged folder is already
    /// present, [`PackError::Interrupted`] on shutdown, and any error from
    /// the copy, strip or archive steps.
    pub fn pack_case(&self, case: &str) -> Result<CaseOutcome, PackError> {
        self.check_shutdown()?;

        let staged = self.config.staging_dir.join(case);
        if staged.exists() {
            return Err(PackError::StagingExists(staged));
        }
        fs::create_dir(&staged).map_err(PackError::io(&staged))?;

        let result = self.stage_and_archive(case, &staged);

        match fs::remove_dir_all(&staged) {
            Ok(()) => {}
            Err(e) if result.is_ok() => return Err(PackError::io(&staged)(e)),
            Err(e) => log::warn!("Could not remove {}: {}", staged.display(), e),
        }
        result
    }

    fn stage_and_archive(&self, case: &str, staged: &Path) -> Result<CaseOutcome, PackError> {
        let config = &self.config;
        let source = config.scans_dir.join(case);

        self.step(case, "copying");
        let copied = copy_scan_folders(&source, staged, &config.scan_types)?;
        self.check_shutdown()?;

        self.step(case, "stripping");
        let stripped = strip_derived_files(staged, &config.derived_suffixes)?;
        self.check_shutdown()?;

        self.step(case, "archiving");
        let archive = archive_path_for(&config.staging_dir, case);
        let archive_size = archive_case(staged, &archive, case)?;

        Ok(CaseOutcome {
            case: case.to_string(),
            archive,
            copied,
            stripped,
            archive_size,
        })
    }
}
