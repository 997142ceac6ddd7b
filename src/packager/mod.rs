//! Case packaging for Research Radiology PACS (rPACS) upload.
//!
//! This module turns freshly acquired case folders into upload-ready
//! tarballs:
//! - Case selection by folder-name prefix, skipping cases already archived
//! - Copying only the scan subfolders named in the allow-list
//! - Stripping derived NIfTI files so only DICOM data is uploaded
//! - Writing `<case>.tgz` and removing the staged folder
//! - Reporting archives that are too large to upload
//!
//! # Architecture
//!
//! - [`selection`]: which cases still need packaging
//! - [`copy`]: allow-list copy of scan subfolders
//! - [`strip`]: derived file removal
//! - [`archive`]: gzip-compressed tar writing
//! - [`report`]: size threshold check
//! - [`pipeline`]: the per-case driver tying the steps together
//!
//! # Example
//!
//! ```no_run
//! use rpacs_pack::packager::{PackConfig, Packager};
//! use std::path::PathBuf;
//!
//! let config = PackConfig::new(
//!     PathBuf::from("/data/Participants"),
//!     PathBuf::from("/data/ResearchRadiologyPACS/Not_Uploaded"),
//! );
//! let summary = Packager::new(config).run().unwrap();
//! println!("{} case(s) packaged", summary.packaged.len());
//! ```

pub mod archive;
pub mod copy;
pub mod pipeline;
pub mod report;
pub mod selection;
pub mod strip;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

pub use archive::{archive_case, archive_path_for, ARCHIVE_EXTENSION};
pub use copy::{copy_scan_folders, matches_scan_type, CopyStats};
pub use pipeline::Packager;
pub use report::{find_oversized, OversizedArchive};
pub use selection::{archive_stem, matches_prefix, select_cases, Selection};
pub use strip::{is_derived, strip_derived_files, StripStats};

/// Case folder prefixes packaged by default (compared case-insensitively).
pub const DEFAULT_SCAN_PREFIXES: &[&str] = &["dc", "adys", "leegt"];

/// Scan subfolder allow-list, most important first.
///
/// When an archive is too large, drop scans from the end of this list first.
pub const DEFAULT_SCAN_TYPES: &[&str] = &[
    "t1_mp2rage_jose_UNI_Images",
    "T1_mprage_ND",
    "t2_flair_sag_p3_ND",
    "t2_space_sag_iso_p2_ND",
    "dti_2mm_m3p2_b2500_96dir_10b0s_TRACEW",
    "dti_2mm_m3p2_b2500_96dir_10b0s_ADC",
    "t1_space_ir_cor_p2_iso",
    "t2_tse_dark-fluid_tra_3mm",
];

/// File name suffixes of derived images removed before archiving.
pub const DEFAULT_DERIVED_SUFFIXES: &[&str] = &[".nii", ".nii.gz"];

/// Archives above this many bytes generally fail to upload to rPACS.
pub const DEFAULT_SIZE_LIMIT: u64 = 80_000_000;

/// Settings for one packaging run.
#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Directory holding one folder per case.
    pub scans_dir: PathBuf,
    /// Directory where case folders are staged and archives are written.
    pub staging_dir: PathBuf,
    /// Case folder name prefixes to package.
    pub scan_prefixes: Vec<String>,
    /// Substrings selecting scan subfolders to copy.
    pub scan_types: Vec<String>,
    /// Suffixes of files removed from the staged copy.
    pub derived_suffixes: Vec<String>,
    /// Archives strictly larger than this are reported.
    pub size_limit: u64,
    /// Only list what would be packaged.
    pub dry_run: bool,
}

impl PackConfig {
    /// Create a configuration with the default prefixes, scan types,
    /// derived suffixes and size limit.
    #[must_use]
    pub fn new(scans_dir: PathBuf, staging_dir: PathBuf) -> Self {
        Self {
            scans_dir,
            staging_dir,
            scan_prefixes: to_strings(DEFAULT_SCAN_PREFIXES),
            scan_types: to_strings(DEFAULT_SCAN_TYPES),
            derived_suffixes: to_strings(DEFAULT_DERIVED_SUFFIXES),
            size_limit: DEFAULT_SIZE_LIMIT,
            dry_run: false,
        }
    }

    /// Set the size limit.
    #[must_use]
    pub fn with_size_limit(mut self, size_limit: u64) -> Self {
        self.size_limit = size_limit;
        self
    }

    /// Enable or disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

pub(crate) fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Result of packaging a single case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    /// Case folder name
    pub case: String,
    /// Path of the written archive
    pub archive: PathBuf,
    /// What was copied into the staged folder
    pub copied: CopyStats,
    /// What was stripped from the staged folder
    pub stripped: StripStats,
    /// Archive size in bytes
    pub archive_size: u64,
}

/// Summary of a packaging run.
#[derive(Debug, Clone, Default)]
pub struct PackSummary {
    /// Case selection result
    pub selection: Selection,
    /// Cases packaged in this run, in processing order
    pub packaged: Vec<CaseOutcome>,
    /// Archives over the size limit (all archives in staging, not only new ones)
    pub oversized: Vec<OversizedArchive>,
    /// Size limit used for the report
    pub size_limit: u64,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Whether the run stopped early on Ctrl+C
    pub interrupted: bool,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl PackSummary {
    /// Total bytes of archives written in this run.
    #[must_use]
    pub fn archived_bytes(&self) -> u64 {
        self.packaged.iter().map(|c| c.archive_size).sum()
    }

    /// Total number of derived files stripped in this run.
    #[must_use]
    pub fn stripped_files(&self) -> usize {
        self.packaged.iter().map(|c| c.stripped.files).sum()
    }
}

/// Errors that can occur while packaging cases.
#[derive(thiserror::Error, Debug)]
pub enum PackError {
    /// The scans directory does not exist.
    #[error("Scans directory not found: {0}")]
    ScansDirNotFound(PathBuf),

    /// The staging directory does not exist.
    #[error("Staging directory not found: {0}")]
    StagingDirNotFound(PathBuf),

    /// The path exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A staged folder for the case is left over from an earlier run.
    #[error("Staged case folder already exists: {0} (remove it and re-run)")]
    StagingExists(PathBuf),

    /// Two allow-listed scan folders with the same name in one case.
    #[error("Case {case} has more than one scan folder named {name}")]
    DuplicateScanFolder {
        /// Case folder name
        case: String,
        /// Conflicting scan folder name
        name: String,
    },

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("Failed to walk {path}: {source}")]
    Walk {
        /// Root of the failed walk
        path: PathBuf,
        /// The underlying walkdir error
        #[source]
        source: walkdir::Error,
    },

    /// The run was interrupted by Ctrl+C.
    #[error("Packaging interrupted")]
    Interrupted,
}

impl PackError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn walk(path: &Path) -> impl FnOnce(walkdir::Error) -> Self + '_ {
        move |source| Self::Walk {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_config_defaults() {
        let config = PackConfig::new(PathBuf::from("/scans"), PathBuf::from("/staging"));

        assert_eq!(config.scan_prefixes, vec!["dc", "adys", "leegt"]);
        assert_eq!(config.scan_types.len(), 8);
        assert_eq!(config.scan_types[0], "t1_mp2rage_jose_UNI_Images");
        assert_eq!(config.derived_suffixes, vec![".nii", ".nii.gz"]);
        assert_eq!(config.size_limit, 80_000_000);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_pack_config_builders() {
        let config = PackConfig::new(PathBuf::from("/s"), PathBuf::from("/t"))
            .with_size_limit(1_000)
            .with_dry_run(true);
        assert_eq!(config.size_limit, 1_000);
        assert!(config.dry_run);
    }

    #[test]
    fn test_pack_error_display() {
        let err = PackError::ScansDirNotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Scans directory not found: /missing");

        let err = PackError::DuplicateScanFolder {
            case: "dc001".to_string(),
            name: "T1_mprage_ND".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Case dc001 has more than one scan folder named T1_mprage_ND"
        );
    }

    #[test]
    fn test_summary_totals() {
        let outcome = |size, files| CaseOutcome {
            case: "dc".to_string(),
            archive: PathBuf::from("dc.tgz"),
            copied: CopyStats::default(),
            stripped: StripStats { files, bytes: 0 },
            archive_size: size,
        };
        let summary = PackSummary {
            packaged: vec![outcome(10, 1), outcome(32, 2)],
            ..Default::default()
        };
        assert_eq!(summary.archived_bytes(), 42);
        assert_eq!(summary.stripped_files(), 3);
    }
}
