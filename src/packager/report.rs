//! Oversized archive report.
//!
//! Compressed cases over the limit (80 MB by default) generally do not
//! upload to rPACS. Flagged archives should be checked and extraneous scans
//! removed, starting from the end of the scan type allow-list.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use super::selection::archive_stem;
use super::PackError;

/// An archive whose size exceeds the upload limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OversizedArchive {
    /// Full path to the archive
    pub path: PathBuf,
    /// Archive file name
    pub name: String,
    /// Archive size in bytes
    pub size: u64,
}

impl OversizedArchive {
    /// Size in decimal megabytes.
    #[must_use]
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1_000_000.0
    }

    /// The warning printed for this archive.
    #[must_use]
    pub fn message(&self, limit: u64) -> String {
        format!(
            "File: {} is over {}MB ({} MB), please check it.",
            self.name,
            limit as f64 / 1_000_000.0,
            self.size_mb()
        )
    }
}

/// Find `.tgz` archives under `staging_dir` strictly larger than `limit`.
///
/// Results are sorted by file name. Each hit is logged as a warning.
///
/// # Errors
///
/// Returns [`PackError::StagingDirNotFound`] if the directory is missing and
/// walk errors from traversal.
pub fn find_oversized(staging_dir: &Path, limit: u64) -> Result<Vec<OversizedArchive>, PackError> {
    if !staging_dir.is_dir() {
        return Err(PackError::StagingDirNotFound(staging_dir.to_path_buf()));
    }

    let mut oversized = Vec::new();
    for entry in WalkDir::new(staging_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(PackError::walk(staging_dir))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if archive_stem(name).is_none() {
            continue;
        }

        let size = entry.metadata().map_err(PackError::walk(staging_dir))?.len();
        if size > limit {
            oversized.push(OversizedArchive {
                path: entry.path().to_path_buf(),
                name: name.to_string(),
                size,
            });
        }
    }

    oversized.sort_by(|a, b| a.name.cmp(&b.name));
    for archive in &oversized {
        log::warn!("{}", archive.message(limit));
    }
    Ok(oversized)
}
