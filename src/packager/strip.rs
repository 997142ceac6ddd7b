//! Derived file removal.
//!
//! NIfTI conversions (`.nii`, `.nii.gz`) sometimes sit next to the DICOM
//! series. They are deleted from the staged copy so only DICOM is uploaded;
//! the source tree is never touched.

use std::fs;
use std::path::Path;

use serde::Serialize;
use walkdir::WalkDir;

use super::PackError;

/// Counts of removed derived files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StripStats {
    /// Files removed
    pub files: usize,
    /// Bytes removed
    pub bytes: u64,
}

/// Whether a file name ends with any of `suffixes`.
#[must_use]
pub fn is_derived<S: AsRef<str>>(name: &str, suffixes: &[S]) -> bool {
    suffixes.iter().any(|s| name.ends_with(s.as_ref()))
}

/// Delete every file under `dir` whose name ends with one of `suffixes`.
///
/// # Errors
///
/// Returns I/O or walk errors; the first failure stops the strip.
pub fn strip_derived_files<S: AsRef<str>>(
    dir: &Path,
    suffixes: &[S],
) -> Result<StripStats, PackError> {
    let mut stats = StripStats::default();

    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(PackError::walk(dir))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !is_derived(name, suffixes) {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        fs::remove_file(entry.path()).map_err(PackError::io(entry.path()))?;
        log::trace!("Removed derived file {}", entry.path().display());
        stats.files += 1;
        stats.bytes += size;
    }

    if stats.files > 0 {
        log::debug!(
            "Stripped {} derived file(s) from {}",
            stats.files,
            dir.display()
        );
    }
    Ok(stats)
}
