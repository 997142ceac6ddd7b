//! Allow-list copy of scan subfolders.
//!
//! Every directory inside a case whose name contains an allow-listed scan
//! type is copied, with its whole subtree, directly under the staged case
//! folder. Matching is a case-sensitive substring test, so
//! `5_T1_mprage_ND_RR` matches `T1_mprage_ND`.

use std::fs;
use std::path::Path;

use serde::Serialize;
use walkdir::WalkDir;

use super::PackError;

/// Counts of what was copied into a staged case folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CopyStats {
    /// Scan folders copied
    pub folders: usize,
    /// Files copied
    pub files: usize,
    /// Bytes copied
    pub bytes: u64,
}

/// Whether a folder name contains any of `scan_types`.
#[must_use]
pub fn matches_scan_type<S: AsRef<str>>(name: &str, scan_types: &[S]) -> bool {
    scan_types.iter().any(|t| name.contains(t.as_ref()))
}

/// Copy allow-listed scan folders from `source_case` into `dest_case`.
///
/// `dest_case` must already exist. Scan folders are flattened by name, and
/// the walk does not descend into a folder once it has been copied.
///
/// # Errors
///
/// Returns [`PackError::DuplicateScanFolder`] when two matching folders share
/// a name, and I/O or walk errors from reading or writing.
pub fn copy_scan_folders<S: AsRef<str>>(
    source_case: &Path,
    dest_case: &Path,
    scan_types: &[S],
) -> Result<CopyStats, PackError> {
    let mut stats = CopyStats::default();
    let mut walker = WalkDir::new(source_case)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(PackError::walk(source_case))?;
        // Symlinked folders are listed but not descended by the walk.
        let linked_dir = entry.path_is_symlink() && entry.path().is_dir();
        if !entry.file_type().is_dir() && !linked_dir {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !matches_scan_type(name, scan_types) {
            continue;
        }

        let target = dest_case.join(name);
        if target.exists() {
            return Err(PackError::DuplicateScanFolder {
                case: case_name(source_case),
                name: name.to_string(),
            });
        }

        log::debug!("Copying scan folder {}", entry.path().display());
        copy_tree(entry.path(), &target, &mut stats)?;
        stats.folders += 1;
        if !linked_dir {
            walker.skip_current_dir();
        }
    }

    if stats.folders == 0 {
        log::warn!(
            "No allow-listed scan folders found in {}",
            source_case.display()
        );
    }

    Ok(stats)
}

/// Recursively copy `src` to a new directory `dst`.
fn copy_tree(src: &Path, dst: &Path, stats: &mut CopyStats) -> Result<(), PackError> {
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(PackError::walk(src))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .unwrap_or_else(|_| entry.path());
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(PackError::io(&target))?;
        } else if entry.file_type().is_file() {
            let bytes = fs::copy(entry.path(), &target).map_err(PackError::io(entry.path()))?;
            stats.files += 1;
            stats.bytes += bytes;
        }
    }
    Ok(())
}

fn case_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
