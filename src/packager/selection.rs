//! Case selection.
//!
//! A case is pending when its folder name starts with one of the configured
//! prefixes and no `<case>.tgz` exists anywhere under the staging directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Serialize;
use walkdir::WalkDir;

use super::archive::ARCHIVE_EXTENSION;
use super::PackError;

/// Outcome of case selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Cases that still need packaging, sorted by name
    pub pending: Vec<String>,
    /// Matching cases skipped because an archive already exists
    pub already_archived: Vec<String>,
}

/// Whether `name` starts with any of `prefixes`, ignoring case.
#[must_use]
pub fn matches_prefix<S: AsRef<str>>(name: &str, prefixes: &[S]) -> bool {
    let lower = name.to_lowercase();
    prefixes
        .iter()
        .any(|p| lower.starts_with(&p.as_ref().to_lowercase()))
}

/// The case name an archive file stands for, or `None` if it is not a `.tgz`.
#[must_use]
pub fn archive_stem(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(ARCHIVE_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
}

/// Select the cases to package.
///
/// A missing staging directory holds no archives; it is not created here.
///
/// # Errors
///
/// Returns [`PackError::ScansDirNotFound`] if `scans_dir` is missing, and
/// I/O or walk errors from listing either directory.
pub fn select_cases<S: AsRef<str>>(
    scans_dir: &Path,
    staging_dir: &Path,
    prefixes: &[S],
) -> Result<Selection, PackError> {
    let candidates = list_matching_cases(scans_dir, prefixes)?;

    let archived = if staging_dir.exists() {
        existing_archives(staging_dir)?
    } else {
        log::debug!("Staging directory {} does not exist yet", staging_dir.display());
        BTreeSet::new()
    };

    let (already_archived, pending): (Vec<String>, Vec<String>) = candidates
        .into_iter()
        .partition(|case| archived.contains(case));

    for case in &already_archived {
        log::info!("Case: {case} is already compressed in the staging directory, skipping.");
    }

    Ok(Selection {
        pending,
        already_archived,
    })
}

/// Case folders directly under `scans_dir` whose names match a prefix.
fn list_matching_cases<S: AsRef<str>>(
    scans_dir: &Path,
    prefixes: &[S],
) -> Result<Vec<String>, PackError> {
    if !scans_dir.exists() {
        return Err(PackError::ScansDirNotFound(scans_dir.to_path_buf()));
    }
    if !scans_dir.is_dir() {
        return Err(PackError::NotADirectory(scans_dir.to_path_buf()));
    }

    let mut cases = Vec::new();
    for entry in fs::read_dir(scans_dir).map_err(PackError::io(scans_dir))? {
        let entry = entry.map_err(PackError::io(scans_dir))?;
        let path = entry.path();

        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            log::warn!("Skipping non UTF-8 entry: {}", path.display());
            continue;
        };

        if !matches_prefix(&name, prefixes) {
            log::trace!("Not a case folder: {name}");
            continue;
        }

        // Follows symlinks so linked case folders still count.
        if !path.is_dir() {
            log::debug!("Skipping {name}: matches a case prefix but is not a directory");
            continue;
        }

        cases.push(name);
    }

    cases.sort();
    Ok(cases)
}

/// Names of all cases with a `.tgz` anywhere under `staging_dir`.
fn existing_archives(staging_dir: &Path) -> Result<BTreeSet<String>, PackError> {
    let mut archived = BTreeSet::new();

    for entry in WalkDir::new(staging_dir).min_depth(1) {
        let entry = entry.map_err(PackError::walk(staging_dir))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(stem) = entry.file_name().to_str().and_then(archive_stem) {
            archived.insert(stem.to_string());
        }
    }

    log::debug!(
        "Found {} existing archive(s) in {}",
        archived.len(),
        staging_dir.display()
    );
    Ok(archived)
}
