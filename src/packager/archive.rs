//! Gzip-compressed tar writing.
//!
//! # Overview
//!
//! A staged case folder becomes `<case>.tgz` whose entries are all rooted at
//! `<case>/`. The tar stream is written to `<case>.tgz.part` and renamed when
//! complete, so only finished archives carry the `.tgz` name that case
//! selection treats as "already packaged".

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use super::PackError;

/// Extension of finished archives (without the dot).
pub const ARCHIVE_EXTENSION: &str = "tgz";

/// Suffix appended to archives still being written.
const PART_SUFFIX: &str = ".part";

/// Where the archive for `case` lives.
#[must_use]
pub fn archive_path_for(staging_dir: &Path, case: &str) -> PathBuf {
    staging_dir.join(format!("{case}.{ARCHIVE_EXTENSION}"))
}

/// The in-progress path for `archive_path`.
#[must_use]
pub fn part_path_for(archive_path: &Path) -> PathBuf {
    let mut name = archive_path.as_os_str().to_owned();
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

/// Archive `staged_dir` into `archive_path` with entries under `arcname/`.
///
/// Returns the size of the finished archive in bytes. On failure the partial
/// file is removed.
///
/// # Errors
///
/// Returns [`PackError::Io`] if reading the staged tree or writing the
/// archive fails.
pub fn archive_case(
    staged_dir: &Path,
    archive_path: &Path,
    arcname: &str,
) -> Result<u64, PackError> {
    let part = part_path_for(archive_path);

    if let Err(e) = write_archive(staged_dir, &part, arcname) {
        if let Err(cleanup) = fs::remove_file(&part) {
            log::debug!("Could not remove {}: {}", part.display(), cleanup);
        }
        return Err(e);
    }

    fs::rename(&part, archive_path).map_err(PackError::io(archive_path))?;
    let size = fs::metadata(archive_path)
        .map_err(PackError::io(archive_path))?
        .len();

    log::debug!("Wrote {} ({} bytes)", archive_path.display(), size);
    Ok(size)
}

fn write_archive(staged_dir: &Path, part: &Path, arcname: &str) -> Result<(), PackError> {
    let file = File::create(part).map_err(PackError::io(part))?;

    let encoder = GzEncoder::new(BufWriter::new(file), Compression::best());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    builder
        .append_dir_all(arcname, staged_dir)
        .map_err(PackError::io(staged_dir))?;

    let mut writer = builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .map_err(PackError::io(part))?;
    writer.flush().map_err(PackError::io(part))?;
    Ok(())
}
