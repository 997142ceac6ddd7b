//! Shared fixtures: a scans tree and an empty staging directory.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tempfile::TempDir;

pub struct Workspace {
    _root: TempDir,
    pub scans: PathBuf,
    pub staging: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let scans = root.path().join("Participants");
        let staging = root.path().join("ResearchRadiologyPACS").join("Not_Uploaded");
        fs::create_dir_all(&scans).unwrap();
        fs::create_dir_all(&staging).unwrap();
        Self {
            _root: root,
            scans,
            staging,
        }
    }

    /// Create `<scans>/<case>/<session>/<folder>/<file>` with `contents`.
    pub fn add_file(&self, case: &str, folder: &str, file: &str, contents: &[u8]) -> PathBuf {
        let dir = self.scans.join(case).join("session1").join(folder);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file);
        fs::write(&path, contents).unwrap();
        path
    }

    /// A typical case: two allow-listed series, one localizer, one NIfTI.
    pub fn add_typical_case(&self, case: &str) {
        self.add_file(case, "2_T1_mprage_ND", "IM0001.dcm", b"t1 slice 1");
        self.add_file(case, "2_T1_mprage_ND", "IM0002.dcm", b"t1 slice 2");
        self.add_file(case, "2_T1_mprage_ND", "T1_mprage_ND.nii.gz", b"nifti");
        self.add_file(case, "4_t2_flair_sag_p3_ND", "IM0001.dcm", b"flair");
        self.add_file(case, "4_t2_flair_sag_p3_ND", "flair.nii", b"nifti");
        self.add_file(case, "1_localizer", "IM0001.dcm", b"localizer");
    }
}

/// Sorted entry paths of a `.tgz`, without trailing slashes.
pub fn archive_entries(archive: &Path) -> Vec<String> {
    let mut tar = tar::Archive::new(GzDecoder::new(File::open(archive).unwrap()));
    let mut names: Vec<String> = tar
        .entries()
        .unwrap()
        .map(|e| {
            e.unwrap()
                .path()
                .unwrap()
                .to_string_lossy()
                .trim_end_matches('/')
                .to_string()
        })
        .collect();
    names.sort();
    names
}
