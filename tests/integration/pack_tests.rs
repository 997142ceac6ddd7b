use super::common::{archive_entries, Workspace};
use rpacs_pack::packager::{PackConfig, PackError, Packager};
use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

fn packager(ws: &Workspace) -> Packager {
    Packager::new(PackConfig::new(ws.scans.clone(), ws.staging.clone()))
}

#[test]
fn test_pack_typical_case_contents() {
    let ws = Workspace::new();
    ws.add_typical_case("DC0042");

    let summary = packager(&ws).run().unwrap();

    assert_eq!(summary.packaged.len(), 1);
    let outcome = &summary.packaged[0];
    assert_eq!(outcome.case, "DC0042");
    assert_eq!(outcome.copied.folders, 2);
    assert_eq!(outcome.stripped.files, 2);

    let archive = ws.staging.join("DC0042.tgz");
    assert_eq!(outcome.archive, archive);
    assert_eq!(
        archive_entries(&archive),
        vec![
            "DC0042",
            "DC0042/2_T1_mprage_ND",
            "DC0042/2_T1_mprage_ND/IM0001.dcm",
            "DC0042/2_T1_mprage_ND/IM0002.dcm",
            "DC0042/4_t2_flair_sag_p3_ND",
            "DC0042/4_t2_flair_sag_p3_ND/IM0001.dcm",
        ]
    );
}

#[test]
fn test_pack_removes_staged_folder_and_keeps_source() {
    let ws = Workspace::new();
    ws.add_typical_case("adys7");

    packager(&ws).run().unwrap();

    assert!(!ws.staging.join("adys7").exists());
    assert!(ws
        .scans
        .join("adys7/session1/2_T1_mprage_ND/T1_mprage_ND.nii.gz")
        .exists());
}

#[test]
fn test_pack_skips_non_matching_cases() {
    let ws = Workspace::new();
    ws.add_typical_case("dc001");
    ws.add_typical_case("pilot01");
    ws.add_typical_case("phantom_dc");

    let summary = packager(&ws).run().unwrap();

    assert_eq!(summary.selection.pending, vec!["dc001"]);
    assert!(!ws.staging.join("pilot01.tgz").exists());
    assert!(!ws.staging.join("phantom_dc.tgz").exists());
}

#[test]
fn test_second_run_skips_archived_cases() {
    let ws = Workspace::new();
    ws.add_typical_case("dc001");
    packager(&ws).run().unwrap();
    let first = fs::metadata(ws.staging.join("dc001.tgz")).unwrap().modified().unwrap();

    ws.add_typical_case("leegt2");
    let summary = packager(&ws).run().unwrap();

    assert_eq!(summary.selection.already_archived, vec!["dc001"]);
    assert_eq!(summary.selection.pending, vec!["leegt2"]);
    let second = fs::metadata(ws.staging.join("dc001.tgz")).unwrap().modified().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_case_without_allow_listed_scans_still_archived() {
    let ws = Workspace::new();
    ws.add_file("dc003", "1_localizer", "IM0001.dcm", b"loc");

    let summary = packager(&ws).run().unwrap();

    assert_eq!(summary.packaged[0].copied.folders, 0);
    assert_eq!(archive_entries(&ws.staging.join("dc003.tgz")), vec!["dc003"]);
}

#[test]
fn test_custom_scan_types_and_suffixes() {
    let ws = Workspace::new();
    ws.add_file("dc004", "dwi_b1000", "IM0001.dcm", b"dwi");
    ws.add_file("dc004", "dwi_b1000", "dwi.bval", b"0 1000");
    ws.add_typical_case("dc004");

    let mut config = PackConfig::new(ws.scans.clone(), ws.staging.clone());
    config.scan_types = vec!["dwi_".to_string()];
    config.derived_suffixes = vec![".bval".to_string()];
    Packager::new(config).run().unwrap();

    assert_eq!(
        archive_entries(&ws.staging.join("dc004.tgz")),
        vec!["dc004", "dc004/dwi_b1000", "dc004/dwi_b1000/IM0001.dcm"]
    );
}

#[test]
fn test_duplicate_scan_folder_stops_run() {
    let ws = Workspace::new();
    ws.add_typical_case("dc005");
    let second = ws.scans.join("dc005").join("session2").join("2_T1_mprage_ND");
    fs::create_dir_all(&second).unwrap();

    let result = packager(&ws).run();

    assert!(matches!(result, Err(PackError::DuplicateScanFolder { .. })));
    assert!(!ws.staging.join("dc005").exists());
    assert!(!ws.staging.join("dc005.tgz").exists());
}

#[test]
fn test_interrupted_run_leaves_nothing_behind() {
    let ws = Workspace::new();
    ws.add_typical_case("dc006");
    let flag = Arc::new(AtomicBool::new(true));

    let summary = packager(&ws).with_shutdown_flag(flag).run().unwrap();

    assert!(summary.interrupted);
    assert_eq!(fs::read_dir(&ws.staging).unwrap().count(), 0);
}

#[test]
fn test_missing_scans_dir_is_error() {
    let ws = Workspace::new();
    let config = PackConfig::new(ws.scans.join("missing"), ws.staging.clone());

    let result = Packager::new(config).run();

    assert!(matches!(result, Err(PackError::ScansDirNotFound(_))));
}
