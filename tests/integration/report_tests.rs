use super::common::Workspace;
use rpacs_pack::packager::{find_oversized, PackConfig, Packager};
use std::fs;

#[test]
fn test_report_after_pack_flags_large_archive() {
    let ws = Workspace::new();
    ws.add_typical_case("dc001");
    // Incompressible-ish payload so the archive stays large.
    let payload: Vec<u8> = (0..200_000u32)
        .map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8)
        .collect();
    ws.add_file("dc001", "2_T1_mprage_ND", "IM0100.dcm", &payload);

    let config = PackConfig::new(ws.scans.clone(), ws.staging.clone()).with_size_limit(50_000);
    let summary = Packager::new(config).run().unwrap();

    assert_eq!(summary.oversized.len(), 1);
    assert_eq!(summary.oversized[0].name, "dc001.tgz");
    assert!(summary.oversized[0].size > 50_000);
}

#[test]
fn test_report_includes_archives_from_earlier_runs() {
    let ws = Workspace::new();
    fs::write(ws.staging.join("adys1.tgz"), vec![1u8; 300]).unwrap();
    fs::write(ws.staging.join("adys2.tgz"), vec![1u8; 100]).unwrap();

    let oversized = find_oversized(&ws.staging, 200).unwrap();

    assert_eq!(oversized.len(), 1);
    assert_eq!(oversized[0].name, "adys1.tgz");
    assert_eq!(oversized[0].path, ws.staging.join("adys1.tgz"));
}

#[test]
fn test_report_at_limit_is_not_flagged() {
    let ws = Workspace::new();
    fs::write(ws.staging.join("dc001.tgz"), vec![0u8; 200]).unwrap();

    assert!(find_oversized(&ws.staging, 200).unwrap().is_empty());
}
