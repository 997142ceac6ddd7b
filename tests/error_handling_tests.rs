//! End-to-end tests driving `run_app` and checking exit codes.

use clap::Parser;
use rpacs_pack::cli::Cli;
use rpacs_pack::error::{ExitCode, StructuredError};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["rpacs-pack", "-q"];
    argv.extend_from_slice(args);
    rpacs_pack::run_app(Cli::try_parse_from(argv).unwrap())
}

fn add_case(scans: &Path, case: &str) {
    let dir = scans.join(case).join("T1_mprage_ND");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("IM0001.dcm"), b"dicom").unwrap();
}

#[test]
fn test_exit_code_success() {
    let scans = tempdir().unwrap();
    let staging = tempdir().unwrap();
    add_case(scans.path(), "dc001");

    let code = run(&[
        "pack",
        "--scans-dir",
        scans.path().to_str().unwrap(),
        "--staging-dir",
        staging.path().to_str().unwrap(),
        "--output",
        "json",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(staging.path().join("dc001.tgz").is_file());
}

#[test]
fn test_exit_code_nothing_to_do() {
    let scans = tempdir().unwrap();
    let staging = tempdir().unwrap();
    add_case(scans.path(), "dc001");
    fs::write(staging.path().join("dc001.tgz"), b"done").unwrap();

    let code = run(&[
        "pack",
        "--scans-dir",
        scans.path().to_str().unwrap(),
        "--staging-dir",
        staging.path().to_str().unwrap(),
    ])
    .unwrap();

    assert_eq!(code, ExitCode::NothingToDo);
}

#[test]
fn test_exit_code_oversized() {
    let scans = tempdir().unwrap();
    let staging = tempdir().unwrap();
    add_case(scans.path(), "adys3");

    let code = run(&[
        "pack",
        "--scans-dir",
        scans.path().to_str().unwrap(),
        "--staging-dir",
        staging.path().to_str().unwrap(),
        "--size-limit",
        "1",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Oversized);
}

#[test]
fn test_dry_run_exit_code_and_no_writes() {
    let scans = tempdir().unwrap();
    let staging = tempdir().unwrap();
    add_case(scans.path(), "leegt1");

    let code = run(&[
        "pack",
        "--dry-run",
        "--scans-dir",
        scans.path().to_str().unwrap(),
        "--staging-dir",
        staging.path().to_str().unwrap(),
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
}

#[test]
fn test_dry_run_does_not_create_staging_dir() {
    let scans = tempdir().unwrap();
    let root = tempdir().unwrap();
    let staging = root.path().join("Not_Uploaded");
    add_case(scans.path(), "dc002");

    let code = run(&[
        "pack",
        "--dry-run",
        "--scans-dir",
        scans.path().to_str().unwrap(),
        "--staging-dir",
        staging.to_str().unwrap(),
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(!staging.exists());
}

#[test]
fn test_report_command_exit_codes() {
    let staging = tempdir().unwrap();
    fs::write(staging.path().join("dc001.tgz"), vec![0u8; 64]).unwrap();
    let dir = staging.path().to_str().unwrap();

    let code = run(&["report", "--staging-dir", dir, "--size-limit", "100"]).unwrap();
    assert_eq!(code, ExitCode::Success);

    let code = run(&["report", "--staging-dir", dir, "--size-limit", "10", "-o", "json"]).unwrap();
    assert_eq!(code, ExitCode::Oversized);
}

#[test]
fn test_missing_scans_dir_is_general_error() {
    let root = tempdir().unwrap();
    let missing = root.path().join("missing");

    let err = run(&[
        "pack",
        "--scans-dir",
        missing.to_str().unwrap(),
        "--staging-dir",
        root.path().to_str().unwrap(),
    ])
    .unwrap_err();

    let structured = StructuredError::new(&err, ExitCode::GeneralError);
    assert_eq!(structured.code, "RP001");
    assert!(structured.message.contains("Scans directory not found"));
}

#[test]
fn test_missing_config_file_is_error() {
    let root = tempdir().unwrap();
    let config = root.path().join("nope.toml");

    let result = run(&["--config", config.to_str().unwrap(), "report"]);
    assert!(result.is_err());
}

#[test]
fn test_init_config_writes_and_refuses_overwrite() {
    let root = tempdir().unwrap();
    let path = root.path().join("rpacs.toml");
    let path_str = path.to_str().unwrap();

    assert_eq!(run(&["init-config", path_str]).unwrap(), ExitCode::Success);
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("size_limit = 80000000"));
    assert!(content.contains("t1_mp2rage_jose_UNI_Images"));

    assert!(run(&["init-config", path_str]).is_err());
    assert_eq!(
        run(&["init-config", path_str, "--force"]).unwrap(),
        ExitCode::Success
    );
}

#[test]
fn test_config_file_supplies_directories() {
    let scans = tempdir().unwrap();
    let staging = tempdir().unwrap();
    let root = tempdir().unwrap();
    add_case(scans.path(), "dc010");
    let config = root.path().join("rpacs.toml");
    fs::write(
        &config,
        format!(
            "scans_dir = {:?}\nstaging_dir = {:?}\n",
            scans.path().to_str().unwrap(),
            staging.path().to_str().unwrap()
        ),
    )
    .unwrap();

    let code = run(&["--config", config.to_str().unwrap(), "pack"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(staging.path().join("dc010.tgz").is_file());
}

#[test]
fn test_plot_rejects_out_of_range_scores() {
    let root = tempdir().unwrap();
    let csv = root.path().join("scores.csv");
    fs::write(&csv, "task,score\nSpelling,140\n").unwrap();

    let err = run(&["plot", csv.to_str().unwrap()]).unwrap_err();

    assert!(format!("{err:#}").contains("outside 0-100"));
    assert!(!root.path().join("scores.png").exists());
}

#[test]
fn test_plot_writes_png_next_to_csv() {
    let root = tempdir().unwrap();
    let csv = root.path().join("scores.csv");
    fs::write(&csv, "task,score\nWord reading,34\nSpelling,12.5\n").unwrap();

    let code = run(&["plot", csv.to_str().unwrap(), "--title", "dc001"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(root.path().join("scores.png").is_file());
}
