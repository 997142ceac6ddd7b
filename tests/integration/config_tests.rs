use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use rpacs_pack::cli::{Cli, Commands};
use rpacs_pack::config::Config;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use clap::Parser;

#[test]
fn test_config_load_defaults() {
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config.scan_prefixes, vec!["dc", "adys", "leegt"]);
    assert_eq!(config.scan_types.len(), 8);
    assert_eq!(config.derived_suffixes, vec![".nii", ".nii.gz"]);
    assert_eq!(config.size_limit, 80_000_000);
}

#[test]
fn test_config_load_from_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
scans_dir = "/data/Participants"
staging_dir = "/data/ResearchRadiologyPACS/Not_Uploaded"
scan_prefixes = ["dc"]
size_limit = 70000000
"#,
    )
    .unwrap();

    let config: Config = Config::figment(Some(&path)).extract().unwrap();

    assert_eq!(config.scans_dir, Some(PathBuf::from("/data/Participants")));
    assert_eq!(config.scan_prefixes, vec!["dc"]);
    assert_eq!(config.size_limit, 70_000_000);
    // Unset keys keep their defaults
    assert_eq!(config.scan_types.len(), 8);
}

#[test]
fn test_config_env_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "size_limit = 1000\n").unwrap();

    figment::Jail::expect_with(|jail| {
        jail.set_env("RPACS_TEST_SIZE_LIMIT", "2000");
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(&path))
            .merge(Env::prefixed("RPACS_TEST_"))
            .extract()?;
        assert_eq!(config.size_limit, 2000);
        Ok(())
    });
}

#[test]
fn test_pack_config_cli_overrides_config() {
    let config = Config {
        scans_dir: Some(PathBuf::from("/config/scans")),
        staging_dir: Some(PathBuf::from("/config/staging")),
        ..Default::default()
    };
    let cli = Cli::try_parse_from([
        "rpacs-pack",
        "pack",
        "--scans-dir",
        "/cli/scans",
        "--prefix",
        "pilot",
        "--size-limit",
        "10MB",
    ])
    .unwrap();
    let Commands::Pack(args) = cli.command else {
        panic!("Expected Pack command");
    };

    let pack = rpacs_pack::pack_config(&args, config).unwrap();

    assert_eq!(pack.scans_dir, PathBuf::from("/cli/scans"));
    assert_eq!(pack.staging_dir, PathBuf::from("/config/staging"));
    assert_eq!(pack.scan_prefixes, vec!["pilot"]);
    assert_eq!(pack.scan_types.len(), 8);
    assert_eq!(pack.size_limit, 10_000_000);
}

#[test]
fn test_pack_config_requires_directories() {
    let cli = Cli::try_parse_from(["rpacs-pack", "pack"]).unwrap();
    let Commands::Pack(args) = cli.command else {
        panic!("Expected Pack command");
    };

    let err = rpacs_pack::pack_config(&args, Config::default()).unwrap_err();
    assert!(err.to_string().contains("--scans-dir"));
}
