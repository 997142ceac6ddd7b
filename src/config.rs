//! Application configuration management.
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. Built-in defaults (the standard prefixes, scan types and 80 MB limit)
//! 2. `config.toml` in the platform config directory, or `--config FILE`
//! 3. Environment variables prefixed `RPACS_` (e.g. `RPACS_SIZE_LIMIT`)
//! 4. CLI flags, applied by the caller

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::packager::{
    to_strings, DEFAULT_DERIVED_SUFFIXES, DEFAULT_SCAN_PREFIXES, DEFAULT_SCAN_TYPES,
    DEFAULT_SIZE_LIMIT,
};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "RPACS_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one folder per case.
    pub scans_dir: Option<PathBuf>,
    /// Directory where archives are written (the "Not_Uploaded" folder).
    pub staging_dir: Option<PathBuf>,
    /// Case folder name prefixes, compared case-insensitively.
    pub scan_prefixes: Vec<String>,
    /// Scan subfolder allow-list, most important first.
    pub scan_types: Vec<String>,
    /// Suffixes of derived files stripped before archiving.
    pub derived_suffixes: Vec<String>,
    /// Archive size (bytes) above which a warning is printed.
    pub size_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scans_dir: None,
            staging_dir: None,
            scan_prefixes: to_strings(DEFAULT_SCAN_PREFIXES),
            scan_types: to_strings(DEFAULT_SCAN_TYPES),
            derived_suffixes: to_strings(DEFAULT_DERIVED_SUFFIXES),
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// With `explicit` set, that file must exist. Otherwise the platform
    /// config file is used when present.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing or any layer fails to
    /// parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::config_path().ok().filter(|p| p.is_file()),
        };

        if let Some(ref path) = file {
            log::debug!("Loading config from {}", path.display());
        }

        Self::figment(file.as_deref())
            .extract()
            .context("Failed to load configuration")
    }

    /// The figment used by [`Config::load`].
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Write the configuration as TOML to `path`, or the platform default.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Get the default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Returns an error when no home directory can be determined.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "rpacs-pack", "rpacs-pack")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }
}
