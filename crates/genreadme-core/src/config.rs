//! Configuration file loading.
//!
//! Repository coordinates and output defaults can be kept in a TOML file so
//! they do not have to be repeated on every invocation.
//!
//! ## Lookup Order
//!
//! 1. An explicit path (`--config`); it is an error if it does not exist
//! 2. `.gen-readme.toml` in the addons directory, then in the current directory
//! 3. `config.toml` in the user config directory (`GEN_README_CONFIG_DIR`
//!    overrides the platform location)
//! 4. Built-in defaults
//!
//! Only the first file found is read; files are not merged.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [repository]
//! org_name = "ingadhoc"
//! repo_name = "account-financial-tools"
//! branch = "16.0"
//!
//! [output]
//! gen_html = true
//! toc_threshold = 1000
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-project configuration file.
pub const CONFIG_FILE_NAME: &str = ".gen-readme.toml";

/// Environment variable overriding the user config directory.
pub const CONFIG_DIR_ENV: &str = "GEN_README_CONFIG_DIR";

/// Fragment size above which a table of contents is added.
pub const DEFAULT_TOC_THRESHOLD: usize = 1000;

/// Settings read from a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the addons are published.
    pub repository: RepositoryConfig,
    /// What gets written.
    pub output: OutputConfig,
}

/// Repository coordinates. Each may also come from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    /// GitHub organisation.
    pub org_name: Option<String>,
    /// Repository name.
    pub repo_name: Option<String>,
    /// Branch the addons live on.
    pub branch: Option<String>,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Also write `static/description/index.html`.
    pub gen_html: bool,
    /// Fragment size above which a table of contents is added.
    pub toc_threshold: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            gen_html: false,
            toc_threshold: DEFAULT_TOC_THRESHOLD,
        }
    }
}

/// A configuration together with the file it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedConfig {
    /// The parsed settings.
    pub config: Config,
    /// `None` when built-in defaults are in use.
    pub source: Option<PathBuf>,
}

impl Config {
    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Locate and parse the configuration, following the lookup order.
    pub fn load(explicit: Option<&Path>, addons_dir: Option<&Path>) -> Result<LoadedConfig> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(Error::NotFound(format!("config file {}", path.display())));
            }
            return Ok(LoadedConfig {
                config: Self::from_file(path)?,
                source: Some(path.to_path_buf()),
            });
        }
        Self::load_first(&Self::candidates(addons_dir))
    }

    /// Parse the first existing file among `candidates`, or fall back to defaults.
    pub fn load_first(candidates: &[PathBuf]) -> Result<LoadedConfig> {
        for path in candidates {
            if path.is_file() {
                debug!("using config {}", path.display());
                return Ok(LoadedConfig {
                    config: Self::from_file(path)?,
                    source: Some(path.clone()),
                });
            }
            debug!("no config at {}", path.display());
        }
        Ok(LoadedConfig::default())
    }

    /// Candidate files in lookup order, excluding an explicit path.
    #[must_use]
    pub fn candidates(addons_dir: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(3);
        if let Some(dir) = addons_dir {
            candidates.push(dir.join(CONFIG_FILE_NAME));
        }
        if let Ok(cwd) = std::env::current_dir() {
            let path = cwd.join(CONFIG_FILE_NAME);
            if !candidates.contains(&path) {
                candidates.push(path);
            }
        }
        if let Some(path) = Self::user_config_path() {
            candidates.push(path);
        }
        candidates
    }

    /// `config.toml` in the user config directory.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Some(PathBuf::from(dir).join("config.toml"));
        }
        directories::ProjectDirs::from("dev", "jobiols", "gen-readme")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
