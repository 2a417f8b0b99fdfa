//! Merging command-line flags with the configuration file.
//!
//! Precedence: flag or environment variable, then the config file, then the
//! built-in default. Boolean flags can only switch an option on.

use anyhow::anyhow;
use genreadme_core::{Config, GenerateOptions, LoadedConfig, Repository};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::Cli;
use crate::error::CliError;

/// Everything a batch run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// Where the addons are published.
    pub repo: Repository,
    /// What to produce.
    pub options: GenerateOptions,
    /// The config file that was read, if any.
    pub config_source: Option<PathBuf>,
}

/// Load the configuration and merge it with the flags.
pub fn resolve_settings(cli: &Cli, addons_dir: Option<&Path>) -> Result<ResolvedSettings, CliError> {
    let loaded = Config::load(cli.config.as_deref(), addons_dir)?;
    merge(cli, loaded)
}

/// Merge already loaded configuration with the flags.
pub fn merge(cli: &Cli, loaded: LoadedConfig) -> Result<ResolvedSettings, CliError> {
    let LoadedConfig { config, source } = loaded;
    let repository = config.repository;

    let org_name = cli.org_name.clone().or(repository.org_name);
    let repo_name = cli.repo_name.clone().or(repository.repo_name);
    let branch = cli.branch.clone().or(repository.branch);

    let (Some(org_name), Some(repo_name), Some(branch)) = (org_name.clone(), repo_name.clone(), branch.clone())
    else {
        let missing: Vec<&str> = [
            (org_name.is_none(), "--org-name (GEN_README_ORG)"),
            (repo_name.is_none(), "--repo-name (GEN_README_REPO)"),
            (branch.is_none(), "--branch (GEN_README_BRANCH)"),
        ]
        .into_iter()
        .filter_map(|(absent, name)| absent.then_some(name))
        .collect();
        return Err(CliError::usage(anyhow!(
            "missing repository settings: {}; pass them as flags or set them under [repository] in {}",
            missing.join(", "),
            genreadme_core::config::CONFIG_FILE_NAME
        )));
    };

    let options = GenerateOptions {
        gen_html: cli.gen_html || config.output.gen_html,
        check: cli.check,
        init_fragments: cli.init_fragments,
        toc_threshold: config.output.toc_threshold,
    };
    debug!("repository {org_name}/{repo_name}@{branch}, {options:?}");

    Ok(ResolvedSettings {
        repo: Repository::new(org_name, repo_name, branch),
        options,
        config_source: source,
    })
}
