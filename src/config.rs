//! Configuration loading
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! environment variables. The resolution itself is a pure function over the
//! file contents and an environment lookup so it can be tested directly.

use crate::error::{Error, Result};
use crate::platform::parse_repository;
use crate::publish::PublishOptions;
use crate::types::{Platform, PlatformConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Repository used when neither file nor environment names one
pub const DEFAULT_REPOSITORY: &str = "sharjicodes/CMS-POC";

/// Config file name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "gitcms.toml";

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct CmsConfig {
    /// Which repository to publish into
    pub repository: PlatformConfig,
    /// Branches, paths and messages used by the publish workflow
    pub publish: PublishOptions,
}

/// On-disk configuration; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// `github` or `gitlab`
    pub platform: Option<String>,
    /// `owner/repo` or a remote URL
    pub repository: Option<String>,
    /// Enterprise/self-hosted host or API base URL
    pub host: Option<String>,
    /// Shared branch edits land on
    pub work_branch: Option<String>,
    /// Branch pull requests target
    pub base_branch: Option<String>,
    /// Directory holding content modules
    pub content_dir: Option<String>,
    /// Commit message template (`{slug}` is replaced)
    pub commit_message: Option<String>,
    /// Title for newly opened pull requests
    pub pr_title: Option<String>,
    /// Body for newly opened pull requests
    pub pr_body: Option<String>,
    /// Branches that must never be written directly
    pub protected_branches: Option<Vec<String>>,
}

impl FileConfig {
    /// Parse TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

/// Where to look for a config file, in order
pub fn config_search_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }

    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("gitcms").join("config.toml"));
    }
    paths
}

/// Load configuration from disk and the process environment
///
/// An explicit path must exist; the default locations are optional.
pub fn load_config(explicit: Option<&Path>) -> Result<CmsConfig> {
    let file = if let Some(path) = explicit {
        Some(FileConfig::read(path)?)
    } else {
        config_search_paths(None)
            .into_iter()
            .find(|p| p.is_file())
            .map(|p| {
                debug!(path = %p.display(), "loading config file");
                FileConfig::read(&p)
            })
            .transpose()?
    };

    resolve_config(file.unwrap_or_default(), |name| std::env::var(name).ok())
}

/// Combine file settings with environment overrides
pub fn resolve_config(
    file: FileConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<CmsConfig> {
    let env = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let platform = env("GITCMS_PLATFORM")
        .or(file.platform)
        .map(|p| p.parse::<Platform>())
        .transpose()?
        .unwrap_or(Platform::GitHub);

    let host = env("GITCMS_HOST").or(file.host);

    let repository_spec = env("GITCMS_REPOSITORY")
        .or_else(|| env("GITHUB_REPOSITORY"))
        .or(file.repository)
        .unwrap_or_else(|| DEFAULT_REPOSITORY.to_string());

    let repository = parse_repository(&repository_spec, platform, host)
        .map_err(|e| Error::Config(format!("repository '{repository_spec}': {e}")))?;

    let defaults = PublishOptions::default();
    let publish = PublishOptions {
        work_branch: env("GITCMS_WORK_BRANCH")
            .or(file.work_branch)
            .unwrap_or(defaults.work_branch),
        base_branch: env("GITCMS_BASE_BRANCH")
            .or(file.base_branch)
            .unwrap_or(defaults.base_branch),
        content_dir: env("GITCMS_CONTENT_DIR")
            .or(file.content_dir)
            .unwrap_or(defaults.content_dir),
        commit_message: file.commit_message.unwrap_or(defaults.commit_message),
        pr_title: file.pr_title.unwrap_or(defaults.pr_title),
        pr_body: file.pr_body.unwrap_or(defaults.pr_body),
        protected_branches: file
            .protected_branches
            .unwrap_or(defaults.protected_branches),
    };

    Ok(CmsConfig {
        repository,
        publish,
    })
}
