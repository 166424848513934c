//! Repository services for GitHub and GitLab
//!
//! Provides a unified interface for the file, branch and PR/MR operations
//! the publish workflow needs.

mod detection;
mod factory;
mod github;
mod gitlab;

pub use detection::{detect_platform, parse_repo_info, parse_repository};
pub use factory::create_repository_service;
pub use github::GitHubService;
pub use gitlab::GitLabService;

use crate::error::{Error, Result};
use crate::types::{Branch, FileRevision, PlatformConfig, PullRequest};
use async_trait::async_trait;

/// Repository service trait for hosted source-control operations
///
/// Every method is a single request (or a fixed sequence for provided
/// methods) against the host. Nothing here retries; callers re-run the
/// whole operation instead.
#[async_trait]
pub trait RepositoryService: Send + Sync {
    /// Read a file and its revision marker on a branch
    ///
    /// Returns `Ok(None)` when the path does not exist there.
    async fn get_file_revision(&self, path: &str, branch: &str) -> Result<Option<FileRevision>>;

    /// Create or update a file, appending one commit to `branch`
    ///
    /// With `revision` the host performs a compare-and-swap update and fails
    /// with [`Error::Conflict`] if the file moved on. Without it the host
    /// creates the file and fails with [`Error::AlreadyExists`] if present.
    async fn upsert_file(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        branch: &str,
        revision: Option<&str>,
    ) -> Result<()>;

    /// Look up a branch
    async fn get_branch(&self, name: &str) -> Result<Option<Branch>>;

    /// Create a branch pointing at a commit
    async fn create_branch(&self, name: &str, sha: &str) -> Result<Branch>;

    /// Make sure `name` exists, creating it from the tip of `base` if not
    ///
    /// Returns whether a branch was created. A branch created by someone
    /// else between the lookup and the create counts as existing. Fails with
    /// [`Error::BaseNotFound`] when `base` is missing.
    async fn ensure_branch(&self, name: &str, base: &str) -> Result<bool> {
        if self.get_branch(name).await?.is_some() {
            return Ok(false);
        }

        let base_branch = self
            .get_branch(base)
            .await?
            .ok_or_else(|| Error::BaseNotFound(base.to_string()))?;

        match self.create_branch(name, &base_branch.sha).await {
            Ok(_) => Ok(true),
            Err(Error::AlreadyExists { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Find an open PR from `head` into `base`
    async fn find_open_pr(&self, head: &str, base: &str) -> Result<Option<PullRequest>>;

    /// Create a PR from `head` into `base`.
    ///
    /// Rejects `head == base` locally, then delegates to [`open_pr`].
    /// Implementors should override `open_pr`, not this method.
    ///
    /// [`open_pr`]: Self::open_pr
    async fn create_pr(&self, title: &str, body: &str, head: &str, base: &str) -> Result<PullRequest> {
        if head == base {
            return Err(Error::Validation(format!(
                "cannot open a pull request from '{head}' into itself"
            )));
        }
        self.open_pr(title, body, head, base).await
    }

    /// Host-specific PR creation. Call [`create_pr`](Self::create_pr) instead.
    async fn open_pr(&self, title: &str, body: &str, head: &str, base: &str) -> Result<PullRequest>;

    /// Names of files directly under `path` on `branch` (empty if missing)
    async fn list_directory(&self, path: &str, branch: &str) -> Result<Vec<String>>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}

/// Percent-encode each segment of a repository path, keeping `/`
pub(crate) fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
