//! Progress callback trait for interface-agnostic updates
//!
//! This trait allows different front ends (CLI, HTTP handler) to receive
//! progress updates while a publish runs.

use crate::publish::FileStatus;
use crate::types::PullRequest;
use async_trait::async_trait;
use std::fmt;

/// Publish phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Mapping slug to path and branches
    ResolvingTargets,
    /// Making sure the work branch exists
    EnsuringBranch,
    /// Fetching the current revision marker
    ReadingRevision,
    /// Creating or updating the content file
    WritingFile,
    /// Finding or opening the pull request
    ResolvingPullRequest,
    /// Publish complete
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ResolvingTargets => "Resolving targets",
            Self::EnsuringBranch => "Ensuring work branch",
            Self::ReadingRevision => "Reading current revision",
            Self::WritingFile => "Writing content",
            Self::ResolvingPullRequest => "Resolving pull request",
            Self::Complete => "Done",
        };
        f.write_str(s)
    }
}

/// Progress callback trait
///
/// Implement this trait to receive progress updates during a publish.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called once the work branch is known to exist
    async fn on_branch(&self, branch: &str, created: bool);

    /// Called after the content file step
    async fn on_file(&self, path: &str, status: FileStatus);

    /// Called once the pull request is known
    async fn on_pull_request(&self, pr: &PullRequest, created: bool);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_branch(&self, _branch: &str, _created: bool) {}
    async fn on_file(&self, _path: &str, _status: FileStatus) {}
    async fn on_pull_request(&self, _pr: &PullRequest, _created: bool) {}
}
