//! Publish execution
//!
//! Runs the branch-ensure, read-marker, upsert, find-or-create-PR sequence
//! against a [`RepositoryService`].

use crate::content::{ContentRecord, Slug, from_module_bytes, to_module};
use crate::error::{Error, Result};
use crate::platform::RepositoryService;
use crate::publish::{Phase, ProgressCallback};
use crate::types::PullRequest;
use std::fmt;
use tracing::{debug, info};

/// Branches, paths and messages used when publishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    /// Shared branch all pending edits land on
    pub work_branch: String,
    /// Branch pull requests target
    pub base_branch: String,
    /// Repository directory holding content modules
    pub content_dir: String,
    /// Commit message template; `{slug}` is replaced
    pub commit_message: String,
    /// Title for a newly opened pull request
    pub pr_title: String,
    /// Body for a newly opened pull request
    pub pr_body: String,
    /// Branches that are never written directly
    pub protected_branches: Vec<String>,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            work_branch: "development".to_string(),
            base_branch: "main".to_string(),
            content_dir: "content".to_string(),
            commit_message: "Update {slug} content via CMS".to_string(),
            pr_title: "Content Update from CMS".to_string(),
            pr_body: "This PR was automatically created by the CMS. Please review the changes."
                .to_string(),
            protected_branches: vec!["main".to_string(), "master".to_string()],
        }
    }
}

impl PublishOptions {
    /// Refuse configurations that would write to the base or a protected branch
    pub fn validate(&self) -> Result<()> {
        if self.work_branch.trim().is_empty() || self.base_branch.trim().is_empty() {
            return Err(Error::Validation(
                "work and base branch names must not be empty".to_string(),
            ));
        }
        if self.work_branch == self.base_branch {
            return Err(Error::Validation(format!(
                "work branch '{}' is the base branch; edits must go through review",
                self.work_branch
            )));
        }
        if self.protected_branches.contains(&self.work_branch) {
            return Err(Error::Validation(format!(
                "refusing to write to protected branch '{}'",
                self.work_branch
            )));
        }
        Ok(())
    }

    /// Commit message for one slug
    pub fn commit_message_for(&self, slug: &Slug) -> String {
        self.commit_message.replace("{slug}", slug.as_str())
    }

    /// Map a raw slug to its path and branches
    ///
    /// Fails with [`Error::Validation`] for a bad slug or a work branch that
    /// would write to base.
    pub fn resolve_targets(&self, slug: &str) -> Result<PublishTarget> {
        let slug = Slug::parse(slug)?;
        self.validate()?;
        let path = slug.content_path(&self.content_dir);

        Ok(PublishTarget {
            slug,
            path,
            work_branch: self.work_branch.clone(),
            base_branch: self.base_branch.clone(),
        })
    }

    /// Render what a publish would write
    pub fn preview(&self, slug: &str, record: &ContentRecord) -> Result<PublishPreview> {
        let target = self.resolve_targets(slug)?;
        let module = to_module(record)?;
        let commit_message = self.commit_message_for(&target.slug);
        Ok(PublishPreview {
            target,
            module,
            commit_message,
        })
    }
}

/// Where a publish writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    /// Content unit
    pub slug: Slug,
    /// Repository path of its module
    pub path: String,
    /// Branch receiving the commit
    pub work_branch: String,
    /// Branch the pull request targets
    pub base_branch: String,
}

/// What happened to the content file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// File did not exist on the work branch and was created
    Created,
    /// Existing file was updated against its revision marker
    Updated,
    /// Work branch already held identical bytes; nothing was committed
    Unchanged,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Result of a successful publish
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    /// Where the content went
    pub target: PublishTarget,
    /// Whether the work branch had to be created
    pub branch_created: bool,
    /// Create, update or no-op
    pub file_status: FileStatus,
    /// The open pull request carrying the change
    pub pull_request: PullRequest,
    /// Whether that pull request was opened by this call
    pub pr_created: bool,
}

/// A publish rendered without touching the host
#[derive(Debug, Clone)]
pub struct PublishPreview {
    /// Where the content would go
    pub target: PublishTarget,
    /// Module text that would be written
    pub module: String,
    /// Commit message that would be used
    pub commit_message: String,
}

/// Orchestrates publishing content records through a repository service
pub struct PublishWorkflow<'a> {
    service: &'a dyn RepositoryService,
    options: PublishOptions,
}

impl<'a> PublishWorkflow<'a> {
    /// Create a workflow over a service
    pub fn new(service: &'a dyn RepositoryService, options: PublishOptions) -> Self {
        Self { service, options }
    }

    /// Options in effect
    pub const fn options(&self) -> &PublishOptions {
        &self.options
    }

    /// Map a raw slug to its path and branches
    pub fn resolve_targets(&self, slug: &str) -> Result<PublishTarget> {
        self.options.resolve_targets(slug)
    }

    /// Render what [`publish`](Self::publish) would write, with no remote calls
    pub fn preview(&self, slug: &str, record: &ContentRecord) -> Result<PublishPreview> {
        self.options.preview(slug, record)
    }

    /// Publish a record for review
    ///
    /// Safe to re-run after a partial failure: the branch step is idempotent,
    /// the marker is re-read every time and an open PR is reused. Errors from
    /// the host propagate unchanged; nothing is rolled back.
    pub async fn publish(
        &self,
        slug: &str,
        record: &ContentRecord,
        progress: &dyn ProgressCallback,
    ) -> Result<PublishOutcome> {
        progress.on_phase(Phase::ResolvingTargets).await;
        let target = self.resolve_targets(slug)?;
        let module = to_module(record)?;
        let bytes = module.as_bytes();
        let work = target.work_branch.as_str();
        let base = target.base_branch.as_str();

        progress.on_phase(Phase::EnsuringBranch).await;
        let branch_created = self.service.ensure_branch(work, base).await?;
        if branch_created {
            info!(branch = work, base, "created work branch");
        }
        progress.on_branch(work, branch_created).await;

        progress.on_phase(Phase::ReadingRevision).await;
        let current = self.service.get_file_revision(&target.path, work).await?;

        progress.on_phase(Phase::WritingFile).await;
        let message = self.options.commit_message_for(&target.slug);
        let file_status = match current {
            Some(ref existing) if existing.content == bytes => {
                debug!(path = %target.path, "content unchanged, skipping write");
                FileStatus::Unchanged
            }
            Some(ref existing) => {
                self.service
                    .upsert_file(&target.path, bytes, &message, work, Some(&existing.revision))
                    .await?;
                FileStatus::Updated
            }
            None => {
                self.service
                    .upsert_file(&target.path, bytes, &message, work, None)
                    .await?;
                FileStatus::Created
            }
        };
        if file_status != FileStatus::Unchanged {
            info!(path = %target.path, branch = work, status = %file_status, "committed content");
        }
        progress.on_file(&target.path, file_status).await;

        progress.on_phase(Phase::ResolvingPullRequest).await;
        let (pull_request, pr_created) = match self.service.find_open_pr(work, base).await? {
            Some(pr) => (pr, false),
            None => {
                let pr = self
                    .service
                    .create_pr(&self.options.pr_title, &self.options.pr_body, work, base)
                    .await?;
                info!(pr_number = pr.number, head = work, base, "opened pull request");
                (pr, true)
            }
        };
        progress.on_pull_request(&pull_request, pr_created).await;

        progress.on_phase(Phase::Complete).await;

        Ok(PublishOutcome {
            target,
            branch_created,
            file_status,
            pull_request,
            pr_created,
        })
    }

    /// Read a content unit from a branch (`None` if absent there)
    pub async fn load(&self, slug: &str, branch: &str) -> Result<Option<ContentRecord>> {
        let slug = Slug::parse(slug)?;
        let path = slug.content_path(&self.options.content_dir);
        match self.service.get_file_revision(&path, branch).await? {
            Some(revision) => Ok(Some(from_module_bytes(&revision.content)?)),
            None => Ok(None),
        }
    }

    /// Read the newest version of a content unit: pending edits first, then base
    ///
    /// Returns the record together with the branch it came from.
    pub async fn load_latest(&self, slug: &str) -> Result<Option<(ContentRecord, String)>> {
        for branch in [&self.options.work_branch, &self.options.base_branch] {
            if let Some(record) = self.load(slug, branch).await? {
                return Ok(Some((record, branch.clone())));
            }
        }
        Ok(None)
    }

    /// Content units present on a branch, sorted
    pub async fn list_slugs(&self, branch: &str) -> Result<Vec<Slug>> {
        let names = self
            .service
            .list_directory(&self.options.content_dir, branch)
            .await?;
        let mut slugs: Vec<Slug> = names
            .iter()
            .filter_map(|name| Slug::from_file_name(name))
            .collect();
        slugs.sort();
        slugs.dedup();
        Ok(slugs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_valid() {
        assert!(PublishOptions::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_work_equal_base() {
        let options = PublishOptions {
            work_branch: "main".to_string(),
            ..PublishOptions::default()
        };
        assert!(matches!(options.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_protected_work_branch() {
        let options = PublishOptions {
            work_branch: "master".to_string(),
            ..PublishOptions::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("protected branch 'master'"));
    }

    #[test]
    fn test_rejects_empty_branch() {
        let options = PublishOptions {
            work_branch: " ".to_string(),
            ..PublishOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_preview_resolves_path_and_message() {
        let record = ContentRecord::new().with("title", "Hi");
        let preview = PublishOptions::default().preview("home", &record).unwrap();
        assert_eq!(preview.target.path, "content/home.ts");
        assert_eq!(preview.target.work_branch, "development");
        assert_eq!(preview.commit_message, "Update home content via CMS");
        assert!(preview.module.contains("\"title\": \"Hi\""));
    }

    #[test]
    fn test_preview_rejects_bad_slug() {
        let record = ContentRecord::new();
        let err = PublishOptions::default()
            .preview("../etc/passwd", &record)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_commit_message_template() {
        let slug = Slug::parse("home").unwrap();
        assert_eq!(
            PublishOptions::default().commit_message_for(&slug),
            "Update home content via CMS"
        );
    }
}
