//! Repository service factory
//!
//! Creates repository services based on configuration.

use crate::auth::{get_github_auth, get_gitlab_auth};
use crate::error::Result;
use crate::platform::{GitHubService, GitLabService, RepositoryService};
use crate::types::{Platform, PlatformConfig};

/// Create a repository service from configuration
///
/// Handles authentication and client construction for both GitHub and GitLab.
pub async fn create_repository_service(
    config: &PlatformConfig,
) -> Result<Box<dyn RepositoryService>> {
    match config.platform {
        Platform::GitHub => {
            let auth = get_github_auth().await?;
            Ok(Box::new(GitHubService::new(
                &auth.token,
                config.owner.clone(),
                config.repo.clone(),
                config.host.clone(),
            )?))
        }
        Platform::GitLab => {
            let auth = get_gitlab_auth(config.host.as_deref()).await?;
            Ok(Box::new(GitLabService::new(
                auth.token,
                config.owner.clone(),
                config.repo.clone(),
                Some(auth.host),
            )))
        }
    }
}
