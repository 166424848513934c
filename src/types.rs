//! Core types for gitcms

use serde::{Deserialize, Serialize};

/// A pull request / merge request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR/MR number
    pub number: u64,
    /// Web URL for the PR/MR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR/MR title
    pub title: String,
}

/// A file as stored on one branch, with the marker needed to update it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRevision {
    /// Repository-relative path
    pub path: String,
    /// Decoded file bytes
    pub content: Vec<u8>,
    /// Opaque host token identifying this version (blob SHA, last commit id)
    pub revision: String,
}

/// A branch and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name
    pub name: String,
    /// Tip commit SHA
    pub sha: String,
}

/// Hosting platform type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// GitHub or GitHub Enterprise
    GitHub,
    /// GitLab or self-hosted GitLab
    GitLab,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => write!(f, "github"),
            Self::GitLab => write!(f, "gitlab"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(Self::GitHub),
            "gitlab" => Ok(Self::GitLab),
            other => Err(crate::error::Error::Config(format!(
                "unknown platform '{other}' (expected github or gitlab)"
            ))),
        }
    }
}

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Platform type
    pub platform: Platform,
    /// Repository owner (user, organization or GitLab group path)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com/gitlab.com).
    ///
    /// A bare hostname selects an Enterprise/self-hosted instance; a value
    /// starting with `http://` or `https://` is used verbatim as the API base.
    pub host: Option<String>,
}

impl PlatformConfig {
    /// Base URL for REST calls
    pub fn api_base_url(&self) -> String {
        match (&self.host, self.platform) {
            (Some(h), _) if h.starts_with("http://") || h.starts_with("https://") => {
                h.trim_end_matches('/').to_string()
            }
            (Some(h), Platform::GitHub) => format!("https://{h}/api/v3"),
            (Some(h), Platform::GitLab) => format!("https://{h}/api/v4"),
            (None, Platform::GitHub) => "https://api.github.com".to_string(),
            (None, Platform::GitLab) => "https://gitlab.com/api/v4".to_string(),
        }
    }

    /// `owner/repo` form
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
