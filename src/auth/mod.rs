//! Authentication for GitHub and GitLab
//!
//! Tokens come from environment variables first (the usual case for a
//! deployed editor backend), then from the `gh`/`glab` CLIs.

mod github;
mod gitlab;

pub use github::{GitHubAuthConfig, get_github_auth, test_github_auth};
pub use gitlab::{GitLabAuthConfig, get_gitlab_auth, test_gitlab_auth};

use tokio::process::Command;

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh or glab)
    Cli,
    /// Token from environment variable
    EnvVar,
}

/// First non-empty value among the named environment variables
fn token_from_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Ask a host CLI for its token: `<program> auth status` then `<program> auth token`
async fn token_from_cli(program: &str, extra_args: &[&str]) -> Option<String> {
    // Check authenticated (also fails if the program is missing)
    let status = Command::new(program)
        .args(["auth", "status"])
        .args(extra_args)
        .output()
        .await
        .ok()?;

    if !status.status.success() {
        return None;
    }

    // Get token
    let output = Command::new(program)
        .args(["auth", "token"])
        .args(extra_args)
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}
