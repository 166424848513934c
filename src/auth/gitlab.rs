//! GitLab authentication

use crate::auth::{AuthSource, token_from_cli, token_from_env};
use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::env;

/// GitLab authentication configuration
#[derive(Debug, Clone)]
pub struct GitLabAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
    /// GitLab host (e.g., "gitlab.com")
    pub host: String,
}

/// Get GitLab authentication
///
/// Priority:
/// 1. `GITLAB_TOKEN` environment variable
/// 2. `GL_TOKEN` environment variable
/// 3. glab CLI (`glab auth token`)
pub async fn get_gitlab_auth(host: Option<&str>) -> Result<GitLabAuthConfig> {
    let host = host
        .map(String::from)
        .or_else(|| env::var("GITLAB_HOST").ok())
        .unwrap_or_else(|| "gitlab.com".to_string());

    if let Some(token) = token_from_env(&["GITLAB_TOKEN", "GL_TOKEN"]) {
        return Ok(GitLabAuthConfig {
            token,
            source: AuthSource::EnvVar,
            host,
        });
    }

    if let Some(token) = token_from_cli("glab", &["--hostname", &host]).await {
        return Ok(GitLabAuthConfig {
            token,
            source: AuthSource::Cli,
            host,
        });
    }

    Err(Error::Auth(
        "No GitLab authentication found. Set GITLAB_TOKEN or run `glab auth login`".to_string(),
    ))
}

#[derive(Deserialize)]
struct GitLabUser {
    username: String,
}

/// Test GitLab authentication, returning the authenticated username
pub async fn test_gitlab_auth(config: &GitLabAuthConfig) -> Result<String> {
    let url = if config.host.starts_with("http://") || config.host.starts_with("https://") {
        format!("{}/user", config.host.trim_end_matches('/'))
    } else {
        format!("https://{}/api/v4/user", config.host)
    };

    let user: GitLabUser = Client::new()
        .get(&url)
        .header("PRIVATE-TOKEN", &config.token)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| Error::Auth(format!("Invalid token: {e}")))?
        .json()
        .await?;

    Ok(user.username)
}
