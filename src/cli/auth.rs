//! Auth command - test and explain authentication

use crate::cli::style::{Stylize, check};
use anstream::println;
use gitcms::auth::{get_github_auth, get_gitlab_auth, test_github_auth, test_gitlab_auth};
use gitcms::config::load_config;
use gitcms::error::Result;
use gitcms::types::Platform;
use std::path::Path;

/// Run the auth test command
///
/// The configured host is used when the configured platform matches.
pub async fn run_auth_test(config_path: Option<&Path>, platform: Platform) -> Result<()> {
    let config = load_config(config_path)?;
    let host = if config.repository.platform == platform {
        config.repository.host.clone()
    } else {
        None
    };

    println!("Testing {} authentication...", platform.emphasis());
    match platform {
        Platform::GitHub => {
            let auth = get_github_auth().await?;
            let api = host.as_ref().map(|_| config.repository.api_base_url());
            let username = test_github_auth(&auth, api.as_deref()).await?;
            println!("{} Authenticated as {}", check(), username.accent());
            println!("  {} {:?}", "Token source:".muted(), auth.source);
        }
        Platform::GitLab => {
            let auth = get_gitlab_auth(host.as_deref()).await?;
            let username = test_gitlab_auth(&auth).await?;
            println!("{} Authenticated as {}", check(), username.accent());
            println!("  {} {:?}", "Token source:".muted(), auth.source);
            println!("  {} {}", "Host:".muted(), auth.host);
        }
    }
    Ok(())
}

/// Run the auth setup command (show instructions)
pub fn run_auth_setup(platform: Platform) {
    match platform {
        Platform::GitHub => {
            println!("{}", "GitHub Authentication Setup".emphasis());
            println!();
            println!("Option 1: Environment variable (servers, CI)");
            println!("  Set GITHUB_TOKEN or GH_TOKEN to a token with contents and pull request write access");
            println!();
            println!("Option 2: GitHub CLI");
            println!("  Install: https://cli.github.com/");
            println!("  Run: gh auth login");
            println!();
            println!("For GitHub Enterprise:");
            println!("  Set host in gitcms.toml or GITCMS_HOST");
        }
        Platform::GitLab => {
            println!("{}", "GitLab Authentication Setup".emphasis());
            println!();
            println!("Option 1: Environment variable (servers, CI)");
            println!("  Set GITLAB_TOKEN or GL_TOKEN to a token with the api scope");
            println!();
            println!("Option 2: GitLab CLI (glab)");
            println!("  Install: https://gitlab.com/gitlab-org/cli");
            println!("  Run: glab auth login");
            println!();
            println!("For self-hosted GitLab:");
            println!("  Set host in gitcms.toml, GITCMS_HOST or GITLAB_HOST");
        }
    }
}
