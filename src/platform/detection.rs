//! Repository detection from remote URLs and `owner/repo` specs

use crate::error::{Error, Result};
use crate::types::{Platform, PlatformConfig};
use regex::Regex;
use std::env;
use std::sync::OnceLock;

/// Detect platform (GitHub or GitLab) from a remote URL
pub fn detect_platform(url: &str) -> Option<Platform> {
    let gh_host = env::var("GH_HOST").ok();
    let gitlab_host = env::var("GITLAB_HOST").ok();

    let hostname = extract_hostname(url)?;

    // Check GitHub
    if hostname == "github.com"
        || hostname.ends_with(".github.com")
        || gh_host.as_ref().is_some_and(|h| hostname == *h)
    {
        return Some(Platform::GitHub);
    }

    // Check GitLab
    if hostname == "gitlab.com"
        || hostname.ends_with(".gitlab.com")
        || gitlab_host.as_ref().is_some_and(|h| hostname == *h)
    {
        return Some(Platform::GitLab);
    }

    None
}

/// Parse repository info (owner/repo) from a remote URL
pub fn parse_repo_info(url: &str) -> Result<PlatformConfig> {
    let platform = detect_platform(url)
        .ok_or_else(|| Error::Parse(format!("unsupported repository host: {url}")))?;
    let hostname = extract_hostname(url);

    // SSH format: git@host:owner/repo.git
    // HTTPS format: https://host/owner/repo.git
    let path = ssh_regex()
        .captures(url)
        .or_else(|| https_regex().captures(url))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::Parse(format!("cannot parse remote URL: {url}")))?;

    let (owner, repo) = split_repo_path(path)?;

    // Determine if self-hosted
    let default_host = match platform {
        Platform::GitHub => "github.com",
        Platform::GitLab => "gitlab.com",
    };
    let host = hostname.filter(|h| h != default_host);

    Ok(PlatformConfig {
        platform,
        owner,
        repo,
        host,
    })
}

/// Parse a repository given as `owner/repo` or as a remote URL
///
/// The `owner/repo` form takes its platform and host from the arguments;
/// a URL carries its own.
pub fn parse_repository(
    spec: &str,
    platform: Platform,
    host: Option<String>,
) -> Result<PlatformConfig> {
    let spec = spec.trim();
    if spec.contains("://") || spec.starts_with("git@") {
        return parse_repo_info(spec);
    }

    let (owner, repo) = split_repo_path(spec.trim_end_matches(".git"))?;
    Ok(PlatformConfig {
        platform,
        owner,
        repo,
        host,
    })
}

/// Split `owner/repo` (GitLab allows nested groups in the owner part)
fn split_repo_path(path: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
    if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
        return Err(Error::Parse(format!("invalid repo path: {path}")));
    }

    let (repo, owner) = parts
        .split_last()
        .ok_or_else(|| Error::Parse(format!("invalid repo path: {path}")))?;
    Ok((owner.join("/"), (*repo).to_string()))
}

fn ssh_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"git@[^:]+:(.+?)(?:\.git)?$").expect("hardcoded SSH pattern is valid")
    })
}

fn https_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"https?://[^/]+/(.+?)(?:\.git)?/?$").expect("hardcoded HTTPS pattern is valid")
    })
}

fn extract_hostname(url: &str) -> Option<String> {
    // SSH format
    if url.starts_with("git@") {
        return url
            .strip_prefix("git@")
            .and_then(|s| s.split(':').next())
            .map(ToString::to_string);
    }

    // HTTPS format
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_github_https() {
        assert_eq!(
            detect_platform("https://github.com/owner/repo.git"),
            Some(Platform::GitHub)
        );
    }

    #[test]
    fn test_detect_github_ssh() {
        assert_eq!(
            detect_platform("git@github.com:owner/repo.git"),
            Some(Platform::GitHub)
        );
    }

    #[test]
    fn test_detect_gitlab_https() {
        assert_eq!(
            detect_platform("https://gitlab.com/owner/repo.git"),
            Some(Platform::GitLab)
        );
    }

    #[test]
    fn test_parse_github_repo() {
        let config = parse_repo_info("https://github.com/owner/repo.git").unwrap();
        assert_eq!(config.platform, Platform::GitHub);
        assert_eq!(config.owner, "owner");
        assert_eq!(config.repo, "repo");
        assert!(config.host.is_none());
    }

    #[test]
    fn test_parse_gitlab_nested_groups() {
        let config = parse_repo_info("https://gitlab.com/group/subgroup/repo.git").unwrap();
        assert_eq!(config.platform, Platform::GitLab);
        assert_eq!(config.owner, "group/subgroup");
        assert_eq!(config.repo, "repo");
    }

    #[test]
    fn test_parse_repository_owner_repo() {
        let config = parse_repository("sharjicodes/CMS-POC", Platform::GitHub, None).unwrap();
        assert_eq!(config.full_name(), "sharjicodes/CMS-POC");
        assert_eq!(config.platform, Platform::GitHub);
    }

    #[test]
    fn test_parse_repository_url_overrides_platform() {
        let config =
            parse_repository("git@gitlab.com:team/site.git", Platform::GitHub, None).unwrap();
        assert_eq!(config.platform, Platform::GitLab);
        assert_eq!(config.owner, "team");
        assert_eq!(config.repo, "site");
    }

    #[test]
    fn test_parse_repository_rejects_bare_name() {
        assert!(parse_repository("site", Platform::GitHub, None).is_err());
        assert!(parse_repository("owner/", Platform::GitHub, None).is_err());
    }
}
