//! GitHub repository service implementation

use crate::error::{Error, Result};
use crate::platform::{RepositoryService, encode_path};
use crate::types::{Branch, FileRevision, Platform, PlatformConfig, PullRequest};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::debug;

// REST payloads for the contents and git refs endpoints

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    File(FileContents),
    Directory(Vec<DirectoryEntry>),
}

#[derive(Deserialize)]
struct FileContents {
    #[serde(rename = "type")]
    kind: String,
    sha: String,
    content: Option<String>,
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct DirectoryEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Serialize)]
struct PutContentsPayload<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Serialize)]
struct CreateRefPayload<'a> {
    #[serde(rename = "ref")]
    ref_name: String,
    sha: &'a str,
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let config = PlatformConfig {
            platform: Platform::GitHub,
            owner,
            repo,
            host,
        };

        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if config.host.is_some() {
            let base_url = config.api_base_url();
            builder = builder
                .base_uri(&base_url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn repo_route(&self, rest: &str) -> String {
        format!(
            "/repos/{}/{}/{rest}",
            urlencoding::encode(&self.config.owner),
            urlencoding::encode(&self.config.repo)
        )
    }

    async fn get_contents(&self, path: &str, branch: &str) -> Result<Option<ContentsResponse>> {
        let route = self.repo_route(&format!("contents/{}", encode_path(path)));
        let result: std::result::Result<ContentsResponse, octocrab::Error> =
            self.client.get(route, Some(&[("ref", branch)])).await;
        match result {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if status_of(&e) == Some(404) => Ok(None),
            Err(e) => Err(api_error(&e)),
        }
    }
}

/// HTTP status of a GitHub API failure, if the host answered at all
fn status_of(err: &octocrab::Error) -> Option<u16> {
    match err {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

/// Top-level message plus the per-field `errors` details GitHub attaches to 422s
fn message_of(err: &octocrab::Error) -> String {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            let details: Vec<String> = source
                .errors
                .iter()
                .flatten()
                .map(|detail| {
                    detail
                        .get("message")
                        .and_then(serde_json::Value::as_str)
                        .map_or_else(|| detail.to_string(), ToString::to_string)
                })
                .collect();
            if details.is_empty() {
                source.message.clone()
            } else {
                format!("{}: {}", source.message, details.join("; "))
            }
        }
        other => other.to_string(),
    }
}

fn api_error(err: &octocrab::Error) -> Error {
    match status_of(err) {
        Some(status) => Error::GitHubApi(format!("{status}: {}", message_of(err))),
        None => Error::GitHubApi(message_of(err)),
    }
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
    }
}

#[async_trait]
impl RepositoryService for GitHubService {
    async fn get_file_revision(&self, path: &str, branch: &str) -> Result<Option<FileRevision>> {
        debug!(path, branch, "reading file");
        let file = match self.get_contents(path, branch).await? {
            None => {
                debug!(path, branch, "file not found");
                return Ok(None);
            }
            Some(ContentsResponse::Directory(_)) => {
                return Err(Error::Validation(format!("{path} is a directory")));
            }
            Some(ContentsResponse::File(file)) => file,
        };

        if file.kind != "file" {
            return Err(Error::Validation(format!(
                "{path} is a {}, not a file",
                file.kind
            )));
        }

        let encoded = file.content.ok_or_else(|| {
            Error::GitHubApi(format!("{path} returned no inline content (file too large?)"))
        })?;
        if file.encoding.as_deref().is_some_and(|enc| enc != "base64") {
            return Err(Error::GitHubApi(format!(
                "unexpected content encoding for {path}"
            )));
        }

        // GitHub wraps base64 at 60 columns
        let compact: String = encoded.split_whitespace().collect();
        let content = BASE64
            .decode(compact)
            .map_err(|e| Error::GitHubApi(format!("invalid base64 for {path}: {e}")))?;

        debug!(path, branch, sha = %file.sha, "read file");
        Ok(Some(FileRevision {
            path: path.to_string(),
            content,
            revision: file.sha,
        }))
    }

    async fn upsert_file(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        branch: &str,
        revision: Option<&str>,
    ) -> Result<()> {
        debug!(path, branch, update = revision.is_some(), "writing file");
        let route = self.repo_route(&format!("contents/{}", encode_path(path)));
        let payload = PutContentsPayload {
            message,
            content: BASE64.encode(content),
            branch,
            sha: revision,
        };

        let result: std::result::Result<serde_json::Value, octocrab::Error> =
            self.client.put(route, Some(&payload)).await;

        match result {
            Ok(_) => {
                debug!(path, branch, "wrote file");
                Ok(())
            }
            Err(e) => Err(match (status_of(&e), revision) {
                (Some(409), _) | (Some(422), Some(_)) => Error::Conflict {
                    path: path.to_string(),
                    message: message_of(&e),
                },
                (Some(422), None) => Error::AlreadyExists {
                    path: path.to_string(),
                    message: message_of(&e),
                },
                (Some(404), _) => Error::NotFound(format!("branch '{branch}' or path '{path}'")),
                _ => api_error(&e),
            }),
        }
    }

    async fn get_branch(&self, name: &str) -> Result<Option<Branch>> {
        debug!(branch = name, "looking up branch");
        let route = self.repo_route(&format!("git/ref/heads/{}", encode_path(name)));
        let result: std::result::Result<GitRef, octocrab::Error> =
            self.client.get(route, None::<&()>).await;
        match result {
            Ok(git_ref) => Ok(Some(Branch {
                name: name.to_string(),
                sha: git_ref.object.sha,
            })),
            Err(e) if status_of(&e) == Some(404) => {
                debug!(branch = name, "branch not found");
                Ok(None)
            }
            Err(e) => Err(api_error(&e)),
        }
    }

    async fn create_branch(&self, name: &str, sha: &str) -> Result<Branch> {
        debug!(branch = name, sha, "creating branch");
        let route = self.repo_route("git/refs");
        let payload = CreateRefPayload {
            ref_name: format!("refs/heads/{name}"),
            sha,
        };

        let result: std::result::Result<GitRef, octocrab::Error> =
            self.client.post(route, Some(&payload)).await;
        match result {
            Ok(git_ref) => {
                debug!(branch = name, "created branch");
                Ok(Branch {
                    name: name.to_string(),
                    sha: git_ref.object.sha,
                })
            }
            Err(e) if status_of(&e) == Some(422) => Err(Error::AlreadyExists {
                path: format!("refs/heads/{name}"),
                message: message_of(&e),
            }),
            Err(e) => Err(api_error(&e)),
        }
    }

    async fn find_open_pr(&self, head: &str, base: &str) -> Result<Option<PullRequest>> {
        debug!(head, base, "finding open PR");
        let head_filter = format!("{}:{}", &self.config.owner, head);

        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(head_filter)
            .base(base)
            .state(octocrab::params::State::Open)
            .send()
            .await
            .map_err(|e| api_error(&e))?;

        let result = prs.items.first().map(pr_from_octocrab);
        if let Some(ref pr) = result {
            debug!(pr_number = pr.number, "found open PR");
        } else {
            debug!("no open PR found");
        }
        Ok(result)
    }

    async fn open_pr(&self, title: &str, body: &str, head: &str, base: &str) -> Result<PullRequest> {
        debug!(head, base, "creating PR");
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(title, head, base)
            .body(body)
            .send()
            .await
            .map_err(|e| match status_of(&e) {
                Some(422) => Error::Validation(format!(
                    "cannot open pull request {head} -> {base}: {}",
                    message_of(&e)
                )),
                _ => api_error(&e),
            })?;

        let result = pr_from_octocrab(&pr);
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn list_directory(&self, path: &str, branch: &str) -> Result<Vec<String>> {
        debug!(path, branch, "listing directory");
        match self.get_contents(path, branch).await? {
            Some(ContentsResponse::Directory(entries)) => Ok(entries
                .into_iter()
                .filter(|e| e.kind == "file")
                .map(|e| e.name)
                .collect()),
            Some(ContentsResponse::File(_)) => {
                Err(Error::Validation(format!("{path} is a file, not a directory")))
            }
            None => Ok(Vec::new()),
        }
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
