//! GitLab repository service implementation

use crate::error::{Error, Result};
use crate::platform::RepositoryService;
use crate::types::{Branch, FileRevision, Platform, PlatformConfig, PullRequest};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// GitLab service using reqwest
pub struct GitLabService {
    client: Client,
    token: String,
    config: PlatformConfig,
    project_path: String,
}

#[derive(Deserialize)]
struct MergeRequest {
    iid: u64,
    web_url: String,
    source_branch: String,
    target_branch: String,
    title: String,
}

impl From<MergeRequest> for PullRequest {
    fn from(mr: MergeRequest) -> Self {
        Self {
            number: mr.iid,
            html_url: mr.web_url,
            base_ref: mr.target_branch,
            head_ref: mr.source_branch,
            title: mr.title,
        }
    }
}

#[derive(Deserialize)]
struct RepositoryFile {
    content: String,
    encoding: String,
    last_commit_id: String,
}

#[derive(Deserialize)]
struct BranchResponse {
    name: String,
    commit: BranchCommit,
}

#[derive(Deserialize)]
struct BranchCommit {
    id: String,
}

#[derive(Deserialize)]
struct TreeEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
struct FilePayload<'a> {
    branch: &'a str,
    content: String,
    encoding: &'static str,
    commit_message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_commit_id: Option<&'a str>,
}

#[derive(Serialize)]
struct CreateMrPayload<'a> {
    source_branch: &'a str,
    target_branch: &'a str,
    title: &'a str,
    description: &'a str,
}

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A non-success response, with the host's message extracted
struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    async fn from_response(response: Response) -> Self {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| match body.message {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Null => body.error,
                other => Some(other.to_string()),
            })
            .unwrap_or(text);
        Self { status, message }
    }

    fn into_error(self) -> Error {
        Error::GitLabApi(format!("{}: {}", self.status.as_u16(), self.message))
    }
}

impl GitLabService {
    /// Create a new GitLab service
    pub fn new(token: String, owner: String, repo: String, host: Option<String>) -> Self {
        let project_path = format!("{owner}/{repo}");

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            token,
            config: PlatformConfig {
                platform: Platform::GitLab,
                owner,
                repo,
                host: host.filter(|h| h != "gitlab.com"),
            },
            project_path,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/projects/{}{path}",
            self.config.api_base_url(),
            urlencoding::encode(&self.project_path)
        )
    }

    fn file_url(&self, path: &str) -> String {
        self.api_url(&format!(
            "/repository/files/{}",
            urlencoding::encode(path.trim_matches('/'))
        ))
    }

    /// Send a request, splitting success from host-reported failure
    async fn send(&self, request: RequestBuilder) -> Result<std::result::Result<Response, ApiFailure>> {
        let response = request
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(Ok(response))
        } else {
            Ok(Err(ApiFailure::from_response(response).await))
        }
    }
}

#[async_trait]
impl RepositoryService for GitLabService {
    async fn get_file_revision(&self, path: &str, branch: &str) -> Result<Option<FileRevision>> {
        debug!(path, branch, "reading file");
        let request = self.client.get(self.file_url(path)).query(&[("ref", branch)]);

        let file: RepositoryFile = match self.send(request).await? {
            Ok(response) => response.json().await?,
            Err(failure) if failure.status == StatusCode::NOT_FOUND => {
                debug!(path, branch, "file not found");
                return Ok(None);
            }
            Err(failure) => return Err(failure.into_error()),
        };

        let content = if file.encoding == "base64" {
            let compact: String = file.content.split_whitespace().collect();
            BASE64
                .decode(compact)
                .map_err(|e| Error::GitLabApi(format!("invalid base64 for {path}: {e}")))?
        } else {
            file.content.into_bytes()
        };

        debug!(path, branch, last_commit_id = %file.last_commit_id, "read file");
        Ok(Some(FileRevision {
            path: path.to_string(),
            content,
            revision: file.last_commit_id,
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
        let payload = FilePayload {
            branch,
            content: BASE64.encode(content),
            encoding: "base64",
            commit_message: message,
            last_commit_id: revision,
        };

        let url = self.file_url(path);
        let request = if revision.is_some() {
            self.client.put(&url)
        } else {
            self.client.post(&url)
        };

        match self.send(request.json(&payload)).await? {
            Ok(_) => {
                debug!(path, branch, "wrote file");
                Ok(())
            }
            Err(failure) => {
                let lower = failure.message.to_lowercase();
                Err(match failure.status {
                    StatusCode::CONFLICT => Error::Conflict {
                        path: path.to_string(),
                        message: failure.message,
                    },
                    StatusCode::BAD_REQUEST if lower.contains("already exists") => {
                        Error::AlreadyExists {
                            path: path.to_string(),
                            message: failure.message,
                        }
                    }
                    StatusCode::BAD_REQUEST
                        if revision.is_some()
                            && (lower.contains("changed") || lower.contains("doesn't exist")) =>
                    {
                        Error::Conflict {
                            path: path.to_string(),
                            message: failure.message,
                        }
                    }
                    StatusCode::NOT_FOUND => {
                        Error::NotFound(format!("branch '{branch}' or path '{path}'"))
                    }
                    _ => failure.into_error(),
                })
            }
        }
    }

    async fn get_branch(&self, name: &str) -> Result<Option<Branch>> {
        debug!(branch = name, "looking up branch");
        let url = self.api_url(&format!(
            "/repository/branches/{}",
            urlencoding::encode(name)
        ));

        match self.send(self.client.get(&url)).await? {
            Ok(response) => {
                let branch: BranchResponse = response.json().await?;
                Ok(Some(Branch {
                    name: branch.name,
                    sha: branch.commit.id,
                }))
            }
            Err(failure) if failure.status == StatusCode::NOT_FOUND => {
                debug!(branch = name, "branch not found");
                Ok(None)
            }
            Err(failure) => Err(failure.into_error()),
        }
    }

    async fn create_branch(&self, name: &str, sha: &str) -> Result<Branch> {
        debug!(branch = name, sha, "creating branch");
        let url = self.api_url("/repository/branches");
        let request = self
            .client
            .post(&url)
            .query(&[("branch", name), ("ref", sha)]);

        match self.send(request).await? {
            Ok(response) => {
                let branch: BranchResponse = response.json().await?;
                debug!(branch = name, "created branch");
                Ok(Branch {
                    name: branch.name,
                    sha: branch.commit.id,
                })
            }
            Err(failure)
                if failure.status == StatusCode::BAD_REQUEST
                    && failure.message.to_lowercase().contains("already exists") =>
            {
                Err(Error::AlreadyExists {
                    path: name.to_string(),
                    message: failure.message,
                })
            }
            Err(failure) => Err(failure.into_error()),
        }
    }

    async fn find_open_pr(&self, head: &str, base: &str) -> Result<Option<PullRequest>> {
        debug!(head, base, "finding open MR");
        let request = self.client.get(self.api_url("/merge_requests")).query(&[
            ("source_branch", head),
            ("target_branch", base),
            ("state", "opened"),
        ]);

        let mrs: Vec<MergeRequest> = match self.send(request).await? {
            Ok(response) => response.json().await?,
            Err(failure) => return Err(failure.into_error()),
        };

        let result = mrs.into_iter().next().map(PullRequest::from);
        if let Some(ref pr) = result {
            debug!(pr_number = pr.number, "found open MR");
        } else {
            debug!("no open MR found");
        }
        Ok(result)
    }

    async fn open_pr(&self, title: &str, body: &str, head: &str, base: &str) -> Result<PullRequest> {
        debug!(head, base, "creating MR");
        let payload = CreateMrPayload {
            source_branch: head,
            target_branch: base,
            title,
            description: body,
        };

        let request = self.client.post(self.api_url("/merge_requests")).json(&payload);
        match self.send(request).await? {
            Ok(response) => {
                let mr: MergeRequest = response.json().await?;
                debug!(pr_number = mr.iid, "created MR");
                Ok(mr.into())
            }
            Err(failure)
                if failure.status == StatusCode::CONFLICT
                    || failure.status == StatusCode::UNPROCESSABLE_ENTITY =>
            {
                Err(Error::Validation(format!(
                    "cannot open merge request {head} -> {base}: {}",
                    failure.message
                )))
            }
            Err(failure) => Err(failure.into_error()),
        }
    }

    async fn list_directory(&self, path: &str, branch: &str) -> Result<Vec<String>> {
        debug!(path, branch, "listing directory");
        let mut names = Vec::new();
        let mut page = "1".to_string();

        // GitLab pages the tree; an empty X-Next-Page marks the last page
        loop {
            let request = self.client.get(self.api_url("/repository/tree")).query(&[
                ("path", path.trim_matches('/')),
                ("ref", branch),
                ("per_page", "100"),
                ("page", page.as_str()),
            ]);

            let response = match self.send(request).await? {
                Ok(response) => response,
                Err(failure) if failure.status == StatusCode::NOT_FOUND => return Ok(names),
                Err(failure) => return Err(failure.into_error()),
            };

            let next_page = response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string);

            let entries: Vec<TreeEntry> = response.json().await?;
            names.extend(
                entries
                    .into_iter()
                    .filter(|e| e.kind == "blob")
                    .map(|e| e.name),
            );

            match next_page {
                Some(next) => page = next,
                None => break,
            }
        }

        Ok(names)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
