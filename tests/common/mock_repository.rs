//! In-memory repository service for testing
//!
//! Behaves like a hosting API: branches point at commits, every write is a
//! commit, and updates are compare-and-swap on the file's revision marker.

use async_trait::async_trait;
use gitcms::error::{Error, Result};
use gitcms::platform::RepositoryService;
use gitcms::types::{Branch, FileRevision, Platform, PlatformConfig, PullRequest};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Service operations, for call counting and error injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    GetFile,
    Upsert,
    GetBranch,
    CreateBranch,
    FindPr,
    CreatePr,
    ListDirectory,
}

#[derive(Debug, Clone, Default)]
struct BranchState {
    head: String,
    /// path -> (content, revision)
    files: BTreeMap<String, (Vec<u8>, String)>,
}

#[derive(Default)]
struct State {
    branches: HashMap<String, BranchState>,
    pull_requests: Vec<PullRequest>,
    next_commit: u64,
    next_pr: u64,
    calls: Vec<Op>,
    failures: HashMap<Op, Error>,
    foreign_write: Option<Vec<u8>>,
}

impl State {
    fn commit_id(&mut self) -> String {
        self.next_commit += 1;
        format!("c{:04}", self.next_commit)
    }
}

/// Mock repository service
///
/// Features:
/// - Branches with per-branch file trees and commit ids
/// - Compare-and-swap updates (`Conflict` on a stale marker)
/// - Create-only writes (`AlreadyExists` when the path is present)
/// - Auto-incrementing PR numbers
/// - Call tracking and one-shot error injection per operation
pub struct MockRepositoryService {
    config: PlatformConfig,
    state: Mutex<State>,
}

impl MockRepositoryService {
    /// Repository with an empty `main` branch
    pub fn new() -> Self {
        let mock = Self {
            config: PlatformConfig {
                platform: Platform::GitHub,
                owner: "test".to_string(),
                repo: "site".to_string(),
                host: None,
            },
            state: Mutex::new(State {
                next_pr: 1,
                ..State::default()
            }),
        };
        mock.add_branch("main");
        mock
    }

    /// Repository with no branches at all
    pub fn empty() -> Self {
        let mock = Self::new();
        mock.state.lock().unwrap().branches.clear();
        mock
    }

    /// Add an empty branch
    pub fn add_branch(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        let head = state.commit_id();
        state.branches.insert(
            name.to_string(),
            BranchState {
                head,
                files: BTreeMap::new(),
            },
        );
    }

    /// Commit a file directly, bypassing call tracking
    pub fn seed_file(&self, branch: &str, path: &str, content: &[u8]) {
        let mut state = self.state.lock().unwrap();
        let commit = state.commit_id();
        let entry = state
            .branches
            .get_mut(branch)
            .expect("seed_file: branch exists");
        entry
            .files
            .insert(path.to_string(), (content.to_vec(), commit.clone()));
        entry.head = commit;
    }

    /// Seed an open pull request
    pub fn seed_pr(&self, head: &str, base: &str) -> PullRequest {
        let mut state = self.state.lock().unwrap();
        let number = state.next_pr;
        state.next_pr += 1;
        let pr = make_pr(number, head, base, "Existing PR");
        state.pull_requests.push(pr.clone());
        pr
    }

    /// Make the next call of `op` fail with `error`
    pub fn fail_next(&self, op: Op, error: Error) {
        self.state.lock().unwrap().failures.insert(op, error);
    }

    /// Simulate another editor committing `content` right before the next upsert
    pub fn write_before_next_upsert(&self, content: &[u8]) {
        self.state.lock().unwrap().foreign_write = Some(content.to_vec());
    }

    // === Inspection ===

    pub fn branch_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.lock().unwrap().branches.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn file(&self, branch: &str, path: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state
            .branches
            .get(branch)
            .and_then(|b| b.files.get(path))
            .map(|(content, _)| content.clone())
    }

    pub fn file_text(&self, branch: &str, path: &str) -> Option<String> {
        self.file(branch, path)
            .map(|bytes| String::from_utf8(bytes).expect("utf-8 file"))
    }

    pub fn open_prs(&self) -> Vec<PullRequest> {
        self.state.lock().unwrap().pull_requests.clone()
    }

    pub fn calls(&self) -> Vec<Op> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|c| **c == op).count()
    }

    /// Record a call and return an injected error, if any
    fn enter(&self, op: Op) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op);
        match state.failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for MockRepositoryService {
    fn default() -> Self {
        Self::new()
    }
}

pub fn make_pr(number: u64, head: &str, base: &str, title: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/test/site/pull/{number}"),
        base_ref: base.to_string(),
        head_ref: head.to_string(),
        title: title.to_string(),
    }
}

#[async_trait]
impl RepositoryService for MockRepositoryService {
    async fn get_file_revision(&self, path: &str, branch: &str) -> Result<Option<FileRevision>> {
        self.enter(Op::GetFile)?;
        let state = self.state.lock().unwrap();
        // hosts answer 404 for a missing ref just like for a missing path
        Ok(state
            .branches
            .get(branch)
            .and_then(|b| b.files.get(path))
            .map(|(content, revision)| FileRevision {
                path: path.to_string(),
                content: content.clone(),
                revision: revision.clone(),
            }))
    }

    async fn upsert_file(
        &self,
        path: &str,
        content: &[u8],
        _message: &str,
        branch: &str,
        revision: Option<&str>,
    ) -> Result<()> {
        self.enter(Op::Upsert)?;
        let mut state = self.state.lock().unwrap();

        if let Some(foreign) = state.foreign_write.take() {
            let commit = state.commit_id();
            if let Some(b) = state.branches.get_mut(branch) {
                b.files.insert(path.to_string(), (foreign, commit.clone()));
                b.head = commit;
            }
        }

        let commit = state.commit_id();
        let Some(b) = state.branches.get_mut(branch) else {
            return Err(Error::NotFound(format!("branch {branch}")));
        };

        let current = b.files.get(path).map(|(_, rev)| rev.clone());
        match (revision, current) {
            (None, Some(_)) => {
                return Err(Error::AlreadyExists {
                    path: path.to_string(),
                    message: "file already exists".to_string(),
                });
            }
            (Some(_), None) => {
                return Err(Error::Conflict {
                    path: path.to_string(),
                    message: "file was deleted".to_string(),
                });
            }
            (Some(expected), Some(actual)) if expected != actual => {
                return Err(Error::Conflict {
                    path: path.to_string(),
                    message: format!("expected {expected}, found {actual}"),
                });
            }
            _ => {}
        }

        b.files
            .insert(path.to_string(), (content.to_vec(), commit.clone()));
        b.head = commit;
        Ok(())
    }

    async fn get_branch(&self, name: &str) -> Result<Option<Branch>> {
        self.enter(Op::GetBranch)?;
        let state = self.state.lock().unwrap();
        Ok(state.branches.get(name).map(|b| Branch {
            name: name.to_string(),
            sha: b.head.clone(),
        }))
    }

    async fn create_branch(&self, name: &str, sha: &str) -> Result<Branch> {
        self.enter(Op::CreateBranch)?;
        let mut state = self.state.lock().unwrap();
        if state.branches.contains_key(name) {
            return Err(Error::AlreadyExists {
                path: format!("refs/heads/{name}"),
                message: "Reference already exists".to_string(),
            });
        }
        let source = state
            .branches
            .values()
            .find(|b| b.head == sha)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("commit {sha}")))?;
        state.branches.insert(name.to_string(), source);
        Ok(Branch {
            name: name.to_string(),
            sha: sha.to_string(),
        })
    }

    async fn find_open_pr(&self, head: &str, base: &str) -> Result<Option<PullRequest>> {
        self.enter(Op::FindPr)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .pull_requests
            .iter()
            .find(|pr| pr.head_ref == head && pr.base_ref == base)
            .cloned())
    }

    async fn open_pr(&self, title: &str, _body: &str, head: &str, base: &str) -> Result<PullRequest> {
        self.enter(Op::CreatePr)?;
        let mut state = self.state.lock().unwrap();
        if state
            .pull_requests
            .iter()
            .any(|pr| pr.head_ref == head && pr.base_ref == base)
        {
            return Err(Error::Validation(format!(
                "a pull request already exists for {head}"
            )));
        }
        let number = state.next_pr;
        state.next_pr += 1;
        let pr = make_pr(number, head, base, title);
        state.pull_requests.push(pr.clone());
        Ok(pr)
    }

    async fn list_directory(&self, path: &str, branch: &str) -> Result<Vec<String>> {
        self.enter(Op::ListDirectory)?;
        let state = self.state.lock().unwrap();
        let prefix = format!("{}/", path.trim_matches('/'));
        Ok(state
            .branches
            .get(branch)
            .map(|b| {
                b.files
                    .keys()
                    .filter_map(|p| p.strip_prefix(&prefix))
                    .filter(|rest| !rest.contains('/'))
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
