//! Error types for gitcms

use thiserror::Error;

/// Result type alias using gitcms's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
///
/// Callers that map failures onto responses (HTTP status codes, exit codes)
/// should match on this rather than on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad slug, branch or input; nothing was written
    Validation,
    /// Requested path or ref does not exist
    NotFound,
    /// Stale revision marker; retry with a fresh read
    Conflict,
    /// Base branch for a new branch is missing
    BaseNotFound,
    /// Create-only write hit an existing path or ref
    AlreadyExists,
    /// Content could not be converted to or from module text
    Serialization,
    /// Network, auth or unexpected host failure
    Transport,
    /// Local configuration problem
    Config,
}

/// Errors that can occur in gitcms
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied invalid input
    #[error("invalid input: {0}")]
    Validation(String),

    /// Path or ref not found on the host
    #[error("not found: {0}")]
    NotFound(String),

    /// Host rejected a write because the revision marker is stale
    #[error("revision conflict on {path}: {message}")]
    Conflict {
        /// Path being written
        path: String,
        /// Host message
        message: String,
    },

    /// Base branch does not exist
    #[error("base branch '{0}' not found")]
    BaseNotFound(String),

    /// Create-only write targeted something that already exists
    #[error("{path} already exists: {message}")]
    AlreadyExists {
        /// Path or ref name
        path: String,
        /// Host message
        message: String,
    },

    /// Content serialization failed
    #[error("content serialization error: {0}")]
    Serialization(String),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// GitLab API error
    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    /// Authentication error
    #[error("authentication error: {0}")]
    Auth(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// Octocrab error
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// HTTP error
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML config error
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Classify this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::BaseNotFound(_) => ErrorKind::BaseNotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Serialization(_) | Self::Json(_) => ErrorKind::Serialization,
            Self::Config(_) | Self::Parse(_) | Self::Io(_) | Self::Toml(_) => ErrorKind::Config,
            Self::GitHubApi(_)
            | Self::GitLabApi(_)
            | Self::Auth(_)
            | Self::Octocrab(_)
            | Self::Http(_) => ErrorKind::Transport,
        }
    }

    /// Whether re-running the same operation can succeed without other changes
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_retryable() {
        let err = Error::Conflict {
            path: "content/home.ts".to_string(),
            message: "sha mismatch".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "revision conflict on content/home.ts: sha mismatch"
        );
    }

    #[test]
    fn test_transport_errors_not_retryable() {
        let err = Error::GitHubApi("bad credentials".to_string());
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_validation_kind() {
        assert_eq!(
            Error::Validation("empty slug".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::BaseNotFound("main".into()).kind(),
            ErrorKind::BaseNotFound
        );
    }
}
