//! Content slugs and their file paths

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// File extension of persisted content modules
pub const CONTENT_EXTENSION: &str = "ts";

/// Identifier of one content unit, restricted to `[A-Za-z0-9_-]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slug(String);

impl Slug {
    /// Validate a raw slug
    ///
    /// Input is rejected, never stripped: `../etc/passwd` is an error rather
    /// than `etcpasswd`.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::Validation("slug must not be empty".to_string()));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(Error::Validation(format!(
                "slug '{raw}' contains invalid character {bad:?}"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    /// Recover a slug from a content file name (`home.ts`, `about.tsx`)
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name
            .strip_suffix(".tsx")
            .or_else(|| name.strip_suffix(".ts"))?;
        Self::parse(stem).ok()
    }

    /// Repository path of this slug's content module
    pub fn content_path(&self, content_dir: &str) -> String {
        let dir = content_dir.trim_matches('/');
        if dir.is_empty() {
            format!("{}.{CONTENT_EXTENSION}", self.0)
        } else {
            format!("{dir}/{}.{CONTENT_EXTENSION}", self.0)
        }
    }

    /// The slug text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Slug {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
