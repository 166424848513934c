//! gitcms - Git-backed content publishing
//!
//! Page content lives as data modules inside a source-control repository.
//! Edits are serialized, committed to a shared work branch through the
//! hosting API, and surfaced for review as a single pull request.

pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod platform;
pub mod publish;
pub mod types;
