//! CLI commands
//!
//! Command implementations for the `gitcms` binary.

mod auth;
mod list;
mod progress;
mod publish;
mod show;
mod style;

pub use auth::{run_auth_setup, run_auth_test};
pub use list::run_list;
pub use publish::{PublishArgs, run_publish};
pub use show::run_show;
