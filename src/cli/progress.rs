//! CLI progress callback with styled output and a spinner

use crate::cli::style::{Stream, Stylize, check, hyperlink_url, spinner_style};
use async_trait::async_trait;
use gitcms::publish::{FileStatus, Phase, ProgressCallback};
use gitcms::types::PullRequest;
use indicatif::ProgressBar;
use std::time::Duration;

/// Prints each publish step as it completes
///
/// The spinner shows the phase in flight; finished steps are printed above it.
pub struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    /// Clear the spinner (also needed when a publish fails midway)
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }

    fn line(&self, text: String) {
        self.spinner.suspend(|| anstream::println!("{text}"));
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        if phase == Phase::Complete {
            self.finish();
        } else {
            self.spinner.set_message(format!("{phase}..."));
        }
    }

    async fn on_branch(&self, branch: &str, created: bool) {
        let what = if created { "Created" } else { "Using" };
        self.line(format!("  {} {what} branch {}", check(), branch.accent()));
    }

    async fn on_file(&self, path: &str, status: FileStatus) {
        match status {
            FileStatus::Unchanged => self.line(format!(
                "  {} {} {}",
                "-".muted(),
                path.accent(),
                "already up to date".muted()
            )),
            _ => self.line(format!("  {} {} {}", check(), status, path.emphasis())),
        }
    }

    async fn on_pull_request(&self, pr: &PullRequest, created: bool) {
        let pr_num = format!("#{}", pr.number);
        let what = if created { "Opened" } else { "Reusing open" };
        self.line(format!("  {} {what} PR {}", check(), pr_num.accent()));
        self.line(format!("    {}", hyperlink_url(Stream::Stdout, &pr.html_url)));
    }
}
