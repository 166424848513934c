//! List command - content units on a branch

use crate::cli::style::{Stylize, bullet};
use anstream::println;
use gitcms::config::load_config;
use gitcms::error::Result;
use gitcms::platform::create_repository_service;
use gitcms::publish::PublishWorkflow;
use std::path::Path;

/// Run the list command (base branch unless one is given)
pub async fn run_list(config_path: Option<&Path>, branch: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let branch = branch.unwrap_or(&config.publish.base_branch).to_string();
    let service = create_repository_service(&config.repository).await?;
    let workflow = PublishWorkflow::new(service.as_ref(), config.publish.clone());

    let slugs = workflow.list_slugs(&branch).await?;
    if slugs.is_empty() {
        println!(
            "{}",
            format!("No content in {} on {branch}", config.publish.content_dir).muted()
        );
        return Ok(());
    }

    println!(
        "{} {} {}",
        config.repository.full_name().emphasis(),
        "on".muted(),
        branch.accent()
    );
    for slug in slugs {
        println!("  {} {slug}", bullet());
    }
    Ok(())
}
