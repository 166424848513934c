//! Publish command - commit a content record to the work branch and open a PR

use crate::cli::progress::CliProgress;
use crate::cli::style::{Stylize, arrow, check};
use anstream::{print, println};
use dialoguer::Confirm;
use gitcms::config::load_config;
use gitcms::content::{ContentRecord, FieldValue, sanitize_field_name};
use gitcms::error::{Error, Result};
use gitcms::platform::create_repository_service;
use gitcms::publish::{FileStatus, PublishWorkflow};
use serde_json::Value;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

/// Arguments of `gitcms publish`
pub struct PublishArgs {
    pub slug: String,
    pub file: Option<PathBuf>,
    pub sets: Vec<String>,
    pub dry_run: bool,
    pub yes: bool,
}

/// Run the publish command
pub async fn run_publish(config_path: Option<&Path>, args: PublishArgs) -> Result<()> {
    let config = load_config(config_path)?;

    // Bad slugs and protected work branches fail before any auth or network
    let target = config.publish.resolve_targets(&args.slug)?;
    let edits = args
        .sets
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<Result<Vec<_>>>()?;

    // Only needed up front when editing the current content in place
    let mut service = None;
    let mut record = match &args.file {
        Some(path) => read_record(path)?,
        None => {
            let loaded = create_repository_service(&config.repository).await?;
            let workflow = PublishWorkflow::new(loaded.as_ref(), config.publish.clone());
            let latest = workflow.load_latest(&args.slug).await?;
            service = Some(loaded);
            match latest {
                Some((record, branch)) => {
                    println!(
                        "{} Editing {} from {}",
                        arrow(),
                        target.path.accent(),
                        branch.accent()
                    );
                    record
                }
                None => ContentRecord::new(),
            }
        }
    };

    if record.is_empty() && edits.is_empty() {
        return Err(Error::Validation(
            "nothing to publish: pass --file or at least one --set".to_string(),
        ));
    }
    for (name, value) in edits {
        record.set(name, value);
    }

    let preview = config.publish.preview(&args.slug, &record)?;

    if args.dry_run {
        println!("{}", "Dry run - nothing will be written".emphasis());
        println!();
        println!("  {} {}", "repository:".muted(), config.repository.full_name());
        println!("  {} {}", "path:".muted(), preview.target.path.accent());
        println!(
            "  {} {} {} {}",
            "branch:".muted(),
            preview.target.work_branch.accent(),
            arrow(),
            preview.target.base_branch.accent()
        );
        println!("  {} {}", "commit:".muted(), preview.commit_message);
        println!();
        print!("{}", preview.module);
        return Ok(());
    }

    if !args.yes {
        confirm(&format!(
            "Publish {} to {} on {}?",
            preview.target.path,
            preview.target.work_branch,
            config.repository.full_name()
        ))?;
    }

    let service = match service {
        Some(service) => service,
        None => create_repository_service(&config.repository).await?,
    };
    let workflow = PublishWorkflow::new(service.as_ref(), config.publish.clone());

    println!(
        "Publishing {} to {}",
        preview.target.slug.emphasis(),
        config.repository.full_name().accent()
    );
    let progress = CliProgress::new();
    let result = workflow.publish(&args.slug, &record, &progress).await;
    progress.finish();
    let outcome = result?;

    let summary = match outcome.file_status {
        FileStatus::Unchanged => "No content changes".to_string(),
        status => format!("Content {status}"),
    };
    println!(
        "{} {}; review in PR {}",
        check(),
        summary.success(),
        format!("#{}", outcome.pull_request.number).accent()
    );

    Ok(())
}

fn confirm(prompt: &str) -> Result<()> {
    if !std::io::stdin().is_terminal() {
        return Err(Error::Validation(
            "refusing to publish without confirmation; pass --yes".to_string(),
        ));
    }
    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(true)
        .interact()
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
    if confirmed {
        Ok(())
    } else {
        Err(Error::Validation("publish cancelled".to_string()))
    }
}

/// Read a JSON record from a file, or stdin for `-`
fn read_record(path: &Path) -> Result<ContentRecord> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    ContentRecord::from_json_str(&text)
}

/// Parse `field=value`; values starting with `[` or `{` are JSON
fn parse_assignment(raw: &str) -> Result<(String, FieldValue)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| Error::Validation(format!("expected FIELD=VALUE, got '{raw}'")))?;
    let name = sanitize_field_name(name);
    if name.is_empty() {
        return Err(Error::Validation(format!("empty field name in '{raw}'")));
    }

    let json = if value.trim_start().starts_with(['[', '{']) {
        serde_json::from_str(value)?
    } else {
        Value::String(value.to_string())
    };

    // Round-trip through a record so nested values get the same checks as files
    let mut object = serde_json::Map::new();
    object.insert(name.clone(), json);
    let mut record = ContentRecord::from_value(Value::Object(object))?;
    let field = record
        .remove(&name)
        .ok_or_else(|| Error::Validation(format!("field '{name}' was dropped")))?;
    Ok((name, field))
}
