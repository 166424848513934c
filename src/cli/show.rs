//! Show command - print a content unit

use crate::cli::style::{Stylize, bullet};
use anstream::println;
use gitcms::config::load_config;
use gitcms::content::{
    ContentItem, ContentRecord, FieldValue, humanize_field_name, is_asset_field, is_asset_value,
};
use gitcms::error::{Error, Result};
use gitcms::platform::create_repository_service;
use gitcms::publish::PublishWorkflow;
use std::path::Path;

/// Run the show command
pub async fn run_show(
    config_path: Option<&Path>,
    slug: &str,
    branch: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let target = config.publish.resolve_targets(slug)?;
    let service = create_repository_service(&config.repository).await?;
    let workflow = PublishWorkflow::new(service.as_ref(), config.publish.clone());

    let found = match branch {
        Some(b) => workflow
            .load(slug, b)
            .await?
            .map(|record| (record, b.to_string())),
        None => workflow.load_latest(slug).await?,
    };
    let (record, source) = found.ok_or_else(|| {
        Error::NotFound(format!("{} on {}", target.path, branch.unwrap_or("any branch")))
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!(
        "{} {} {}",
        target.slug.emphasis(),
        "from".muted(),
        source.accent()
    );
    for line in render_record(&record) {
        match line {
            Line::Field { label, value } => println!("  {}: {value}", label.muted()),
            Line::Item { index } => println!("    {} item {index}", bullet()),
            Line::SubField { label, value } => println!("      {}: {value}", label.muted()),
        }
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Field { label: String, value: String },
    Item { index: usize },
    SubField { label: String, value: String },
}

fn display_text(name: &str, value: &str) -> String {
    if is_asset_field(name) || is_asset_value(value) {
        format!("{value} [asset]")
    } else {
        value.to_string()
    }
}

fn render_items(items: &[ContentItem], lines: &mut Vec<Line>) {
    for (i, item) in items.iter().enumerate() {
        lines.push(Line::Item { index: i + 1 });
        for (name, value) in item.iter() {
            lines.push(Line::SubField {
                label: humanize_field_name(name),
                value: display_text(name, value),
            });
        }
    }
}

/// Flatten a record into display lines, labels humanized and assets marked
fn render_record(record: &ContentRecord) -> Vec<Line> {
    let mut lines = Vec::new();
    for (name, value) in record.iter() {
        let label = humanize_field_name(name);
        match value {
            FieldValue::Text(text) => lines.push(Line::Field {
                label,
                value: display_text(name, text),
            }),
            FieldValue::Items(items) => {
                lines.push(Line::Field {
                    label,
                    value: format!("{} items", items.len()),
                });
                render_items(items, &mut lines);
            }
            FieldValue::Opaque(raw) => lines.push(Line::Field {
                label,
                value: raw.to_string(),
            }),
        }
    }
    lines
}
