//! Bug record command implementations.

use crate::cli::{AttemptArgs, CloseArgs, OpenArgs, UpdateArgs};
use crate::error::Result;
use crate::model::{BugId, Resolution, Severity, Status};
use crate::storage::{BugStore, Frontmatter, UpdateFields};
use colored::Colorize;
use serde::Serialize;

/// Output for get.
#[derive(Serialize)]
struct GetOutput<'a> {
    id: &'a str,
    path: String,
    header: &'a Frontmatter,
}

/// Output for update.
#[derive(Serialize)]
struct UpdateOutput<'a> {
    id: &'a str,
    changed: &'a [&'static str],
    updated: bool,
}

/// Output for close.
#[derive(Serialize)]
struct CloseOutput<'a> {
    id: &'a str,
    status: &'static str,
    resolution: Resolution,
    solution_recorded: bool,
}

/// Execute the open command.
///
/// # Errors
///
/// Returns an error for an invalid severity, an empty title, or a failed write.
pub fn execute_open(args: &OpenArgs, store: &BugStore, json: bool) -> Result<()> {
    let severity: Severity = args.severity.parse()?;
    let title = args.title.join(" ");
    let opened = store.open(&title, severity, &args.description)?;

    if crate::is_silent() {
        println!("{}", opened.id);
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string(&opened)?);
        return Ok(());
    }

    for dup in &opened.possible_duplicates {
        eprintln!("{} Possible duplicate - {dup}", "Warning:".yellow().bold());
    }
    println!("Created {}: {}", opened.id.cyan(), opened.file);
    println!("Path: {}", opened.path.display());
    Ok(())
}

/// Execute the get command.
///
/// # Errors
///
/// Returns an error if the id is invalid or the record is missing or malformed.
pub fn execute_get(id: &str, store: &BugStore, json: bool) -> Result<()> {
    let record = store.get(BugId::parse(id)?)?;

    if json {
        let output = GetOutput {
            id: &record.id,
            path: record.path.display().to_string(),
            header: &record.header,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    let field = |key: &str| record.header.get_str(key).unwrap_or("N/A").to_string();
    println!("ID: {}", record.id.cyan().bold());
    println!("Title: {}", field("title"));
    println!("Status: {}", field("status"));
    println!("Severity: {}", field("severity"));
    println!("Created: {}", field("created"));
    println!("Updated: {}", field("updated"));
    if let Some(closed) = record.header.get_str("closed") {
        println!("Closed: {closed}");
    }
    if let Some(resolution) = record.header.get_str("resolution") {
        println!("Resolution: {resolution}");
    }
    let files = record.header.get_list("related-files");
    if !files.is_empty() {
        println!("Files: {}", files.join(", "));
    }
    let tags = record.header.get_list("tags");
    if !tags.is_empty() {
        println!("Tags: {}", tags.join(", "));
    }
    println!("File: {}", record.path.display());
    Ok(())
}

/// Execute the update command.
///
/// # Errors
///
/// Returns an error for invalid values, a disallowed status change, or a failed write.
pub fn execute_update(args: &UpdateArgs, store: &BugStore, json: bool) -> Result<()> {
    let id = BugId::parse(&args.id)?;
    let fields = UpdateFields {
        status: args.status.as_deref().map(str::parse::<Status>).transpose()?,
        severity: args.severity.as_deref().map(str::parse::<Severity>).transpose()?,
        note: args.add_note.clone(),
        add_file: args.add_file.clone(),
        add_tag: args.add_tag.clone(),
    };

    let updated = store.update(id, &fields)?;
    let changed = !updated.changed.is_empty();

    if crate::is_silent() {
        if changed {
            println!("{}", updated.id);
        }
        return Ok(());
    }

    if json {
        let output = UpdateOutput {
            id: &updated.id,
            changed: &updated.changed,
            updated: changed,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if changed {
        println!("Updated {}", updated.id.cyan());
    } else {
        println!("No changes made");
    }
    Ok(())
}

/// Execute the close command.
///
/// # Errors
///
/// Returns an error for an invalid resolution, a missing record, or a failed write.
pub fn execute_close(args: &CloseArgs, store: &BugStore, json: bool) -> Result<()> {
    let resolution: Resolution = args.resolution.parse()?;
    let id = BugId::parse(&args.id)?;
    let closed = store.close(id, resolution, args.solution.as_deref())?;

    if crate::is_silent() {
        println!("{}", closed.id);
        return Ok(());
    }

    if json {
        let output = CloseOutput {
            id: &closed.id,
            status: Status::Closed.as_str(),
            resolution: closed.resolution,
            solution_recorded: closed.solution_recorded,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Closed {} as {}", closed.id.cyan(), closed.resolution);
    }
    Ok(())
}

/// Execute the attempt command.
///
/// # Errors
///
/// Returns an error for blank text, a missing section, or a failed write.
pub fn execute_attempt(args: &AttemptArgs, store: &BugStore, json: bool) -> Result<()> {
    let id = BugId::parse(&args.id)?;
    let attempted = store.attempt(id, &args.description, &args.result, args.reverted)?;

    if crate::is_silent() {
        println!("{}", attempted.attempt.number);
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string(&attempted)?);
    } else {
        println!(
            "Recorded attempt {} on {}",
            attempted.attempt.number,
            attempted.id.cyan()
        );
    }
    Ok(())
}

/// Execute the link command.
///
/// # Errors
///
/// Returns an error for unknown ids, a self-link, or a failed write.
pub fn execute_link(id1: &str, id2: &str, store: &BugStore, json: bool) -> Result<()> {
    let linked = store.link(BugId::parse(id1)?, BugId::parse(id2)?)?;

    if crate::is_silent() {
        println!("{} {}", linked.source, linked.target);
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string(&linked)?);
    } else {
        println!("Linked {} <-> {}", linked.source.cyan(), linked.target.cyan());
    }
    Ok(())
}
