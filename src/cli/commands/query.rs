//! List, search and stats command implementations.

use crate::cli::ListArgs;
use crate::error::Result;
use crate::model::{BugSummary, Severity, Status};
use crate::storage::{BugStore, Skipped};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Titles longer than this are cut in the table view.
const TITLE_WIDTH: usize = 40;

/// Output for list and search.
#[derive(Serialize)]
struct ListOutput<'a> {
    count: usize,
    bugs: &'a [BugSummary],
    #[serde(skip_serializing_if = "<[Skipped]>::is_empty")]
    skipped: &'a [Skipped],
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error for an invalid filter value or an unreadable store.
pub fn execute_list(args: &ListArgs, store: &BugStore, json: bool) -> Result<()> {
    let status = args.status.as_deref().map(str::parse::<Status>).transpose()?;
    let severity = args.severity.as_deref().map(str::parse::<Severity>).transpose()?;
    let listing = store.list(status, severity)?;

    if crate::is_csv() {
        println!("id,status,severity,title,file");
        for bug in &listing.bugs {
            println!(
                "{},{},{},{},{}",
                bug.id,
                bug.status,
                bug.severity,
                crate::csv_escape(&bug.title),
                crate::csv_escape(&bug.file)
            );
        }
    } else if json {
        let output = ListOutput {
            count: listing.bugs.len(),
            bugs: &listing.bugs,
            skipped: &listing.skipped,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    } else if listing.bugs.is_empty() {
        println!("No bugs found");
    } else {
        print_table(&listing.bugs);
    }

    report_skipped(&listing.skipped);
    Ok(())
}

fn print_table(bugs: &[BugSummary]) {
    println!("{:<12} {:<12} {:<10} {}", "ID", "Status", "Severity", "Title");
    println!("{}", "-".repeat(70));
    for bug in bugs {
        let title: String = bug.title.chars().take(TITLE_WIDTH).collect();
        println!(
            "{:<12} {:<12} {:<10} {}",
            bug.id, bug.status, bug.severity, title
        );
    }
}

/// Execute the search command.
///
/// # Errors
///
/// Returns an error for a blank query or an unreadable store.
pub fn execute_search(query: &[String], store: &BugStore, json: bool) -> Result<()> {
    let query = query.join(" ");
    let listing = store.search(&query)?;

    if json {
        let output = ListOutput {
            count: listing.bugs.len(),
            bugs: &listing.bugs,
            skipped: &listing.skipped,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if listing.bugs.is_empty() {
        println!("No bugs found matching '{query}'");
    } else {
        println!("Found {} bug(s) matching '{query}':", listing.bugs.len());
        for bug in &listing.bugs {
            println!("  {} [{}] - {}", bug.id.cyan(), bug.status, bug.title);
        }
    }

    report_skipped(&listing.skipped);
    Ok(())
}

/// Execute the stats command.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute_stats(store: &BugStore, json: bool) -> Result<()> {
    let stats = store.stats()?;

    if json {
        println!("{}", serde_json::to_string(&stats)?);
        return Ok(());
    }

    println!("Total bugs: {}", stats.total);
    print_counts("By status:", &stats.by_status);
    print_counts("By severity:", &stats.by_severity);
    if !stats.by_resolution.is_empty() {
        print_counts("Closed bug resolutions:", &stats.by_resolution);
    }

    report_skipped(&stats.skipped);
    Ok(())
}

fn print_counts(heading: &str, counts: &BTreeMap<String, usize>) {
    println!();
    println!("{}", heading.cyan().bold());
    for (name, count) in counts {
        println!("  {name}: {count}");
    }
}

fn report_skipped(skipped: &[Skipped]) {
    for s in skipped {
        eprintln!("{} Skipped {}: {}", "Warning:".yellow().bold(), s.file, s.reason);
    }
}
