//! Commands that never open a store: `version` and `completions`.

use crate::cli::Cli;
use crate::error::Result;
use crate::storage::template::RELATED_BUGS_MARKER;
use clap::CommandFactory;
use clap_complete::Shell;
use serde::Serialize;

const BIN_NAME: &str = "bt";

#[derive(Serialize)]
struct VersionOutput {
    name: &'static str,
    version: &'static str,
    build: &'static str,
    record_sections: Vec<&'static str>,
    related_marker: &'static str,
}

/// Print the package version and build profile.
///
/// The JSON form also lists the record layout this build writes, so agents
/// can check a store against the binary that will edit it.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn version(json: bool) -> Result<()> {
    let build = if cfg!(debug_assertions) { "dev" } else { "release" };

    if json {
        let output = VersionOutput {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            build,
            record_sections: crate::model::SectionName::ALL
                .iter()
                .map(crate::model::SectionName::heading)
                .collect(),
            related_marker: RELATED_BUGS_MARKER,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!(
        "{BIN_NAME} ({}) version {} ({build})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}

/// Write a completion script for `shell` to stdout.
///
/// # Errors
///
/// Never fails.
pub fn completions(shell: Shell) -> Result<()> {
    clap_complete::generate(shell, &mut Cli::command(), BIN_NAME, &mut std::io::stdout());
    Ok(())
}
