//! Bug tracker CLI entry point.

use bt::cli::commands;
use bt::cli::{Cli, Commands, OutputFormat};
use bt::config::StoreConfig;
use bt::error::Error;
use bt::storage::{BugStore, MemoryStore};
use clap::Parser;
use std::process::ExitCode;

/// Rewrite named flags to positional args for agent ergonomics.
///
/// Agents naturally generate `--title "foo"` instead of positional
/// `"foo"`. This preprocessor transparently converts known flag
/// patterns so both forms work.
fn preprocess_args(args: impl Iterator<Item = String>) -> Vec<String> {
    // Only flags that shadow positional args; named flags such as
    // --severity already work via clap.
    const POSITIONAL_ALIASES: &[&str] = &[
        "--title", // open
        "--id",    // get, update, close, attempt
        "--query", // search
    ];

    let mut result = Vec::new();
    let mut iter = args.peekable();

    while let Some(arg) = iter.next() {
        if POSITIONAL_ALIASES.contains(&arg.as_str()) {
            // Strip the flag, keep the value
            if let Some(value) = iter.next() {
                result.push(value);
            }
        } else if let Some(flag) = POSITIONAL_ALIASES
            .iter()
            .find(|f| arg.starts_with(&format!("{f}=")))
        {
            // Handle --flag=value form
            let value = arg[flag.len() + 1..].to_string();
            result.push(value);
        } else {
            result.push(arg);
        }
    }

    result
}

fn main() -> ExitCode {
    let args = preprocess_args(std::env::args());
    let cli = Cli::parse_from(args);

    if cli.silent {
        bt::SILENT.store(true, std::sync::atomic::Ordering::Relaxed);
    }
    if cli.format == OutputFormat::Csv {
        bt::CSV_OUTPUT.store(true, std::sync::atomic::Ordering::Relaxed);
    }
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    let json = cli.json || cli.format == OutputFormat::Json;

    // Run the command and handle errors
    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    // Commands that never touch the store
    match &cli.command {
        Commands::Version => return commands::meta::version(json),
        Commands::Completions { shell } => return commands::meta::completions(*shell),
        _ => {}
    }

    let config = StoreConfig::resolve(cli.root.as_deref())?;
    tracing::debug!(root = %config.root().display(), "Resolved project root");

    match &cli.command {
        // Records
        Commands::Open(args) => commands::bug::execute_open(args, &BugStore::new(&config), json),
        Commands::Get { id } => commands::bug::execute_get(id, &BugStore::new(&config), json),
        Commands::Update(args) => {
            commands::bug::execute_update(args, &BugStore::new(&config), json)
        }
        Commands::Close(args) => commands::bug::execute_close(args, &BugStore::new(&config), json),
        Commands::Attempt(args) => {
            commands::bug::execute_attempt(args, &BugStore::new(&config), json)
        }
        Commands::Link { id1, id2 } => {
            commands::bug::execute_link(id1, id2, &BugStore::new(&config), json)
        }

        // Queries
        Commands::List(args) => commands::query::execute_list(args, &BugStore::new(&config), json),
        Commands::Search { query } => {
            commands::query::execute_search(query, &BugStore::new(&config), json)
        }
        Commands::Stats => commands::query::execute_stats(&BugStore::new(&config), json),

        // Memory
        Commands::Memory { command } => {
            commands::memory::execute(command, &MemoryStore::new(&config), json)
        }

        Commands::Version | Commands::Completions { .. } => Ok(()),
    }
}
