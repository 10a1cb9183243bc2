//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for list/query commands.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON (same as --json)
    Json,
    /// Comma-separated values
    Csv,
}

pub mod commands;

/// Bug tracker - text-native bug records for coding agents
#[derive(Parser, Debug)]
#[command(name = "bt", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root (default: nearest ancestor with .cursor, .claude or .git)
    #[arg(long, global = true, env = "BT_ROOT")]
    pub root: Option<PathBuf>,

    /// Output as JSON (for agent integration)
    #[arg(long, alias = "robot", global = true)]
    pub json: bool,

    /// Output format (table, json, csv)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Output only the ID/key (for agent scripting)
    #[arg(long, global = true)]
    pub silent: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open a new bug record
    Open(OpenArgs),

    /// Show a bug's header fields
    Get {
        /// Bug ID (42, BUG-42 or BUG-0042)
        id: String,
    },

    /// Update status, severity, notes, files or tags
    Update(UpdateArgs),

    /// Close a bug with a resolution
    Close(CloseArgs),

    /// Record a fix attempt
    Attempt(AttemptArgs),

    /// List bugs
    List(ListArgs),

    /// Search bug text (case-insensitive)
    Search {
        /// Search query (multiple words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Cross-reference two bugs in both Related sections
    Link {
        /// First bug ID
        id1: String,

        /// Second bug ID
        id2: String,
    },

    /// Show counts by status, severity and resolution
    Stats,

    /// Namespaced key-value memory
    Memory {
        #[command(subcommand)]
        command: MemoryCommands,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Bug Commands
// ============================================================================

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Bug title (multiple words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,

    /// Severity (critical, high, medium, low)
    #[arg(short, long, default_value = "medium")]
    pub severity: String,

    /// Description of the bug behavior
    #[arg(short, long, default_value = "")]
    pub description: String,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Bug ID
    pub id: String,

    /// New status (open, in-progress)
    #[arg(long)]
    pub status: Option<String>,

    /// New severity (critical, high, medium, low)
    #[arg(long)]
    pub severity: Option<String>,

    /// Append a dated note to Investigation Notes
    #[arg(long)]
    pub add_note: Option<String>,

    /// Add a path to related-files
    #[arg(long)]
    pub add_file: Option<String>,

    /// Add a tag
    #[arg(long)]
    pub add_tag: Option<String>,
}

#[derive(Args, Debug)]
pub struct CloseArgs {
    /// Bug ID
    pub id: String,

    /// Resolution (fixed, wont-fix, duplicate, cannot-reproduce, by-design)
    pub resolution: String,

    /// Solution text (recorded when the resolution is fixed)
    #[arg(long)]
    pub solution: Option<String>,
}

#[derive(Args, Debug)]
pub struct AttemptArgs {
    /// Bug ID
    pub id: String,

    /// What was changed
    pub description: String,

    /// What happened
    pub result: String,

    /// The change was reverted
    #[arg(long)]
    pub reverted: bool,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Filter by status (open, in-progress, closed)
    #[arg(short, long)]
    pub status: Option<String>,

    /// Filter by severity (critical, high, medium, low)
    #[arg(long)]
    pub severity: Option<String>,
}

// ============================================================================
// Memory Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum MemoryCommands {
    /// Store a value (parsed as JSON when valid, else kept as text)
    Store {
        /// Namespace
        namespace: String,

        /// Key
        key: String,

        /// Value
        value: String,
    },

    /// Get a value
    Get {
        /// Namespace
        namespace: String,

        /// Key
        key: String,
    },

    /// Delete a key
    Delete {
        /// Namespace
        namespace: String,

        /// Key
        key: String,
    },

    /// List keys in a namespace
    List {
        /// Namespace
        namespace: String,
    },

    /// List all namespaces
    ListAll,

    /// Delete a whole namespace
    Clear {
        /// Namespace
        namespace: String,
    },

    /// Check whether a key exists (exits non-zero when it does not)
    Exists {
        /// Namespace
        namespace: String,

        /// Key
        key: String,
    },

    /// Print keys, one per line
    Keys {
        /// Namespace
        namespace: String,

        /// Glob pattern to filter keys
        #[arg(short, long)]
        pattern: Option<String>,
    },
}
