//! Error types for the bug tracker.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (3=not_found, 4=validation, 5=structural, 8=io)
//! - Retryability flags for agent self-correction
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bug tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Agents match on the string; shell scripts on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Not Found (exit 3)
    BugNotFound,
    KeyNotFound,
    NamespaceNotFound,

    // Validation (exit 4)
    EmptyTitle,
    EmptyDescription,
    EmptyResult,
    InvalidSeverity,
    InvalidStatus,
    InvalidResolution,
    InvalidId,
    SelfLink,
    InvalidNamespace,
    InvalidArgument,

    // Structural (exit 5)
    SectionNotFound,
    MalformedRecord,
    IdsExhausted,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::BugNotFound => "BUG_NOT_FOUND",
            Self::KeyNotFound => "KEY_NOT_FOUND",
            Self::NamespaceNotFound => "NAMESPACE_NOT_FOUND",
            Self::EmptyTitle => "EMPTY_TITLE",
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::EmptyResult => "EMPTY_RESULT",
            Self::InvalidSeverity => "INVALID_SEVERITY",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::InvalidResolution => "INVALID_RESOLUTION",
            Self::InvalidId => "INVALID_ID",
            Self::SelfLink => "SELF_LINK",
            Self::InvalidNamespace => "INVALID_NAMESPACE",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::SectionNotFound => "SECTION_NOT_FOUND",
            Self::MalformedRecord => "MALFORMED_RECORD",
            Self::IdsExhausted => "IDS_EXHAUSTED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::BugNotFound | Self::KeyNotFound | Self::NamespaceNotFound => 3,
            Self::EmptyTitle
            | Self::EmptyDescription
            | Self::EmptyResult
            | Self::InvalidSeverity
            | Self::InvalidStatus
            | Self::InvalidResolution
            | Self::InvalidId
            | Self::SelfLink
            | Self::InvalidNamespace
            | Self::InvalidArgument => 4,
            Self::SectionNotFound | Self::MalformedRecord | Self::IdsExhausted => 5,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether an agent should retry with corrected input.
    ///
    /// True for validation errors. False for not-found, structural,
    /// I/O, or internal errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::EmptyTitle
                | Self::EmptyDescription
                | Self::EmptyResult
                | Self::InvalidSeverity
                | Self::InvalidStatus
                | Self::InvalidResolution
                | Self::InvalidId
                | Self::SelfLink
                | Self::InvalidNamespace
                | Self::InvalidArgument
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in bug tracker operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Bug title cannot be empty")]
    EmptyTitle,

    #[error("Attempt description cannot be empty")]
    EmptyDescription,

    #[error("Attempt result cannot be empty")]
    EmptyResult,

    #[error("Invalid severity: {value}{}", did_you_mean(suggestion.as_deref()))]
    InvalidSeverity {
        value: String,
        suggestion: Option<String>,
    },

    #[error("Invalid status: {value}{}", did_you_mean(suggestion.as_deref()))]
    InvalidStatus {
        value: String,
        suggestion: Option<String>,
    },

    #[error("Cannot change status of {id} from {from} to {to}")]
    StatusTransition { id: String, from: String, to: String },

    #[error("Invalid resolution: {value}{}", did_you_mean(suggestion.as_deref()))]
    InvalidResolution {
        value: String,
        suggestion: Option<String>,
    },

    #[error("Invalid bug ID: {0}. Must be a number (e.g., 42, BUG-42, BUG-0042)")]
    InvalidId(String),

    #[error("Cannot link a bug to itself: {id}")]
    SelfLink { id: String },

    #[error("Bug {id} not found")]
    BugNotFound { id: String },

    #[error("Bug {id} not found (did you mean: {}?)", similar.join(", "))]
    BugNotFoundSimilar { id: String, similar: Vec<String> },

    #[error("Could not find {section} section in {}", path.display())]
    SectionNotFound { section: String, path: PathBuf },

    #[error("Malformed record {}: missing or unterminated frontmatter", path.display())]
    MalformedRecord { path: PathBuf },

    #[error("No bug IDs left: {last} is the highest possible ID")]
    IdsExhausted { last: String },

    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("Namespace \"{0}\" does not exist")]
    NamespaceNotFound(String),

    #[error("Key \"{key}\" not found in {namespace}")]
    KeyNotFound { namespace: String, key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

fn did_you_mean(suggestion: Option<&str>) -> String {
    suggestion.map_or_else(String::new, |s| format!(". Did you mean '{s}'?"))
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyTitle => ErrorCode::EmptyTitle,
            Self::EmptyDescription => ErrorCode::EmptyDescription,
            Self::EmptyResult => ErrorCode::EmptyResult,
            Self::InvalidSeverity { .. } => ErrorCode::InvalidSeverity,
            Self::InvalidStatus { .. } | Self::StatusTransition { .. } => ErrorCode::InvalidStatus,
            Self::InvalidResolution { .. } => ErrorCode::InvalidResolution,
            Self::InvalidId(_) => ErrorCode::InvalidId,
            Self::SelfLink { .. } => ErrorCode::SelfLink,
            Self::BugNotFound { .. } | Self::BugNotFoundSimilar { .. } => ErrorCode::BugNotFound,
            Self::SectionNotFound { .. } => ErrorCode::SectionNotFound,
            Self::MalformedRecord { .. } => ErrorCode::MalformedRecord,
            Self::IdsExhausted { .. } => ErrorCode::IdsExhausted,
            Self::InvalidNamespace(_) => ErrorCode::InvalidNamespace,
            Self::NamespaceNotFound(_) => ErrorCode::NamespaceNotFound,
            Self::KeyNotFound { .. } => ErrorCode::KeyNotFound,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for agents and humans.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::InvalidSeverity { .. } => {
                Some("Valid severities: critical, high, medium, low".to_string())
            }
            Self::InvalidStatus { .. } => {
                Some("Valid statuses: open, in-progress, closed".to_string())
            }
            Self::StatusTransition { id, to, .. } if to == "closed" => Some(format!(
                "Close bugs with a resolution: bt close {id} <fixed|wont-fix|duplicate|cannot-reproduce|by-design>"
            )),
            Self::StatusTransition { .. } => Some(
                "Closed bugs keep their status. Open a new bug and link it: bt link <old> <new>"
                    .to_string(),
            ),
            Self::InvalidResolution { .. } => Some(
                "Valid resolutions: fixed, wont-fix, duplicate, cannot-reproduce, by-design"
                    .to_string(),
            ),
            Self::BugNotFound { id } => Some(format!(
                "No bug with ID '{id}'. Use `bt list` to see available bugs."
            )),
            Self::BugNotFoundSimilar { similar, .. } => {
                Some(format!("Did you mean: {}?", similar.join(", ")))
            }
            Self::SectionNotFound { section, .. } => Some(format!(
                "The record template is damaged. Restore the '## {section}' heading and retry."
            )),
            Self::MalformedRecord { .. } => Some(
                "Records must start with a '---' delimited header block.".to_string(),
            ),
            Self::NamespaceNotFound(_) => {
                Some("Use `bt memory list-all` to see existing namespaces.".to_string())
            }
            Self::IdsExhausted { last } => Some(format!(
                "Rename the record file for {last} to a lower number; new IDs follow the highest one on disk."
            )),

            Self::EmptyTitle
            | Self::EmptyDescription
            | Self::EmptyResult
            | Self::InvalidId(_)
            | Self::SelfLink { .. }
            | Self::InvalidNamespace(_)
            | Self::KeyNotFound { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint. Agents parse this instead of stderr text.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
