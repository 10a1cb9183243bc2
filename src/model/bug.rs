//! Bug record vocabulary.
//!
//! Bugs are persisted as markdown files named `BUG-<4-digit-id>-<slug>.md`.
//! This module holds the typed values that appear in a record's header
//! and body: identifiers, the three enumerations, section headings, and
//! attempt entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::validate::suggest;

/// Filename prefix shared by every record.
pub const ID_PREFIX: &str = "BUG-";

/// Maximum slug length in a record filename.
pub const SLUG_MAX_LEN: usize = 50;

// ── Identifier ───────────────────────────────────────────────

/// Numeric bug identifier, displayed as `BUG-0042`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BugId(u32);

impl BugId {
    #[must_use]
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    #[must_use]
    pub const fn number(self) -> u32 {
        self.0
    }

    /// Normalize user input into an id.
    ///
    /// Accepts `42`, `BUG-42`, `bug-0042` and `BUG-0042`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if the remainder is not a plain decimal number.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let digits = strip_prefix_ignore_case(trimmed, ID_PREFIX).unwrap_or(trimmed);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidId(input.to_string()));
        }

        digits
            .parse::<u32>()
            .map(Self)
            .map_err(|_| Error::InvalidId(input.to_string()))
    }

    /// Extract the id from a record filename.
    ///
    /// Only `BUG-<digits>-<anything>.md` and `BUG-<digits>.md` match;
    /// anything else (including `BUG-12abc.md`) is ignored.
    #[must_use]
    pub fn from_filename(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(".md")?;
        let rest = stem.strip_prefix(ID_PREFIX)?;

        let digit_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digit_len == 0 {
            return None;
        }

        let (digits, tail) = rest.split_at(digit_len);
        if !tail.is_empty() && !tail.starts_with('-') {
            return None;
        }

        digits.parse().ok().map(Self)
    }

    /// Build the filename for a new record.
    ///
    /// The `-` separator is always present, so a title with no word
    /// characters still yields a `BUG-0001-*.md` match (`BUG-0001-.md`).
    #[must_use]
    pub fn filename(self, title: &str) -> String {
        format!("{self}-{}.md", slugify(title))
    }
}

impl fmt::Display for BugId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ID_PREFIX}{:04}", self.0)
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Convert a title to a filename slug.
///
/// Lower-cases, drops everything except word characters, whitespace and
/// hyphens, turns runs of whitespace/underscores into single hyphens,
/// collapses repeated hyphens, trims hyphens at both ends and then caps
/// the result at [`SLUG_MAX_LEN`] characters. The cap is applied last, so
/// a truncated slug may end in a hyphen.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.to_lowercase().chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            pending_hyphen = true;
        } else if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        }
    }

    slug.chars().take(SLUG_MAX_LEN).collect()
}

// ── Enumerations ─────────────────────────────────────────────

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $error:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in canonical order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Canonical text used in record headers.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Canonical texts of every value.
            #[must_use]
            pub fn names() -> Vec<&'static str> {
                Self::ALL.iter().map(Self::as_str).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(Error::$error {
                        value: s.to_string(),
                        suggestion: suggest(s, &Self::names()),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Lifecycle state of a bug.
    Status, InvalidStatus {
        Open => "open",
        InProgress => "in-progress",
        Closed => "closed",
    }
}

string_enum! {
    /// How bad a bug is.
    Severity, InvalidSeverity {
        Critical => "critical",
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

string_enum! {
    /// Why a bug was closed.
    Resolution, InvalidResolution {
        Fixed => "fixed",
        WontFix => "wont-fix",
        Duplicate => "duplicate",
        CannotReproduce => "cannot-reproduce",
        ByDesign => "by-design",
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Medium
    }
}

// ── Sections ─────────────────────────────────────────────────

/// Fixed body sections of a record, in template order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionName {
    Description,
    ExpectedBehavior,
    ReproductionSteps,
    Environment,
    InvestigationNotes,
    ProbableCause,
    AttemptedFixes,
    Solution,
    Related,
}

impl SectionName {
    pub const ALL: [Self; 9] = [
        Self::Description,
        Self::ExpectedBehavior,
        Self::ReproductionSteps,
        Self::Environment,
        Self::InvestigationNotes,
        Self::ProbableCause,
        Self::AttemptedFixes,
        Self::Solution,
        Self::Related,
    ];

    /// Heading text as it appears after `## `.
    #[must_use]
    pub const fn heading(&self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::ExpectedBehavior => "Expected Behavior",
            Self::ReproductionSteps => "Reproduction Steps",
            Self::Environment => "Environment",
            Self::InvestigationNotes => "Investigation Notes",
            Self::ProbableCause => "Probable Cause",
            Self::AttemptedFixes => "Attempted Fixes",
            Self::Solution => "Solution",
            Self::Related => "Related",
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

// ── Attempts ─────────────────────────────────────────────────

/// Heading prefix of an attempt entry inside Attempted Fixes.
pub const ATTEMPT_MARKER: &str = "Attempt ";

/// One fix trial recorded under Attempted Fixes.
///
/// The number is derived from the entries already in the section at
/// append time; it is never stored anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub number: usize,
    pub date: String,
    pub description: String,
    pub result: String,
    pub reverted: bool,
}

impl Attempt {
    /// Render the entry as it is written into the record body.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "### {ATTEMPT_MARKER}{}: {}\n- **Date:** {}\n- **Changes:** {}\n- **Result:** {}\n- **Reverted:** {}",
            self.number,
            self.description,
            self.date,
            self.description,
            self.result,
            if self.reverted { "yes" } else { "no" },
        )
    }

    /// Whether a level-3 heading text marks an attempt entry.
    #[must_use]
    pub fn is_entry_heading(text: &str) -> bool {
        text.strip_prefix(ATTEMPT_MARKER).is_some_and(|rest| {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            digits > 0
        })
    }
}

// ── Query rows ───────────────────────────────────────────────

/// Header-only view of a record, as produced by list and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BugSummary {
    pub id: String,
    pub title: String,
    pub status: String,
    pub severity: String,
    pub file: String,
}
