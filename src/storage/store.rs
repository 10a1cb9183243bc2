//! Record store.
//!
//! One markdown file per bug under `<root>/data/bugs`. Every operation is a
//! single read-modify-write pass: the file is loaded whole, the header goes
//! through the frontmatter codec, the body through the section editor, and
//! the reassembled text is written back with [`atomic_write`]. `link` is the
//! only operation that touches two files; both are validated and rendered
//! before either is written.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::model::{Attempt, BugId, Resolution, SectionName, Severity, Status};
use crate::storage::file::{atomic_write, file_name, record_files};
use crate::storage::frontmatter::Frontmatter;
use crate::storage::sections::{self, SectionNotFound};
use crate::storage::template::{self, RELATED_BUGS_MARKER};
use crate::validate::{self, find_similar_ids};

/// Date format used in headers and dated entries.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of leading title words used by the duplicate heuristic.
const DUPLICATE_TOKENS: usize = 3;

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// A record loaded for modification.
#[derive(Debug, Clone)]
struct Record {
    path: PathBuf,
    header: Frontmatter,
    body: String,
}

impl Record {
    /// Load a record, failing if it has no header block.
    fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let (header, body) = Frontmatter::parse(&content).ok_or_else(|| Error::MalformedRecord {
            path: path.to_path_buf(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            header,
            body: body.to_string(),
        })
    }

    /// Canonical id: the header's own id, else the one in the filename.
    fn id(&self) -> String {
        if let Some(id) = self.header.get_str("id") {
            return id.to_string();
        }
        let name = file_name(&self.path);
        BugId::from_filename(&name).map_or(name, |id| id.to_string())
    }

    fn status(&self) -> Option<&str> {
        self.header.get_str("status")
    }

    fn section_error(&self, err: SectionNotFound) -> Error {
        Error::SectionNotFound {
            section: err.0,
            path: self.path.clone(),
        }
    }

    fn render(&self) -> String {
        format!("{}{}", self.header.encode(), self.body)
    }

    fn save(&self) -> Result<()> {
        atomic_write(&self.path, &self.render())?;
        debug!(path = %self.path.display(), "Record written");
        Ok(())
    }
}

// ── Operation inputs and outcomes ────────────────────────────

/// Fields accepted by [`BugStore::update`]. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct UpdateFields {
    pub status: Option<Status>,
    pub severity: Option<Severity>,
    pub note: Option<String>,
    pub add_file: Option<String>,
    pub add_tag: Option<String>,
}

impl UpdateFields {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.severity.is_none()
            && self.note.is_none()
            && self.add_file.is_none()
            && self.add_tag.is_none()
    }
}

/// Result of [`BugStore::open`].
#[derive(Debug, Clone, Serialize)]
pub struct Opened {
    pub id: String,
    pub file: String,
    pub path: PathBuf,
    /// Existing records that look like the same bug.
    pub possible_duplicates: Vec<String>,
}

/// Result of [`BugStore::get`].
#[derive(Debug, Clone, Serialize)]
pub struct BugRecord {
    pub id: String,
    pub path: PathBuf,
    pub header: Frontmatter,
}

/// Result of [`BugStore::update`].
#[derive(Debug, Clone, Serialize)]
pub struct Updated {
    pub id: String,
    pub path: PathBuf,
    /// Names of the fields that changed; empty for a no-op.
    pub changed: Vec<&'static str>,
}

/// Result of [`BugStore::close`].
#[derive(Debug, Clone, Serialize)]
pub struct Closed {
    pub id: String,
    pub path: PathBuf,
    pub resolution: Resolution,
    pub solution_recorded: bool,
}

/// Result of [`BugStore::attempt`].
#[derive(Debug, Clone, Serialize)]
pub struct Attempted {
    pub id: String,
    pub path: PathBuf,
    pub attempt: Attempt,
    pub status: String,
}

/// Result of [`BugStore::link`].
#[derive(Debug, Clone, Serialize)]
pub struct Linked {
    pub source: String,
    pub target: String,
    /// Ids of the records whose Related section was modified.
    pub modified: Vec<String>,
}

// ── Store ────────────────────────────────────────────────────

/// Filesystem-backed record store.
#[derive(Debug, Clone)]
pub struct BugStore {
    dir: PathBuf,
    clock: fn() -> NaiveDate,
}

impl BugStore {
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            dir: config.bugs_dir(),
            clock: local_today,
        }
    }

    /// Replace the clock used for `created`/`updated`/`closed` dates.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn today(&self) -> String {
        (self.clock)().format(DATE_FORMAT).to_string()
    }

    /// Every record file, sorted by filename.
    ///
    /// # Errors
    ///
    /// Returns an error if the record directory cannot be read.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        Ok(record_files(&self.dir)?)
    }

    /// Next free id: one past the highest id among well-formed filenames.
    ///
    /// # Errors
    ///
    /// Returns `IdsExhausted` when the highest id is already the largest
    /// representable one, or an error if the record directory cannot be read.
    pub fn next_id(&self) -> Result<BugId> {
        let max = self
            .files()?
            .iter()
            .filter_map(|p| BugId::from_filename(&file_name(p)))
            .map(BugId::number)
            .max()
            .unwrap_or(0);
        max.checked_add(1)
            .map(BugId::new)
            .ok_or_else(|| Error::IdsExhausted {
                last: BugId::new(max).to_string(),
            })
    }

    /// Path of the record with this id.
    ///
    /// # Errors
    ///
    /// Returns `BugNotFound` (with similar ids when any exist) if no
    /// filename carries the id.
    pub fn find(&self, id: BugId) -> Result<PathBuf> {
        let files = self.files()?;
        if let Some(path) = files
            .iter()
            .find(|p| BugId::from_filename(&file_name(p)) == Some(id))
        {
            return Ok(path.clone());
        }

        let existing: Vec<String> = files
            .iter()
            .filter_map(|p| BugId::from_filename(&file_name(p)))
            .map(|id| id.to_string())
            .collect();
        let similar = find_similar_ids(&id.to_string(), &existing, 3);
        if similar.is_empty() {
            Err(Error::BugNotFound { id: id.to_string() })
        } else {
            Err(Error::BugNotFoundSimilar {
                id: id.to_string(),
                similar,
            })
        }
    }

    /// Create a new record from the template.
    ///
    /// # Errors
    ///
    /// Returns `EmptyTitle` for a blank title, `InvalidArgument` for a
    /// multi-line title or a description that would break the section
    /// layout, or an I/O error.
    pub fn open(&self, title: &str, severity: Severity, description: &str) -> Result<Opened> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::EmptyTitle);
        }
        validate::single_line("title", title)?;
        validate::section_text("description", description)?;

        fs::create_dir_all(&self.dir)?;
        let files = self.files()?;
        let id = self.next_id()?;

        let duplicates = possible_duplicates(title, &files);
        for dup in &duplicates {
            warn!(%id, existing = %dup, "Possible duplicate");
        }

        let path = self.dir.join(id.filename(title));
        let content = template::render(id, title, severity, description, &self.today());
        atomic_write(&path, &content)?;
        info!(%id, path = %path.display(), "Opened bug");

        Ok(Opened {
            id: id.to_string(),
            file: file_name(&path),
            path,
            possible_duplicates: duplicates,
        })
    }

    /// Header and location of a record. The body is not parsed.
    ///
    /// # Errors
    ///
    /// Returns `BugNotFound` or `MalformedRecord`.
    pub fn get(&self, id: BugId) -> Result<BugRecord> {
        let record = Record::load(&self.find(id)?)?;
        Ok(BugRecord {
            id: record.id(),
            path: record.path,
            header: record.header,
        })
    }

    /// Apply the supplied fields.
    ///
    /// Nothing is written when every supplied value is already in place.
    /// A blank file or tag counts as not supplied.
    ///
    /// # Errors
    ///
    /// Returns `StatusTransition` for moves into or out of `closed`,
    /// `InvalidArgument` for a blank or malformed note, file or tag, and
    /// `SectionNotFound` when a note is given but Investigation Notes is
    /// missing. Nothing is written on error.
    pub fn update(&self, id: BugId, fields: &UpdateFields) -> Result<Updated> {
        if let Some(note) = &fields.note {
            if note.trim().is_empty() {
                return Err(Error::InvalidArgument("note cannot be empty".to_string()));
            }
            validate::section_text("note", note)?;
        }
        let add_file = non_blank(fields.add_file.as_deref());
        let add_tag = non_blank(fields.add_tag.as_deref());
        if let Some(file) = add_file {
            validate::list_item("related file", file)?;
        }
        if let Some(tag) = add_tag {
            validate::list_item("tag", tag)?;
        }

        let mut record = Record::load(&self.find(id)?)?;
        let today = self.today();
        let mut changed = Vec::new();

        if let Some(status) = fields.status {
            let current = record.status().unwrap_or_default().to_string();
            if current != status.as_str() {
                if status == Status::Closed || current == Status::Closed.as_str() {
                    return Err(Error::StatusTransition {
                        id: record.id(),
                        from: current,
                        to: status.to_string(),
                    });
                }
                record.header.set_str("status", status.as_str());
                changed.push("status");
            }
        }

        if let Some(severity) = fields.severity {
            if record.header.get_str("severity") != Some(severity.as_str()) {
                record.header.set_str("severity", severity.as_str());
                changed.push("severity");
            }
        }

        if let Some(file) = add_file {
            if record.header.push_unique("related-files", file) {
                changed.push("related-files");
            }
        }

        if let Some(tag) = add_tag {
            if record.header.push_unique("tags", tag) {
                changed.push("tags");
            }
        }

        if let Some(note) = &fields.note {
            let entry = format!("**[{today}]** {}", note.trim());
            record.body = sections::append(
                &record.body,
                SectionName::InvestigationNotes.heading(),
                &entry,
            )
            .map_err(|e| record.section_error(e))?;
            changed.push("note");
        }

        if changed.is_empty() {
            debug!(id = %record.id(), "Update is a no-op");
        } else {
            record.header.set_str("updated", today);
            record.save()?;
            info!(id = %record.id(), ?changed, "Updated bug");
        }

        Ok(Updated {
            id: record.id(),
            path: record.path,
            changed,
        })
    }

    /// Close a record with a resolution.
    ///
    /// A `fixed` resolution with solution text replaces the Solution section.
    ///
    /// # Errors
    ///
    /// Returns `BugNotFound`, `InvalidArgument` for solution text that would
    /// break the section layout, or `SectionNotFound` when a solution is
    /// given and the Solution section is missing. Nothing is written on error.
    pub fn close(&self, id: BugId, resolution: Resolution, solution: Option<&str>) -> Result<Closed> {
        let solution = solution.map(str::trim).filter(|s| !s.is_empty());
        if let Some(text) = solution {
            validate::section_text("solution", text)?;
        }

        let mut record = Record::load(&self.find(id)?)?;
        let today = self.today();

        let solution_recorded = resolution == Resolution::Fixed && solution.is_some();
        if let (Resolution::Fixed, Some(text)) = (resolution, solution) {
            record.body = sections::replace(&record.body, SectionName::Solution.heading(), text)
                .map_err(|e| record.section_error(e))?;
        }

        record.header.set_str("status", Status::Closed.as_str());
        record.header.set_str("closed", today.clone());
        record.header.set_str("updated", today);
        record.header.set_str("resolution", resolution.as_str());
        record.save()?;
        info!(id = %record.id(), %resolution, "Closed bug");

        Ok(Closed {
            id: record.id(),
            path: record.path,
            resolution,
            solution_recorded,
        })
    }

    /// Append a numbered fix attempt. An `open` bug becomes `in-progress`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyDescription`/`EmptyResult` for blank text,
    /// `InvalidArgument` when either spans more than one line, or
    /// `SectionNotFound` when Attempted Fixes is missing.
    pub fn attempt(
        &self,
        id: BugId,
        description: &str,
        result: &str,
        reverted: bool,
    ) -> Result<Attempted> {
        let description = description.trim();
        let result = result.trim();
        if description.is_empty() {
            return Err(Error::EmptyDescription);
        }
        if result.is_empty() {
            return Err(Error::EmptyResult);
        }
        validate::single_line("attempt description", description)?;
        validate::single_line("attempt result", result)?;

        let mut record = Record::load(&self.find(id)?)?;
        let today = self.today();
        let heading = SectionName::AttemptedFixes.heading();

        let existing = sections::count_entries(&record.body, heading, Attempt::is_entry_heading)
            .map_err(|e| record.section_error(e))?;
        let attempt = Attempt {
            number: existing + 1,
            date: today.clone(),
            description: description.to_string(),
            result: result.to_string(),
            reverted,
        };
        record.body = sections::append(&record.body, heading, &attempt.render())
            .map_err(|e| record.section_error(e))?;

        if record.status() == Some(Status::Open.as_str()) {
            record.header.set_str("status", Status::InProgress.as_str());
        }
        record.header.set_str("updated", today);
        record.save()?;
        info!(id = %record.id(), number = attempt.number, "Recorded attempt");

        Ok(Attempted {
            id: record.id(),
            status: record.status().unwrap_or_default().to_string(),
            path: record.path,
            attempt,
        })
    }

    /// Cross-reference two records in both Related sections.
    ///
    /// A side that already mentions the other id is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `BugNotFound` for either id, `SelfLink` when both resolve to
    /// the same record, or `SectionNotFound` when either record lacks a
    /// Related section. Neither file is written on error.
    pub fn link(&self, a: BugId, b: BugId) -> Result<Linked> {
        let path_a = self.find(a)?;
        let path_b = self.find(b)?;
        if path_a == path_b {
            return Err(Error::SelfLink { id: a.to_string() });
        }

        let mut rec_a = Record::load(&path_a)?;
        let mut rec_b = Record::load(&path_b)?;
        let (id_a, id_b) = (rec_a.id(), rec_b.id());
        if id_a == id_b {
            return Err(Error::SelfLink { id: id_a });
        }

        let body_a = add_related(&rec_a.body, &id_b).map_err(|e| rec_a.section_error(e))?;
        let body_b = add_related(&rec_b.body, &id_a).map_err(|e| rec_b.section_error(e))?;

        let today = self.today();
        let mut modified = Vec::new();
        for (record, body) in [(&mut rec_a, body_a), (&mut rec_b, body_b)] {
            if let Some(body) = body {
                record.body = body;
                record.header.set_str("updated", today.clone());
                record.save()?;
                modified.push(record.id());
            }
        }
        info!(source = %id_a, target = %id_b, ?modified, "Linked bugs");

        Ok(Linked {
            source: id_a,
            target: id_b,
            modified,
        })
    }
}

/// Trimmed value, or `None` when absent or blank.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Files whose text contains each of the first words of `title`.
fn possible_duplicates(title: &str, files: &[PathBuf]) -> Vec<String> {
    let lowered = title.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().take(DUPLICATE_TOKENS).collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for path in files {
        let text = match fs::read_to_string(path) {
            Ok(text) => text.to_lowercase(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable record in duplicate check");
                continue;
            }
        };
        if tokens.iter().all(|t| text.contains(t)) {
            hits.push(file_name(path));
        }
    }
    hits
}

/// Add `other` to the Related section of `body`.
///
/// Returns `None` when the section already mentions `other`.
fn add_related(body: &str, other: &str) -> std::result::Result<Option<String>, SectionNotFound> {
    let span = sections::locate(body, SectionName::Related.heading())?;
    let section = &body[span.clone()];
    if contains_token(section, other) {
        return Ok(None);
    }

    let mut offset = span.start;
    for line in section.split_inclusive('\n') {
        let text = line.trim_end_matches('\n').trim_end_matches('\r');
        if let Some(rest) = text.trim_start().strip_prefix(RELATED_BUGS_MARKER) {
            let indent = &text[..text.len() - text.trim_start().len()];
            let new_line = if rest.trim().is_empty() {
                format!("{indent}{RELATED_BUGS_MARKER} {other}")
            } else {
                format!("{indent}{RELATED_BUGS_MARKER} {}, {other}", rest.trim())
            };
            let line_span = offset..offset + text.len();
            return Ok(Some(sections::splice(body, line_span, &new_line)));
        }
        offset += line.len();
    }

    let existing = section.trim_end();
    let new_content = if existing.trim().is_empty() {
        format!("\n\n{RELATED_BUGS_MARKER} {other}\n")
    } else {
        format!("{existing}\n{RELATED_BUGS_MARKER} {other}\n")
    };
    Ok(Some(sections::splice(body, span, &new_content)))
}

/// Whether `needle` occurs in `haystack` as a whole token.
fn contains_token(haystack: &str, needle: &str) -> bool {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}
