//! Read-only views over the record store.
//!
//! Every view is a full scan of the record directory. A file that cannot be
//! read is reported in `skipped` and the scan carries on; a file whose
//! header does not decode contributes its missing fields as `unknown`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{BugSummary, Severity, Status};
use crate::storage::file::file_name;
use crate::storage::frontmatter::Frontmatter;
use crate::storage::store::BugStore;

/// Bucket for records missing a field.
pub const UNKNOWN: &str = "unknown";

/// A record file left out of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub file: String,
    pub reason: String,
}

/// Rows returned by `list` and `search`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Listing {
    pub bugs: Vec<BugSummary>,
    pub skipped: Vec<Skipped>,
}

/// Store-wide counts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<String, usize>,
    /// Closed records only.
    pub by_resolution: BTreeMap<String, usize>,
    pub skipped: Vec<Skipped>,
}

/// One successfully read record file.
struct Scanned {
    file: String,
    header: Frontmatter,
    text: String,
}

impl Scanned {
    fn field(&self, key: &str) -> String {
        self.header.get_str(key).unwrap_or(UNKNOWN).to_string()
    }

    fn summary(&self) -> BugSummary {
        let stem = self.file.strip_suffix(".md").unwrap_or(&self.file);
        BugSummary {
            id: self.header.get_str("id").unwrap_or(stem).to_string(),
            title: self.field("title"),
            status: self.field("status"),
            severity: self.field("severity"),
            file: self.file.clone(),
        }
    }
}

impl BugStore {
    /// Read every record, in filename order.
    fn scan(&self) -> Result<(Vec<Scanned>, Vec<Skipped>)> {
        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for path in self.files()? {
            match read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable record");
                    skipped.push(Skipped {
                        file: file_name(&path),
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(records = records.len(), skipped = skipped.len(), "Scanned record store");
        Ok((records, skipped))
    }

    /// Records matching both filters; `None` matches everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the record directory cannot be read.
    pub fn list(&self, status: Option<Status>, severity: Option<Severity>) -> Result<Listing> {
        let (records, skipped) = self.scan()?;
        let bugs = records
            .iter()
            .filter(|r| status.is_none_or(|s| r.header.get_str("status") == Some(s.as_str())))
            .filter(|r| severity.is_none_or(|s| r.header.get_str("severity") == Some(s.as_str())))
            .map(Scanned::summary)
            .collect();
        Ok(Listing { bugs, skipped })
    }

    /// Records whose full text contains `query`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a blank query, or an error if the
    /// record directory cannot be read.
    pub fn search(&self, query: &str) -> Result<Listing> {
        if query.trim().is_empty() {
            return Err(Error::InvalidArgument("search query cannot be empty".to_string()));
        }

        let needle = query.to_lowercase();
        let (records, skipped) = self.scan()?;
        let bugs = records
            .iter()
            .filter(|r| r.text.to_lowercase().contains(&needle))
            .map(Scanned::summary)
            .collect();
        Ok(Listing { bugs, skipped })
    }

    /// Counts by status, severity and (for closed records) resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the record directory cannot be read.
    pub fn stats(&self) -> Result<Stats> {
        let (records, skipped) = self.scan()?;
        let mut stats = Stats {
            skipped,
            ..Stats::default()
        };

        for record in &records {
            stats.total += 1;
            let status = record.field("status");
            *stats.by_severity.entry(record.field("severity")).or_default() += 1;
            if status == Status::Closed.as_str() {
                *stats.by_resolution.entry(record.field("resolution")).or_default() += 1;
            }
            *stats.by_status.entry(status).or_default() += 1;
        }

        Ok(stats)
    }
}

fn read_record(path: &Path) -> std::io::Result<Scanned> {
    let text = fs::read_to_string(path)?;
    let (header, _) = Frontmatter::decode(&text);
    Ok(Scanned {
        file: file_name(path),
        header,
        text,
    })
}
