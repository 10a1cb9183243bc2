//! Frontmatter codec.
//!
//! A record starts with a header block delimited by `---` lines:
//!
//! ```text
//! ---
//! id: BUG-0001
//! title: Login crashes on empty password
//! tags: [auth, crash]
//! ---
//! ```
//!
//! Each line is `key: value`; a value wrapped in `[...]` is a
//! comma-separated list. Keys keep their order, and keys this crate does
//! not know about survive a decode/encode cycle untouched.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Header block delimiter line.
pub const DELIMITER: &str = "---";

/// Known header keys, in the order a fresh record lists them.
pub const CANONICAL_KEYS: [&str; 10] = [
    "id",
    "title",
    "status",
    "severity",
    "created",
    "updated",
    "closed",
    "resolution",
    "related-files",
    "tags",
];

/// Known keys that always hold plain text, even when the text is bracketed.
const SCALAR_KEYS: [&str; 8] = [
    "id", "title", "status", "severity", "created", "updated", "closed", "resolution",
];

/// A header value: plain text or an ordered list of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    fn parse(key: &str, raw: &str) -> Self {
        let raw = raw.trim();
        if SCALAR_KEYS.contains(&key) {
            return Self::Scalar(raw.to_string());
        }
        match raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            Some(inner) => Self::List(
                inner
                    .split(',')
                    .map(|item| item.trim().trim_matches(|c: char| c == '"' || c == '\'').trim())
                    .filter(|item| !item.is_empty())
                    .map(ToString::to_string)
                    .collect(),
            ),
            None => Self::Scalar(raw.to_string()),
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::List(items) => format!("[{}]", items.join(", ")),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(s) => serializer.serialize_str(s),
            Self::List(items) => items.serialize(serializer),
        }
    }
}

/// Ordered key→value header of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: Vec<(String, FieldValue)>,
}

/// Locate the header block.
///
/// Returns the text between the delimiters and the body that follows the
/// closing delimiter (starting with the newline that ends that line).
/// `None` when the first line is not a delimiter or the block never closes.
#[must_use]
pub fn split(content: &str) -> Option<(&str, &str)> {
    let first_end = content.find('\n')?;
    if content[..first_end].trim_end() != DELIMITER {
        return None;
    }

    let mut offset = first_end + 1;
    for line in content[offset..].split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let header = &content[first_end + 1..offset];
            let body = &content[offset + DELIMITER.len()..];
            return Some((header, body));
        }
        offset += line.len();
    }

    None
}

impl Frontmatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a whole file leniently.
    ///
    /// A missing or unterminated header yields an empty mapping and the
    /// entire input as body.
    #[must_use]
    pub fn decode(content: &str) -> (Self, &str) {
        match split(content) {
            Some((header, body)) => (Self::decode_block(header), body),
            None => (Self::new(), content),
        }
    }

    /// Decode a whole file, returning `None` when there is no header block.
    #[must_use]
    pub fn parse(content: &str) -> Option<(Self, &str)> {
        split(content).map(|(header, body)| (Self::decode_block(header), body))
    }

    /// Decode the lines between the delimiters.
    ///
    /// Blank lines and lines without a colon are skipped. A repeated key
    /// overwrites the earlier value in place.
    #[must_use]
    pub fn decode_block(block: &str) -> Self {
        let mut fm = Self::new();
        for line in block.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            fm.replace_or_push(key, FieldValue::parse(key, value));
        }
        fm
    }

    /// Encode as a delimited block (no trailing newline; the body supplies it).
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::from(DELIMITER);
        out.push('\n');
        for (key, value) in &self.entries {
            let rendered = value.render();
            if rendered.is_empty() {
                out.push_str(key);
                out.push(':');
            } else {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(&rendered);
            }
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Scalar value of `key`, treating an empty scalar as absent.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            FieldValue::Scalar(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// List value of `key`. A non-empty scalar is read as a one-item list.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(FieldValue::List(items)) => items.clone(),
            Some(FieldValue::Scalar(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Set a value, keeping an existing key where it is.
    ///
    /// A new known key goes to its canonical slot relative to the known
    /// keys already present; a new unknown key is appended.
    pub fn set(&mut self, key: &str, value: FieldValue) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
            return;
        }

        let pos = canonical_rank(key).map_or(self.entries.len(), |rank| {
            self.entries
                .iter()
                .position(|(k, _)| canonical_rank(k).is_some_and(|r| r > rank))
                .unwrap_or(self.entries.len())
        });
        self.entries.insert(pos, (key.to_string(), value));
    }

    pub fn set_str(&mut self, key: &str, value: impl Into<String>) {
        self.set(key, FieldValue::Scalar(value.into()));
    }

    /// Append `item` to the list at `key` unless it is already there.
    ///
    /// Returns whether the header changed.
    pub fn push_unique(&mut self, key: &str, item: &str) -> bool {
        let mut items = self.get_list(key);
        if items.iter().any(|existing| existing == item) {
            return false;
        }
        items.push(item.to_string());
        self.set(key, FieldValue::List(items));
        true
    }

    fn replace_or_push(&mut self, key: &str, value: FieldValue) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }
}

fn canonical_rank(key: &str) -> Option<usize> {
    CANONICAL_KEYS.iter().position(|k| *k == key)
}

impl Serialize for Frontmatter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
