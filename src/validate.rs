//! Input validation helpers for agent ergonomics.
//!
//! Enumerated fields are matched exactly; on a miss the closest valid
//! value (by edit distance) is offered as a suggestion so agents can
//! self-correct on retry.
//!
//! Free text is checked against the record format before anything is
//! written: header values must stay on one line, list items must not
//! contain the list syntax, and section text must not open a section of
//! its own.

use crate::error::{Error, Result};
use crate::storage::sections;

// ── Suggestions ──────────────────────────────────────────────

/// Find the closest valid value for a mistyped input.
///
/// Case differences alone are suggested directly (the store matches
/// values case-sensitively). Otherwise the nearest value within an
/// edit distance of 3 wins; ties resolve to the earlier candidate.
#[must_use]
pub fn suggest(input: &str, valid: &[&str]) -> Option<String> {
    let lower = input.to_lowercase();
    if let Some(v) = valid.iter().find(|v| **v == lower) {
        return Some((*v).to_string());
    }

    let mut best: Option<(&str, usize)> = None;
    for &v in valid {
        let dist = levenshtein_distance(&lower, v);
        if dist <= 3 && best.is_none_or(|(_, d)| dist < d) {
            best = Some((v, dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Use single-row optimization (O(min(m,n)) space)
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Find existing IDs similar to the searched ID.
///
/// Returns up to `max` suggestions with edit distance ≤ 2,
/// sorted by distance then alphabetically.
#[must_use]
pub fn find_similar_ids(searched: &str, existing: &[String], max: usize) -> Vec<String> {
    let searched = searched.to_uppercase();
    let mut candidates: Vec<(usize, &str)> = existing
        .iter()
        .map(|id| (levenshtein_distance(&searched, id), id.as_str()))
        .filter(|(dist, _)| *dist <= 2)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    candidates
        .into_iter()
        .take(max)
        .map(|(_, id)| id.to_string())
        .collect()
}

// ── Record text ──────────────────────────────────────────────

/// Check a value that is written as one header line or one body line.
///
/// # Errors
///
/// Returns `InvalidArgument` if the value contains a line break or any
/// other control character.
pub fn single_line(field: &str, value: &str) -> Result<()> {
    if value.chars().any(char::is_control) {
        return Err(Error::InvalidArgument(format!(
            "{field} must be a single line without control characters"
        )));
    }
    Ok(())
}

/// Check an item for a `[a, b]` header list.
///
/// # Errors
///
/// Returns `InvalidArgument` for control characters, for `,` `[` `]`,
/// or for surrounding quotes, none of which survive a decode.
pub fn list_item(field: &str, value: &str) -> Result<()> {
    single_line(field, value)?;
    if value.contains([',', '[', ']']) {
        return Err(Error::InvalidArgument(format!(
            "{field} cannot contain ',', '[' or ']': {value}"
        )));
    }
    if value.starts_with(['"', '\'']) || value.ends_with(['"', '\'']) {
        return Err(Error::InvalidArgument(format!(
            "{field} cannot start or end with a quote: {value}"
        )));
    }
    Ok(())
}

/// Check text that is inserted into a body section.
///
/// Line breaks and tabs are allowed; other control characters, headings
/// at section level and unclosed code fences are not.
///
/// # Errors
///
/// Returns `InvalidArgument` describing the first problem found.
pub fn section_text(field: &str, value: &str) -> Result<()> {
    if value
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    {
        return Err(Error::InvalidArgument(format!(
            "{field} cannot contain control characters"
        )));
    }
    if let Some(problem) = sections::structural_conflict(value) {
        return Err(Error::InvalidArgument(format!("{field} {problem}")));
    }
    Ok(())
}
