//! Section editor for record bodies.
//!
//! A body is a run of markdown with `## Heading` lines splitting it into
//! named sections. The editor parses heading lines into typed spans and
//! rewrites exactly one span at a time; every byte outside the targeted
//! span is carried over unchanged.
//!
//! Heading lines inside fenced code blocks are ignored, so a pasted log
//! or diff containing `## Solution` cannot be mistaken for a section.

use std::ops::Range;

use thiserror::Error;

/// Heading level of the fixed record sections (`## `).
pub const SECTION_LEVEL: usize = 2;

/// The requested heading does not exist in the body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("section not found: {0}")]
pub struct SectionNotFound(pub String);

/// One heading line and the content it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// Heading text with the `#` markers and surrounding whitespace removed.
    pub heading: &'a str,
    pub level: usize,
    /// Byte range of the heading line, excluding its line terminator.
    pub heading_span: Range<usize>,
    /// Byte range from the end of the heading line up to the line break
    /// before the next heading of the same or a higher level.
    pub content: Range<usize>,
}

/// Parse every heading in `body`, in document order.
#[must_use]
pub fn sections(body: &str) -> Vec<Section<'_>> {
    let mut found: Vec<Section<'_>> = Vec::new();
    let mut in_fence = false;
    let mut offset = 0;

    for line in body.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let text = line.trim_end_matches('\n').trim_end_matches('\r');
        let trimmed = text.trim_start();
        if is_fence(trimmed) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        if let Some((level, heading)) = parse_heading(text) {
            found.push(Section {
                heading,
                level,
                heading_span: start..start + text.len(),
                content: start + text.len()..body.len(),
            });
        }
    }

    // Close each section at the next heading of the same or a higher level.
    for i in 0..found.len() {
        let level = found[i].level;
        let end = found[i + 1..]
            .iter()
            .find(|s| s.level <= level)
            .map(|next| next.heading_span.start.saturating_sub(1));
        if let Some(end) = end {
            found[i].content.end = end;
        }
    }

    found
}

/// Why `text` cannot be inserted into a section as-is, if it cannot.
///
/// Inserted text must not contain a heading at section level or above
/// outside a code fence, and must close every fence it opens.
#[must_use]
pub fn structural_conflict(text: &str) -> Option<&'static str> {
    let mut in_fence = false;
    for line in text.lines() {
        let trimmed = line.trim_start();
        if is_fence(trimmed) {
            in_fence = !in_fence;
        } else if !in_fence && parse_heading(line).is_some_and(|(level, _)| level <= SECTION_LEVEL) {
            return Some("cannot contain a section heading");
        }
    }
    in_fence.then_some("opens a code fence it does not close")
}

fn is_fence(trimmed: &str) -> bool {
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some((level, rest.trim()))
}

/// Byte span of the content owned by the `## heading` section.
///
/// # Errors
///
/// Returns [`SectionNotFound`] if no level-2 heading has that text.
pub fn locate(body: &str, heading: &str) -> Result<Range<usize>, SectionNotFound> {
    sections(body)
        .into_iter()
        .find(|s| s.level == SECTION_LEVEL && s.heading == heading)
        .map(|s| s.content)
        .ok_or_else(|| SectionNotFound(heading.to_string()))
}

/// Text of the `## heading` section, untrimmed.
///
/// # Errors
///
/// Returns [`SectionNotFound`] if the section is absent.
pub fn content<'a>(body: &'a str, heading: &str) -> Result<&'a str, SectionNotFound> {
    locate(body, heading).map(|span| &body[span])
}

/// Whether section content is still the template placeholder.
#[must_use]
pub fn is_placeholder(content: &str) -> bool {
    content.trim_start().starts_with('<')
}

/// Append `text` as a new paragraph at the end of the section.
///
/// Placeholder content is dropped and replaced by `text`.
///
/// # Errors
///
/// Returns [`SectionNotFound`] if the section is absent.
pub fn append(body: &str, heading: &str, text: &str) -> Result<String, SectionNotFound> {
    let span = locate(body, heading)?;
    let existing = body[span.clone()].trim_end();

    let mut new_content = String::new();
    if existing.trim().is_empty() || is_placeholder(existing) {
        new_content.push_str("\n\n");
    } else {
        new_content.push_str(existing);
        new_content.push_str("\n\n");
    }
    new_content.push_str(text.trim_end());
    new_content.push('\n');

    Ok(splice(body, span, &new_content))
}

/// Replace the section's content with `text`.
///
/// # Errors
///
/// Returns [`SectionNotFound`] if the section is absent.
pub fn replace(body: &str, heading: &str, text: &str) -> Result<String, SectionNotFound> {
    let span = locate(body, heading)?;
    Ok(splice(body, span, &format!("\n\n{text}\n")))
}

/// Count sub-headings inside the section whose text satisfies `is_entry`.
///
/// # Errors
///
/// Returns [`SectionNotFound`] if the section is absent.
pub fn count_entries(
    body: &str,
    heading: &str,
    is_entry: impl Fn(&str) -> bool,
) -> Result<usize, SectionNotFound> {
    let span = locate(body, heading)?;
    Ok(sections(body)
        .iter()
        .filter(|s| s.level > SECTION_LEVEL && span.contains(&s.heading_span.start))
        .filter(|s| is_entry(s.heading))
        .count())
}

/// Replace `span` of `body` with `replacement`.
#[must_use]
pub fn splice(body: &str, span: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(body.len() + replacement.len());
    out.push_str(&body[..span.start]);
    out.push_str(replacement);
    out.push_str(&body[span.end..]);
    out
}
