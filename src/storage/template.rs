//! Template for newly opened records.

use crate::model::{BugId, SectionName, Severity, Status};
use crate::storage::frontmatter::{FieldValue, Frontmatter};

/// Line inside Related that lists linked bug ids.
pub const RELATED_BUGS_MARKER: &str = "- Related bugs:";

/// Description placeholder, used when `open` is given no description.
pub const DESCRIPTION_PLACEHOLDER: &str = "<Clear description of the bug behavior>";

/// Header of a fresh record.
#[must_use]
pub fn header(id: BugId, title: &str, severity: Severity, today: &str) -> Frontmatter {
    let mut fm = Frontmatter::new();
    fm.set_str("id", id.to_string());
    fm.set_str("title", title);
    fm.set_str("status", Status::Open.as_str());
    fm.set_str("severity", severity.as_str());
    fm.set_str("created", today);
    fm.set_str("updated", today);
    fm.set("related-files", FieldValue::List(Vec::new()));
    fm.set("tags", FieldValue::List(Vec::new()));
    fm
}

/// Placeholder content of each section.
const fn placeholder(section: SectionName) -> &'static str {
    match section {
        SectionName::Description => DESCRIPTION_PLACEHOLDER,
        SectionName::ExpectedBehavior => "<What should happen instead>",
        SectionName::ReproductionSteps => "1. <Step 1>\n2. <Step 2>\n3. <Step 3>",
        SectionName::Environment => "- OS: <operating system>\n- Version: <app/library version>",
        SectionName::InvestigationNotes => {
            "<Findings from debugging, log analysis, code review>"
        }
        SectionName::ProbableCause => {
            "<Best guess at what's causing the issue based on investigation>"
        }
        SectionName::AttemptedFixes => "<Record each fix attempt here>",
        SectionName::Solution => {
            "<Final fix that resolved the issue - only filled when closed as fixed>"
        }
        SectionName::Related => "- Related bugs:\n- Related PRs/commits:",
    }
}

/// Body of a fresh record, starting with the newline that ends the header.
#[must_use]
pub fn body(description: &str) -> String {
    let mut out = String::from("\n");
    for section in SectionName::ALL {
        let text = match section {
            SectionName::Description if !description.trim().is_empty() => description.trim(),
            _ => placeholder(section),
        };
        out.push_str("\n## ");
        out.push_str(section.heading());
        out.push_str("\n\n");
        out.push_str(text);
        out.push('\n');
    }
    out
}

/// Complete file content for a new record.
#[must_use]
pub fn render(id: BugId, title: &str, severity: Severity, description: &str, today: &str) -> String {
    format!("{}{}", header(id, title, severity, today).encode(), body(description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sections;

    #[test]
    fn test_render_layout() {
        let text = render(BugId::new(3), "Crash on save", Severity::High, "", "2025-02-01");
        assert!(text.starts_with(
            "---\nid: BUG-0003\ntitle: Crash on save\nstatus: open\nseverity: high\ncreated: 2025-02-01\nupdated: 2025-02-01\nrelated-files: []\ntags: []\n---\n\n## Description\n\n<Clear description of the bug behavior>\n\n## Expected Behavior\n"
        ));
        assert!(text.ends_with("## Related\n\n- Related bugs:\n- Related PRs/commits:\n"));
    }

    #[test]
    fn test_every_section_present_in_order() {
        let text = body("Saving a file twice crashes.");
        let names: Vec<_> = sections::sections(&text).iter().map(|s| s.heading).collect();
        let expected: Vec<_> = SectionName::ALL.iter().map(SectionName::heading).collect();
        assert_eq!(names, expected);
        assert_eq!(
            sections::content(&text, "Description").unwrap().trim(),
            "Saving a file twice crashes."
        );
    }
}
