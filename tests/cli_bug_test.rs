//! Integration tests for the record commands
//! (`bt open/get/update/close/attempt/link`).

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

// === open ===

#[test]
fn test_open_creates_record() {
    let env = TestEnv::new();

    env.bt()
        .args(["open", "Login crashes on empty password", "--severity", "high"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Created BUG-0001: BUG-0001-login-crashes-on-empty-password.md",
        ))
        .stdout(predicate::str::contains("Path: "));

    let text = env.record("BUG-0001");
    assert!(text.starts_with("---\nid: BUG-0001\ntitle: Login crashes on empty password\nstatus: open\nseverity: high\n"));
    for heading in [
        "## Description",
        "## Expected Behavior",
        "## Reproduction Steps",
        "## Environment",
        "## Investigation Notes",
        "## Probable Cause",
        "## Attempted Fixes",
        "## Solution",
        "## Related",
    ] {
        assert!(text.contains(heading), "missing {heading}");
    }
}

#[test]
fn test_open_joins_unquoted_words_and_title_flag() {
    let env = TestEnv::new();

    env.bt()
        .args(["open", "Export", "hangs", "forever"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BUG-0001-export-hangs-forever.md"));

    env.bt()
        .args(["open", "--title", "Parser drops tokens"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BUG-0002-parser-drops-tokens.md"));
}

#[test]
fn test_open_description_fills_section() {
    let env = TestEnv::new();
    env.bt()
        .args(["open", "Crash", "-d", "Saving twice crashes the app."])
        .assert()
        .success();
    assert!(env
        .record("BUG-0001")
        .contains("## Description\n\nSaving twice crashes the app.\n"));
}

#[test]
fn test_open_rejects_blank_title() {
    let env = TestEnv::new();
    env.bt()
        .args(["open", "   "])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Bug title cannot be empty"));
    assert!(!env.bugs_dir().exists());
}

#[test]
fn test_open_rejects_bad_severity_with_suggestion() {
    let env = TestEnv::new();
    env.bt()
        .args(["open", "Crash", "--severity", "hgh"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Did you mean 'high'?"));
}

#[test]
fn test_open_warns_on_possible_duplicate() {
    let env = TestEnv::new();
    env.open("Login crashes on empty password");
    env.bt()
        .args(["open", "Login crashes on submit"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Possible duplicate - BUG-0001-login-crashes-on-empty-password.md",
        ))
        .stdout(predicate::str::contains("Created BUG-0002"));
}

#[test]
fn test_open_json_output() {
    let env = TestEnv::new();
    let output = env.bt().args(["--json", "open", "Crash"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["id"], "BUG-0001");
    assert_eq!(value["file"], "BUG-0001-crash.md");
    assert_eq!(value["possible_duplicates"], serde_json::json!([]));
}

#[test]
fn test_open_rejects_multi_line_title() {
    let env = TestEnv::new();
    env.bt()
        .args(["open", "Crash\nstatus: closed"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("title must be a single line"));
    assert!(!env.bugs_dir().exists());
}

#[test]
fn test_open_title_without_word_characters() {
    let env = TestEnv::new();
    env.bt()
        .args(["open", "!!!"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created BUG-0001: BUG-0001-.md"));
    assert!(env.bugs_dir().join("BUG-0001-.md").exists());
    env.bt()
        .args(["get", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: !!!"));
}

// === get ===

#[test]
fn test_get_accepts_id_forms() {
    let env = TestEnv::new();
    env.bt().args(["open", "Crash", "--severity", "low"]).assert().success();

    for id in ["1", "BUG-1", "bug-0001", "BUG-0001"] {
        env.bt()
            .args(["get", id])
            .assert()
            .success()
            .stdout(predicate::str::contains("ID: BUG-0001"))
            .stdout(predicate::str::contains("Status: open"))
            .stdout(predicate::str::contains("Severity: low"));
    }
}

#[test]
fn test_get_json_includes_header() {
    let env = TestEnv::new();
    env.open("Crash");
    let output = env.bt().args(["get", "1", "--format", "json"]).output().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["id"], "BUG-0001");
    assert_eq!(value["header"]["status"], "open");
    assert_eq!(value["header"]["tags"], serde_json::json!([]));
}

#[test]
fn test_get_missing_and_invalid() {
    let env = TestEnv::new();
    env.bt()
        .args(["get", "5678"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Bug BUG-5678 not found"));
    env.bt()
        .args(["get", "abc"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Invalid bug ID: abc"));
}

#[test]
fn test_error_json_on_stderr() {
    let env = TestEnv::new();
    let output = env.bt().args(["--json", "get", "7"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let value: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(value["error"]["code"], "BUG_NOT_FOUND");
    assert_eq!(value["error"]["retryable"], false);
}

// === update ===

#[test]
fn test_update_tag_is_idempotent() {
    let env = TestEnv::new();
    let id = env.open("Crash");

    env.bt()
        .args(["update", &id, "--add-tag", "auth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated BUG-0001"));
    env.bt()
        .args(["update", &id, "--add-tag", "auth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes made"));

    assert!(env.record(&id).contains("tags: [auth]\n"));
}

#[test]
fn test_update_note_and_file() {
    let env = TestEnv::new();
    let id = env.open("Crash");
    env.bt()
        .args([
            "update",
            &id,
            "--add-note",
            "session is null on retry",
            "--add-file",
            "src/auth.rs",
        ])
        .assert()
        .success();

    let text = env.record(&id);
    assert!(text.contains("related-files: [src/auth.rs]\n"));
    assert!(text.contains("** session is null on retry\n"));
    assert!(!text.contains("<Findings from debugging"));
}

#[test]
fn test_update_invalid_status_writes_nothing() {
    let env = TestEnv::new();
    let id = env.open("Crash");
    let before = env.record(&id);

    env.bt()
        .args(["update", &id, "--status", "done", "--add-tag", "x"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Invalid status: done"));
    env.bt()
        .args(["update", &id, "--status", "closed"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("bt close"));

    assert_eq!(env.record(&id), before);
}

#[test]
fn test_update_status_in_progress() {
    let env = TestEnv::new();
    let id = env.open("Crash");
    env.bt()
        .args(["update", "--id", &id, "--status", "in-progress"])
        .assert()
        .success();
    assert!(env.record(&id).contains("status: in-progress\n"));
}

#[test]
fn test_update_blank_tag_changes_nothing() {
    let env = TestEnv::new();
    let id = env.open("Crash");
    let before = env.record(&id);

    env.bt()
        .args(["update", &id, "--add-tag", " ", "--add-file", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes made"));
    assert_eq!(env.record(&id), before);
}

#[test]
fn test_update_rejects_list_syntax_in_tag() {
    let env = TestEnv::new();
    let id = env.open("Crash");
    let before = env.record(&id);

    for tag in ["ui,db", "[ui", "ui]"] {
        env.bt()
            .args(["update", &id, "--add-tag", tag])
            .assert()
            .code(4)
            .stderr(predicate::str::contains("tag"));
    }
    assert_eq!(env.record(&id), before);
}

#[test]
fn test_note_cannot_add_section_heading() {
    let env = TestEnv::new();
    let id = env.open("Crash");
    let before = env.record(&id);

    env.bt()
        .args(["update", &id, "--add-note", "found it\n## Solution\nforged"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("note cannot contain a section heading"));
    env.bt()
        .args(["close", &id, "fixed", "--solution", "done\n## Related\n- BUG-0009"])
        .assert()
        .code(4);
    assert_eq!(env.record(&id), before);
}

// === attempt / close ===

#[test]
fn test_end_to_end_lifecycle() {
    let env = TestEnv::new();
    env.bt()
        .args(["open", "Login crashes on empty password", "--severity=high"])
        .assert()
        .success();

    env.bt()
        .args(["attempt", "BUG-0001", "added null check", "did not fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded attempt 1 on BUG-0001"));
    let text = env.record("BUG-0001");
    assert!(text.contains("status: in-progress\n"));
    assert!(text.contains("### Attempt 1: added null check\n"));
    assert!(text.contains("- **Reverted:** no"));

    env.bt()
        .args(["attempt", "1", "rewrote validator", "fixed", "--reverted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded attempt 2 on BUG-0001"));

    env.bt()
        .args(["close", "1", "fixed", "--solution", "Added guard clause"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Closed BUG-0001 as fixed"));

    let text = env.record("BUG-0001");
    assert!(text.contains("status: closed\n"));
    assert!(text.contains("resolution: fixed\n"));
    assert!(text.contains("\nclosed: "));
    assert!(text.contains("## Solution\n\nAdded guard clause\n\n## Related"));
}

#[test]
fn test_attempt_requires_text() {
    let env = TestEnv::new();
    let id = env.open("Crash");
    env.bt()
        .args(["attempt", &id, "", "x"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Attempt description cannot be empty"));
    env.bt()
        .args(["attempt", &id, "x", " "])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Attempt result cannot be empty"));
}

#[test]
fn test_attempt_missing_section_is_structural_error() {
    let env = TestEnv::new();
    let id = env.open("Crash");
    let path = env.bugs_dir().join("BUG-0001-crash.md");
    let damaged = fs::read_to_string(&path)
        .unwrap()
        .replace("## Attempted Fixes", "## Fixes");
    fs::write(&path, &damaged).unwrap();

    env.bt()
        .args(["attempt", &id, "x", "y"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Could not find Attempted Fixes section"));
    assert_eq!(fs::read_to_string(&path).unwrap(), damaged);
}

#[test]
fn test_close_invalid_resolution_leaves_record() {
    let env = TestEnv::new();
    let id = env.open("Crash");
    let before = env.record(&id);
    env.bt()
        .args(["close", &id, "solved"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Invalid resolution: solved"));
    assert_eq!(env.record(&id), before);
}

// === link ===

#[test]
fn test_link_mirrors_both_records() {
    let env = TestEnv::new();
    let a = env.open("First");
    let b = env.open("Second");

    env.bt()
        .args(["link", "1", "BUG-0002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Linked BUG-0001 <-> BUG-0002"));

    assert!(env.record(&a).contains("- Related bugs: BUG-0002\n"));
    assert!(env.record(&b).contains("- Related bugs: BUG-0001\n"));

    // Linking again changes nothing.
    let before = env.record(&a);
    env.bt().args(["link", &b, &a]).assert().success();
    assert_eq!(env.record(&a), before);
}

#[test]
fn test_link_self_and_unknown() {
    let env = TestEnv::new();
    let a = env.open("First");
    let before = env.record(&a);

    env.bt()
        .args(["link", "1", "BUG-0001"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Cannot link a bug to itself"));
    env.bt().args(["link", &a, "5678"]).assert().code(3);

    assert_eq!(env.record(&a), before);
}
