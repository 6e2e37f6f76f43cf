//! CLI integration tests
//!
//! These tests run the built binary against the fixtures.

#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

fn eadexport_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_eadexport"))
}

fn fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path.to_string_lossy().into_owned()
}

fn id(n: u64) -> String {
    format!("aspace_{:032x}", n)
}

// ============================================================================
// container
// ============================================================================

#[test]
fn test_cli_container() {
    let output = Command::new(eadexport_bin())
        .args(["container", "--sequential-ids", &fixture("instance.json")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "container should succeed");
    assert!(stdout.contains(&format!("<container id=\"{}\" type=\"box\"", id(0))));
    assert!(stdout.contains(&format!("parent=\"{}\" type=\"folder\">5</container>", id(0))));
}

#[test]
fn test_cli_container_id_prefix() {
    let output = Command::new(eadexport_bin())
        .args([
            "container",
            "--sequential-ids",
            "--id-prefix",
            "pul_",
            &fixture("instance.json"),
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains(&format!("id=\"pul_{:032x}\"", 0)));
    assert!(!stdout.contains("aspace_"));
}

#[test]
fn test_cli_container_missing_top_container() {
    let output = Command::new(eadexport_bin())
        .args(["container", &fixture("instance_unresolved.json")])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success(), "unresolved container should fail");
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("missing required field"));
}

#[test]
fn test_cli_missing_file() {
    let output = Command::new(eadexport_bin())
        .args(["container", &fixture("does_not_exist.json")])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
}

// ============================================================================
// notes
// ============================================================================

#[test]
fn test_cli_notes() {
    let output = Command::new(eadexport_bin())
        .args(["notes", &fixture("record.json")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("<scopecontent id=\"aspace_sc01\">"));
    assert!(stdout.contains("<note label=\"personal-name\">Smith, Jane</note>"));
    assert!(!stdout.contains("accessrestrict"));
    assert!(!stdout.contains("abstract"));
}

#[test]
fn test_cli_notes_include_unpublished() {
    let output = Command::new(eadexport_bin())
        .args(["notes", "--include-unpublished", &fixture("record.json")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("<accessrestrict id=\"aspace_ar01\" audience=\"internal\">"));
}

#[test]
fn test_cli_notes_did() {
    let output = Command::new(eadexport_bin())
        .args(["notes", "--did", &fixture("record.json")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("<abstract id=\"aspace_ab01\">"));
    assert!(stdout.contains("<physdesc><dimensions id=\"aspace_dm01\">"));
    assert!(!stdout.contains("bioghist"));
}

#[test]
fn test_cli_notes_config_and_translations() {
    let dir = tempfile::tempdir().unwrap();

    let config_path = dir.path().join("options.json");
    std::fs::write(&config_path, r#"{ "id_prefix": "cfg_" }"#).unwrap();

    let translations_path = dir.path().join("labels.json");
    std::fs::write(
        &translations_path,
        r#"{ "_note_types": { "scopecontent": "Contents" } }"#,
    )
    .unwrap();

    let output = Command::new(eadexport_bin())
        .args([
            "notes",
            "--config",
            config_path.to_str().unwrap(),
            "--translations",
            translations_path.to_str().unwrap(),
            &fixture("record.json"),
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("<scopecontent id=\"cfg_sc01\"><head>Contents</head>"));
}

#[test]
fn test_cli_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("notes.xml");

    let output = Command::new(eadexport_bin())
        .args([
            "notes",
            "--did",
            "--output",
            output_path.to_str().unwrap(),
            &fixture("record.json"),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let written = std::fs::read_to_string(&output_path).unwrap();
    assert!(written.starts_with("<abstract"));
}

// ============================================================================
// linebreaks
// ============================================================================

#[test]
fn test_cli_linebreaks_file() {
    let output = Command::new(eadexport_bin())
        .args(["linebreaks", &fixture("paragraphs.txt")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert_eq!(stdout.trim(), "<p>First paragraph.</p><p>Second &amp; last.</p>");
}

#[test]
fn test_cli_linebreaks_stdin() {
    let mut child = Command::new(eadexport_bin())
        .args(["linebreaks", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to execute command");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"Single block")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "<p>Single block</p>");
}
