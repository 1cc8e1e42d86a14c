//! CLI tests for the journey commands.
//!
//! Spawns the waypoint binary against a file-backed log and verifies output
//! and exit codes across a whole journey.

use std::path::Path;
use std::process::{Command, Output};

use waypoint::exit_codes;
use waypoint::io::document_store::save_document;
use waypoint::test_support::numbered_document;

fn waypoint(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_waypoint"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("spawn waypoint")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn next_serves_each_piece_then_exits_with_complete_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let doc = numbered_document(2);
    save_document(&doc, &temp.path().join("doc.json"), false).expect("save");

    let started = waypoint(temp.path(), &["start", "doc.json", "--log", "journey.jsonl"]);
    assert_eq!(started.status.code(), Some(exit_codes::OK));
    assert!(stdout(&started).contains("Total waypoints: 2"));

    for piece in &doc.root_pieces {
        let served = waypoint(temp.path(), &["next", "--log", "journey.jsonl"]);
        assert_eq!(served.status.code(), Some(exit_codes::OK));
        assert_eq!(stdout(&served), piece.content);
    }

    let done = waypoint(temp.path(), &["next", "--log", "journey.jsonl"]);
    assert_eq!(done.status.code(), Some(exit_codes::COMPLETE));
    assert!(stdout(&done).is_empty());

    let progress = waypoint(temp.path(), &["progress", "--log", "journey.jsonl"]);
    assert_eq!(progress.status.code(), Some(exit_codes::OK));
    assert!(stdout(&progress).contains("Progress: 2/2 waypoints (100.0% complete)"));
    assert!(stdout(&progress).contains("State: complete"));
}

#[test]
fn next_without_start_is_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = waypoint(temp.path(), &["next", "--log", "journey.jsonl"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: no active waypoint journey"), "{stderr}");
}

#[test]
fn compile_then_validate_reports_ok() {
    let temp = tempfile::tempdir().expect("tempdir");
    waypoint::test_support::write_tree(
        &temp.path().join("course"),
        &[("00_Intro.md", "# Intro\n"), ("01_Next.md", "# Next\n")],
    )
    .expect("write");

    let compiled = waypoint(temp.path(), &["compile", "course", "-o", "course.json"]);
    assert_eq!(compiled.status.code(), Some(exit_codes::OK));
    assert!(stdout(&compiled).contains("entry point 00_Intro.md"));

    let validated = waypoint(temp.path(), &["validate", "course.json"]);
    assert_eq!(validated.status.code(), Some(exit_codes::OK));
}

#[test]
fn validate_with_issues_exits_with_issues_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut doc = numbered_document(2);
    doc.root_pieces[1].identifier = doc.root_pieces[0].identifier.clone();
    save_document(&doc, &temp.path().join("doc.json"), false).expect("save");

    let output = waypoint(temp.path(), &["validate", "doc.json"]);
    assert_eq!(output.status.code(), Some(exit_codes::ISSUES));
    assert!(stdout(&output).contains("duplicate identifier '00_step.md'"));
}

#[test]
fn missing_explicit_config_is_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = waypoint(
        temp.path(),
        &["progress", "--log", "journey.jsonl", "--config", "absent.toml"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("config file not found"));
}
