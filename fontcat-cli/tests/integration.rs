use std::process::Command;

use serde_json::Value;
use tempfile::tempdir;

fn fontcat(state_dir: &std::path::Path, font_dir: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_fontcat"))
        .arg("--state-dir")
        .arg(state_dir)
        .arg("--font-dir")
        .arg(font_dir)
        .args(args)
        .output()
        .expect("run fontcat")
}

#[test]
fn status_works_on_a_fresh_state_dir() {
    let state = tempdir().expect("state dir");
    let fonts = tempdir().expect("font dir");

    let output = fontcat(state.path(), fonts.path(), &["status", "--json"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let summary: Value = serde_json::from_slice(&output.stdout).expect("json summary");
    assert_eq!(summary["families"], 0);
    assert_eq!(summary["collections"], 0);
    assert_eq!(summary["categories"].as_array().expect("categories").len(), 4);
}

#[test]
fn collections_persist_between_invocations() {
    let state = tempdir().expect("state dir");
    let fonts = tempdir().expect("font dir");

    let output = fontcat(
        state.path(),
        fonts.path(),
        &["collection", "create", "Favorites", "--comment", "picked by hand"],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output = fontcat(state.path(), fonts.path(), &["collection", "list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Favorites"), "stdout: {stdout}");
}

#[test]
fn sync_on_an_empty_directory_indexes_nothing() {
    let state = tempdir().expect("state dir");
    let fonts = tempdir().expect("font dir");

    let output = fontcat(state.path(), fonts.path(), &["sync"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("indexed 0 font files"), "stdout: {stdout}");
}

#[test]
fn unknown_collection_fails_loudly() {
    let state = tempdir().expect("state dir");
    let fonts = tempdir().expect("font dir");

    let output = fontcat(state.path(), fonts.path(), &["collection", "remove", "Nope"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Nope"), "stderr: {stderr}");
}
