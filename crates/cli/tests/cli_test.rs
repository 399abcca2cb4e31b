//! # CLI Command Tests
//!
//! Runs the `autolinker` binary against a mock chat-completions server.

use assert_cmd::prelude::*;
use autolinker_test_utils::helpers::generate_test_pdf;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a fixture note within a given directory.
fn create_fixture_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let file_path = dir.join(name);
    fs::write(&file_path, content).expect("Failed to write fixture file");
    file_path
}

async fn mock_llm(reply: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": reply } }]
        })))
        .mount(&server)
        .await;
    server
}

fn autolinker(llm: &MockServer) -> Command {
    let mut cmd = Command::cargo_bin("autolinker").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--llm-base-url")
        .arg(format!("{}/v1", llm.uri()));
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn test_extract_prints_keyword_json() {
    let llm = mock_llm(r#"{"keywords": ["Obsidian", "Obsidian", "backlinks"]}"#).await;
    let temp_dir = tempdir().unwrap();
    let note = create_fixture_file(temp_dir.path(), "note.md", "Obsidian backlinks are great.");

    let mut cmd = autolinker(&llm);
    cmd.arg("extract").arg(&note);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"Obsidian\""))
        .stdout(predicate::str::contains("\"backlinks\""))
        .stdout(predicate::str::contains("\"count\": 2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_link_rewrites_note_in_place() {
    let llm = mock_llm(r#"{"keywords": ["Rust"]}"#).await;
    let temp_dir = tempdir().unwrap();
    let note = create_fixture_file(temp_dir.path(), "note.md", "Rust is fun. #Rust");

    let mut cmd = autolinker(&llm);
    cmd.arg("link").arg(&note);

    cmd.assert().success();
    assert_eq!(fs::read_to_string(&note).unwrap(), "[[Rust]] is fun. #Rust");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_link_dry_run_leaves_note_untouched() {
    let llm = mock_llm(r#"{"keywords": ["Rust"]}"#).await;
    let temp_dir = tempdir().unwrap();
    let note = create_fixture_file(temp_dir.path(), "note.md", "Rust is fun.");

    let mut cmd = autolinker(&llm);
    cmd.arg("link").arg(&note).arg("--dry-run");

    cmd.assert()
        .success()
        .stdout(predicate::eq("[[Rust]] is fun."));
    assert_eq!(fs::read_to_string(&note).unwrap(), "Rust is fun.");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_link_skips_well_linked_note() {
    let llm = mock_llm(r#"{"keywords": ["Rust"]}"#).await;
    let temp_dir = tempdir().unwrap();
    let content = "Rust [[a]] [[b]]";
    let note = create_fixture_file(temp_dir.path(), "note.md", content);

    let mut cmd = autolinker(&llm);
    cmd.arg("link").arg(&note).arg("--ignore-threshold").arg("2");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Skipped"));
    assert_eq!(fs::read_to_string(&note).unwrap(), content);
    assert!(llm.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_convert_writes_note_into_vault() {
    let metadata = MockServer::start().await;
    let temp_dir = tempdir().unwrap();
    let vault = temp_dir.path().join("vault");
    let pdf = temp_dir.path().join("lecture-notes.pdf");
    fs::write(&pdf, generate_test_pdf(&["Lecture one."]).unwrap()).unwrap();

    let mut cmd = Command::cargo_bin("autolinker").unwrap();
    cmd.arg("convert")
        .arg(&pdf)
        .arg("--vault")
        .arg(&vault)
        .arg("--metadata-api-url")
        .arg(format!("{}/api/query", metadata.uri()));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("lecture-notes.pdf.md"));
    let note = fs::read_to_string(vault.join("lecture-notes.pdf.md")).unwrap();
    assert!(note.starts_with("---\n"));
    assert!(note.contains("# lecture-notes.pdf\n\nLecture one."));
    assert!(vault.join("assets").is_dir());
}

#[test]
fn test_convert_missing_file_fails() {
    let temp_dir = tempdir().unwrap();

    let mut cmd = Command::cargo_bin("autolinker").unwrap();
    cmd.arg("convert")
        .arg(temp_dir.path().join("absent.pdf"))
        .arg("--vault")
        .arg(temp_dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to convert"));
}
