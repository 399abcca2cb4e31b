//! # Paper Upload Endpoint Tests
//!
//! The converter and metadata source are mocks; these tests check the immediate
//! acknowledgement and what the background pipeline leaves in the vault.

mod common;

use anyhow::Result;
use autolinker_pdf::PaperMetadata;
use autolinker_server::types::UploadResponse;
use autolinker_test_utils::pipeline::{MockConverter, MockMetadataSource};
use common::TestApp;
use reqwest::multipart::{Form, Part};
use std::time::{Duration, Instant};

fn pdf_form(file_name: &str) -> Form {
    Form::new().part(
        "file",
        Part::bytes(b"%PDF-1.4 mock".to_vec()).file_name(file_name.to_string()),
    )
}

#[tokio::test]
async fn test_upload_acknowledges_and_writes_note() -> Result<()> {
    let converter = MockConverter::new("Intro\n\n![](fig1.png)\n").with_image("fig1.png", &[1, 2]);
    let metadata = MockMetadataSource::new().with_record(
        "2301.12345",
        PaperMetadata {
            title: "Graph: Notes?".to_string(),
            authors: vec!["Ada Lovelace".to_string()],
            published: "2023-01-29".to_string(),
            url: "http://arxiv.org/abs/2301.12345v1".to_string(),
        },
    );
    let app = TestApp::spawn_with(converter, metadata).await?;

    let response = app
        .client
        .post(app.url("/upload-paper"))
        .multipart(pdf_form("2301.12345_paper.pdf"))
        .send()
        .await?;

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: UploadResponse = response.json().await?;
    assert_eq!(body, UploadResponse::processing("2301.12345_paper.pdf"));

    let notes = app.wait_for_notes(1, Duration::from_secs(5)).await;
    assert_eq!(notes, vec![app.vault_dir.path().join("Graph Notes.md")]);
    let note = std::fs::read_to_string(&notes[0])?;
    assert!(note.contains("![[fig1.png]]"));
    assert!(note.contains("Ada Lovelace"));
    assert_eq!(
        std::fs::read(app.vault_dir.path().join("assets/fig1.png"))?,
        vec![1, 2]
    );

    let converted = app.converter.calls();
    assert_eq!(converted.len(), 1);
    assert!(converted[0].ends_with("2301.12345_paper.pdf"));
    Ok(())
}

#[tokio::test]
async fn test_upload_returns_before_slow_pipeline_finishes() -> Result<()> {
    let converter = MockConverter::new("Slow body.").with_delay(Duration::from_millis(1500));
    let app = TestApp::spawn_with(converter, MockMetadataSource::new()).await?;

    let started = Instant::now();
    let response = app
        .client
        .post(app.url("/upload-paper"))
        .multipart(pdf_form("slow.pdf"))
        .send()
        .await?;
    let elapsed = started.elapsed();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(elapsed < Duration::from_millis(1500), "took {elapsed:?}");
    assert!(app.vault_notes().is_empty());

    let notes = app.wait_for_notes(1, Duration::from_secs(10)).await;
    assert_eq!(notes, vec![app.vault_dir.path().join("slow.pdf.md")]);
    Ok(())
}

#[tokio::test]
async fn test_repeated_uploads_are_versioned() -> Result<()> {
    let app = TestApp::spawn().await?;

    for _ in 0..2 {
        let response = app
            .client
            .post(app.url("/upload-paper"))
            .multipart(pdf_form("paper.pdf"))
            .send()
            .await?;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    let notes = app.wait_for_notes(2, Duration::from_secs(5)).await;
    assert_eq!(
        notes,
        vec![
            app.vault_dir.path().join("paper.pdf (2).md"),
            app.vault_dir.path().join("paper.pdf.md"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_pipeline_writes_nothing_and_cleans_up() -> Result<()> {
    let app = TestApp::spawn_with(MockConverter::failing(), MockMetadataSource::new()).await?;

    let response = app
        .client
        .post(app.url("/upload-paper"))
        .multipart(pdf_form("broken.pdf"))
        .send()
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let deadline = Instant::now() + Duration::from_secs(5);
    while app.staged_uploads() > 0 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert_eq!(app.staged_uploads(), 0);
    assert!(app.vault_notes().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_upload_without_file_part_is_bad_request() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .post(app.url("/upload-paper"))
        .multipart(Form::new().text("comment", "no file here"))
        .send()
        .await?;

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert!(body["error"].as_str().unwrap_or_default().contains("file"));
    assert!(app.converter.calls().is_empty());
    Ok(())
}
