//! # Common Test Utilities
//!
//! `TestApp` spawns the real router on a random port. The LLM is an
//! `httpmock::MockServer` behind a real `LocalAiProvider`; the PDF converter and
//! the metadata source are in-process mocks, and the vault and upload directories
//! are temporary.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use autolinker::{providers::ai::local::LocalAiProvider, KeywordExtractor};
use autolinker_pdf::PdfPipeline;
use autolinker_server::{config::AppConfig, router, state::AppState};
use autolinker_test_utils::pipeline::{MockConverter, MockMetadataSource};
use axum::serve;
use httpmock::MockServer;
use reqwest::Client;
use serde_json::json;
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub converter: MockConverter,
    pub metadata: MockMetadataSource,
    pub vault_dir: TempDir,
    pub upload_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server with a converter that returns a short fixed body.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(
            MockConverter::new("Converted body."),
            MockMetadataSource::new(),
        )
        .await
    }

    pub async fn spawn_with(converter: MockConverter, metadata: MockMetadataSource) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start_async().await;
        let vault_dir = tempdir()?;
        let upload_dir = tempdir()?;

        let config: AppConfig = serde_json::from_value(json!({
            "llm_base_url": mock_server.url("/v1"),
            "llm_model_name": "mock-chat-model",
            "vault_path_internal": vault_dir.path().to_string_lossy(),
            "upload_dir": upload_dir.path().to_string_lossy(),
        }))?;

        let ai_provider = LocalAiProvider::from_base_url(
            &config.llm_base_url,
            config.llm_api_key(),
            Some(config.llm_model_name.clone()),
        )?;
        let pipeline = PdfPipeline::new(Arc::new(converter.clone()), Arc::new(metadata.clone()));
        let app_state = AppState::new(
            config,
            KeywordExtractor::new(Box::new(ai_provider)),
            pipeline,
        );

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            converter,
            metadata,
            vault_dir,
            upload_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Markdown notes currently in the vault root, sorted by name.
    pub fn vault_notes(&self) -> Vec<PathBuf> {
        list_notes(self.vault_dir.path())
    }

    /// Polls the vault until it holds `count` notes or `timeout` elapses.
    pub async fn wait_for_notes(&self, count: usize, timeout: Duration) -> Vec<PathBuf> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notes = self.vault_notes();
            if notes.len() >= count || tokio::time::Instant::now() >= deadline {
                return notes;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    }

    /// Entries left in the upload directory (scratch dirs of unfinished jobs).
    pub fn staged_uploads(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn list_notes(dir: &Path) -> Vec<PathBuf> {
    let mut notes: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|x| x == "md"))
                .collect()
        })
        .unwrap_or_default();
    notes.sort();
    notes
}

/// An OpenAI-style chat completion whose first choice carries `content`.
pub fn chat_completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}
