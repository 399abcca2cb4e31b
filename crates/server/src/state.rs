//! # Application State
//!
//! The LLM client, the PDF converter and the metadata source are constructed once
//! here and shared by every request through `AppState`.

use crate::config::{AppConfig, ConverterKind};
use autolinker::{
    providers::ai::{local::LocalAiProvider, AiProvider},
    KeywordExtractor,
};
use autolinker_pdf::{
    ArxivSource, MarkerConverter, MetadataSource, PdfConverter, PdfPipeline, TextLayerConverter,
};
use std::{path::PathBuf, sync::Arc};
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub extractor: Arc<KeywordExtractor>,
    pub pipeline: Arc<PdfPipeline>,
    /// Where finished notes are written.
    pub vault_path: PathBuf,
    /// Parent directory for per-upload scratch directories.
    pub upload_dir: PathBuf,
}

impl AppState {
    /// Assembles a state from already-built components.
    pub fn new(config: AppConfig, extractor: KeywordExtractor, pipeline: PdfPipeline) -> Self {
        let vault_path = config.vault_root();
        let upload_dir = PathBuf::from(&config.upload_dir);
        Self {
            config: Arc::new(config),
            extractor: Arc::new(extractor),
            pipeline: Arc::new(pipeline),
            vault_path,
            upload_dir,
        }
    }
}

/// Builds the converter selected by `pdf_converter`.
pub fn build_converter(config: &AppConfig) -> Arc<dyn PdfConverter> {
    match config.pdf_converter {
        ConverterKind::Text => Arc::new(TextLayerConverter::new()),
        ConverterKind::Marker => Arc::new(MarkerConverter::new(&config.marker_command)),
    }
}

/// Builds the shared application state from the configuration.
pub fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let ai_provider: Box<dyn AiProvider> = Box::new(LocalAiProvider::from_base_url(
        &config.llm_base_url,
        config.llm_api_key(),
        Some(config.llm_model_name.clone()),
    )?);
    info!(
        base_url = %config.llm_base_url,
        model = %config.llm_model_name,
        "Initialized LLM client."
    );

    let converter = build_converter(&config);
    let metadata: Arc<dyn MetadataSource> = Arc::new(ArxivSource::new(&config.metadata_api_url)?);
    info!(
        converter = ?config.pdf_converter,
        metadata_api = %config.metadata_api_url,
        "Initialized PDF pipeline."
    );

    let state = AppState::new(
        config,
        KeywordExtractor::new(ai_provider),
        PdfPipeline::new(converter, metadata),
    );
    info!(vault = %state.vault_path.display(), "Vault root resolved.");
    Ok(state)
}
