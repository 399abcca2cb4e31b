//! # Command Handlers

use crate::{ConvertArgs, ConverterArg, ExtractArgs, LinkArgs, LlmArgs};
use anyhow::{Context, Result};
use autolinker::{
    apply_links, count_links, providers::ai::local::LocalAiProvider, ExtractionRequest,
    KeywordExtractor, KeywordResult,
};
use autolinker_pdf::{
    ArxivSource, MarkerConverter, PdfConverter, PdfPipeline, PipelineJob, TextLayerConverter,
};
use std::sync::Arc;
use tracing::info;

/// Notes with at least this many links are considered already linked.
pub const DEFAULT_IGNORE_THRESHOLD: usize = 10;

/// What `link` decided to do with a note.
#[derive(Debug, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The note already has `existing` links, at or above the threshold.
    Skipped { existing: usize },
    /// The note was linked with these keywords.
    Linked { text: String, keywords: Vec<String> },
}

fn build_extractor(llm: &LlmArgs) -> Result<KeywordExtractor> {
    let api_key = Some(llm.llm_api_key.trim().to_string()).filter(|k| !k.is_empty());
    let provider =
        LocalAiProvider::from_base_url(&llm.llm_base_url, api_key, Some(llm.llm_model_name.clone()))?;
    Ok(KeywordExtractor::new(Box::new(provider)))
}

/// Extracts keywords for `request`, treating blank text as "no keywords".
async fn extract_keywords(
    extractor: &KeywordExtractor,
    request: &ExtractionRequest,
) -> Result<KeywordResult> {
    match request.prepared_text() {
        Some(text) => Ok(extractor.extract(&text, request.max_keywords).await?),
        None => Ok(KeywordResult::empty()),
    }
}

pub async fn handle_extract(llm: &LlmArgs, args: &ExtractArgs) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read '{}'", args.file.display()))?;
    let extractor = build_extractor(llm)?;

    let result = extract_keywords(&extractor, &ExtractionRequest::new(text, args.max_keywords)).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Decides whether and how to link `text`.
pub async fn link_note(
    extractor: &KeywordExtractor,
    text: &str,
    max_keywords: usize,
    ignore_threshold: usize,
) -> Result<LinkOutcome> {
    let existing = count_links(text);
    if existing >= ignore_threshold {
        return Ok(LinkOutcome::Skipped { existing });
    }

    let result = extract_keywords(extractor, &ExtractionRequest::new(text, max_keywords)).await?;
    Ok(LinkOutcome::Linked {
        text: apply_links(text, &result.keywords),
        keywords: result.keywords,
    })
}

pub async fn handle_link(llm: &LlmArgs, args: &LinkArgs) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.note)
        .await
        .with_context(|| format!("Failed to read '{}'", args.note.display()))?;
    let extractor = build_extractor(llm)?;

    match link_note(&extractor, &text, args.max_keywords, args.ignore_threshold).await? {
        LinkOutcome::Skipped { existing } => {
            eprintln!(
                "Skipped '{}': already has {existing} links (threshold {}).",
                args.note.display(),
                args.ignore_threshold
            );
        }
        LinkOutcome::Linked { text: linked, keywords } => {
            if args.dry_run {
                print!("{linked}");
            } else if linked != text {
                tokio::fs::write(&args.note, &linked)
                    .await
                    .with_context(|| format!("Failed to write '{}'", args.note.display()))?;
            }
            info!(keywords = ?keywords, "Linked note.");
            eprintln!(
                "Linked {} keyword(s) in '{}': {}",
                keywords.len(),
                args.note.display(),
                keywords.join(", ")
            );
        }
    }
    Ok(())
}

pub async fn handle_convert(args: &ConvertArgs) -> Result<()> {
    let converter: Arc<dyn PdfConverter> = match args.converter {
        ConverterArg::Text => Arc::new(TextLayerConverter::new()),
        ConverterArg::Marker => Arc::new(MarkerConverter::new(&args.marker_command)),
    };
    let metadata = Arc::new(ArxivSource::new(&args.metadata_api_url)?);
    let pipeline = PdfPipeline::new(converter, metadata);

    let note = pipeline
        .run(&PipelineJob::new(&args.pdf, &args.vault))
        .await
        .with_context(|| format!("Failed to convert '{}'", args.pdf.display()))?;
    println!("{}", note.display());
    Ok(())
}
