//! # PDF Pipeline
//!
//! Converts one PDF into a vault note:
//!
//! 1. ensure `<vault>/assets` exists,
//! 2. run the injected converter,
//! 3. save each image to `assets/<name>` and rewrite its links to `![[name]]`,
//! 4. resolve metadata from the file name and the first 1000 characters,
//! 5. derive a file-system-safe title,
//! 6. write `<vault>/<title>.md` with front-matter (versioned on collision).

use crate::{
    converter::PdfConverter,
    error::PipelineError,
    metadata::{resolve_metadata, MetadataSource},
    vault::{render_note, rewrite_image_links, safe_title, write_note_versioned, ASSETS_DIR},
};
use autolinker::keywords::truncate_chars;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Number of body characters searched for a paper identifier.
pub const METADATA_PREVIEW_CHARS: usize = 1000;

/// One unit of pipeline work.
#[derive(Debug, Clone)]
pub struct PipelineJob {
    pub pdf_path: PathBuf,
    /// The original upload name, used for metadata lookup and as the fallback title.
    pub source_name: String,
    pub vault_path: PathBuf,
}

impl PipelineJob {
    /// Builds a job whose source name is the PDF's own file name.
    pub fn new(pdf_path: impl Into<PathBuf>, vault_path: impl Into<PathBuf>) -> Self {
        let pdf_path = pdf_path.into();
        let source_name = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            pdf_path,
            source_name,
            vault_path: vault_path.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PdfPipeline {
    converter: Arc<dyn PdfConverter>,
    metadata: Arc<dyn MetadataSource>,
}

impl PdfPipeline {
    pub fn new(converter: Arc<dyn PdfConverter>, metadata: Arc<dyn MetadataSource>) -> Self {
        Self {
            converter,
            metadata,
        }
    }

    /// Runs the pipeline and returns the path of the written note.
    #[instrument(skip(self), fields(pdf = %job.source_name))]
    pub async fn run(&self, job: &PipelineJob) -> Result<PathBuf, PipelineError> {
        let assets_dir = job.vault_path.join(ASSETS_DIR);
        tokio::fs::create_dir_all(&assets_dir)
            .await
            .map_err(|e| PipelineError::io(&assets_dir, e))?;

        let document = self.converter.convert(&job.pdf_path).await?;
        info!(
            chars = document.markdown.len(),
            images = document.images.len(),
            "Converted PDF"
        );

        let mut body = document.markdown;
        for (name, bytes) in &document.images {
            if !is_plain_file_name(name) {
                warn!("Skipping image with unsafe name '{name}'.");
                continue;
            }
            let image_path = assets_dir.join(name);
            tokio::fs::write(&image_path, bytes)
                .await
                .map_err(|e| PipelineError::io(&image_path, e))?;
            body = rewrite_image_links(&body, name);
        }

        let preview = truncate_chars(&body, METADATA_PREVIEW_CHARS);
        let meta = resolve_metadata(self.metadata.as_ref(), &preview, &job.source_name).await;

        let title = safe_title(&meta.title);
        let note = render_note(&meta, &body)?;
        let note_path = write_note_versioned(&job.vault_path, &title, &note).await?;
        info!("Saved note '{}'.", note_path.display());
        Ok(note_path)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    let path = Path::new(name);
    !name.is_empty()
        && path.file_name().map(|f| f == path.as_os_str()).unwrap_or(false)
        && name != "."
        && name != ".."
}
