//! # Marker Converter
//!
//! Runs the external `marker_single` tool, which lays out its output as
//! `<output_dir>/<stem>/<stem>.md` next to the extracted images. The scratch
//! directory is removed when the conversion finishes.

use crate::{
    converter::{ConvertedDocument, PdfConverter},
    error::PdfError,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

/// The default executable name.
pub const DEFAULT_MARKER_COMMAND: &str = "marker_single";

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// A converter that shells out to the `marker` PDF-to-markdown tool.
#[derive(Debug, Clone)]
pub struct MarkerConverter {
    command: String,
    extra_args: Vec<String>,
}

impl Default for MarkerConverter {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_COMMAND)
    }
}

impl MarkerConverter {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            extra_args: Vec::new(),
        }
    }

    /// Appends arguments passed to every invocation (e.g. `--use_llm`).
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }
}

#[async_trait]
impl PdfConverter for MarkerConverter {
    async fn convert(&self, pdf_path: &Path) -> Result<ConvertedDocument, PdfError> {
        let scratch = tempfile::tempdir().map_err(|source| PdfError::Io {
            path: std::env::temp_dir(),
            source,
        })?;

        info!(
            "Running '{}' on '{}'.",
            self.command,
            pdf_path.display()
        );
        let output = Command::new(&self.command)
            .arg(pdf_path)
            .arg("--output_dir")
            .arg(scratch.path())
            .arg("--output_format")
            .arg("markdown")
            .args(&self.extra_args)
            .output()
            .await
            .map_err(|e| PdfError::Command {
                command: self.command.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr
                .lines()
                .rev()
                .take(5)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(PdfError::Command {
                command: self.command.clone(),
                detail: format!("exited with {}: {}", output.status, tail),
            });
        }

        collect_output(scratch.path()).await
    }
}

/// Reads the first markdown file and every image file below `dir`.
pub async fn collect_output(dir: &Path) -> Result<ConvertedDocument, PdfError> {
    let mut markdown: Option<String> = None;
    let mut images = BTreeMap::new();
    let mut pending: Vec<PathBuf> = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current)
            .await
            .map_err(|source| PdfError::Io {
                path: current.clone(),
                source,
            })?;
        while let Some(entry) = entries.next_entry().await.map_err(|source| PdfError::Io {
            path: current.clone(),
            source,
        })? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(|source| PdfError::Io {
                path: path.clone(),
                source,
            })?;
            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            let read = |path: PathBuf| async move {
                tokio::fs::read(&path)
                    .await
                    .map_err(|source| PdfError::Io { path, source })
            };

            if extension == "md" {
                if markdown.is_some() {
                    warn!("Ignoring extra markdown output '{}'.", path.display());
                    continue;
                }
                let bytes = read(path).await?;
                markdown = Some(String::from_utf8_lossy(&bytes).into_owned());
            } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()).map(String::from)
                {
                    let bytes = read(path).await?;
                    images.insert(name, bytes);
                }
            }
        }
    }

    let markdown = markdown.ok_or_else(|| PdfError::MissingOutput(dir.to_path_buf()))?;
    Ok(ConvertedDocument { markdown, images })
}
