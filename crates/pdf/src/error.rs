//! Error types for PDF conversion, metadata lookup and the vault pipeline.
//!
//! Metadata errors never escape the pipeline (lookup falls back to filename-derived
//! defaults). Conversion and I/O errors abort the pipeline run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a `PdfConverter`.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to read PDF file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse PDF content: {0}")]
    PdfParse(String),
    #[error("Converter command '{command}' failed: {detail}")]
    Command { command: String, detail: String },
    #[error("Converter produced no markdown output in '{0}'")]
    MissingOutput(PathBuf),
    #[error("Conversion task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Errors raised by a `MetadataSource`.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Metadata request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Metadata service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Failed to parse metadata feed: {0}")]
    Feed(#[from] atom_syndication::Error),
}

/// Errors that abort a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("PDF conversion failed: {0}")]
    Conversion(#[from] PdfError),
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize front-matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
    #[error("No free note name for '{0}'")]
    NameExhausted(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
