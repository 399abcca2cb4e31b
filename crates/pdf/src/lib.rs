//! # autolinker-pdf: Paper-to-Vault Pipeline
//!
//! Converts uploaded PDFs into markdown notes inside a notes vault. The
//! converter and the metadata source are traits so that the server, the CLI and
//! the tests can each inject their own.

pub mod converter;
pub mod error;
pub mod marker;
pub mod metadata;
pub mod pipeline;
pub mod vault;

pub use converter::{extract_text_from_pdf, ConvertedDocument, PdfConverter, TextLayerConverter};
pub use error::{MetadataError, PdfError, PipelineError};
pub use marker::MarkerConverter;
pub use metadata::{
    find_arxiv_id, resolve_metadata, ArxivSource, MetadataSource, PaperMetadata,
    DEFAULT_ARXIV_API_URL,
};
pub use pipeline::{PdfPipeline, PipelineJob};
pub use vault::{render_note, rewrite_image_links, safe_title, write_note_versioned};
