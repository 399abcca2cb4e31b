//! # Note Auto-Linking Core
//!
//! This crate provides the language-model side of the auto-linker: a pluggable
//! AI provider, the keyword extraction prompts, sanitisation of raw model output,
//! the `KeywordExtractor` that ties them together, and the note linker that turns
//! extracted keywords into `[[wiki-links]]`.

pub mod constants;
pub mod errors;
pub mod keywords;
pub mod linker;
pub mod prompts;
pub mod providers;
pub mod sanitize;

pub use errors::{ExtractError, PromptError};
pub use keywords::{ExtractionRequest, KeywordExtractor, KeywordResult};
pub use linker::{apply_links, count_links};
pub use sanitize::clean_json_string;
