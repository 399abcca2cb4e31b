//! # Shared Constants
//!
//! This module provides a centralized location for constants that are shared across
//! multiple crates in the `autolinker` workspace.

/// The maximum number of characters of a note forwarded to the language model.
pub const TEXT_MAX_LENGTH: usize = 4000;

/// The number of keywords requested when a caller does not specify one.
pub const DEFAULT_MAX_KEYWORDS: usize = 5;

/// The sampling temperature used for keyword extraction.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// The default OpenAI-compatible endpoint (a local Ollama instance).
pub const DEFAULT_LLM_BASE_URL: &str = "http://localhost:11434/v1";

/// The default API key sent to the local endpoint.
pub const DEFAULT_LLM_API_KEY: &str = "ollama";

/// The default model name.
pub const DEFAULT_LLM_MODEL: &str = "llama3";
