//! # Keyword Extraction
//!
//! This module turns a note into a short list of backlink keywords by asking the
//! configured `AiProvider` and parsing its reply.
//!
//! The flow is: build prompts, call the model, log the raw reply, sanitise it,
//! parse `{"keywords": [...]}`, drop blanks, deduplicate (keeping first-occurrence
//! order) and truncate to the requested count.
//!
//! `KeywordExtractor::extract` reports failures as `ExtractError` so callers can tell
//! "the model found nothing" apart from "the call failed". The HTTP layer uses
//! `extract_or_empty`, which keeps the always-succeed contract by logging the error
//! and returning an empty result.

use crate::{
    constants::{DEFAULT_MAX_KEYWORDS, TEXT_MAX_LENGTH},
    errors::ExtractError,
    prompts::keywords::{keyword_system_prompt, keyword_user_prompt},
    providers::ai::AiProvider,
    sanitize::clean_json_string,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

// --- API Payloads ---

/// A request to extract keywords from a body of text.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionRequest {
    pub text: String,
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,
}

fn default_max_keywords() -> usize {
    DEFAULT_MAX_KEYWORDS
}

impl ExtractionRequest {
    pub fn new(text: impl Into<String>, max_keywords: usize) -> Self {
        Self {
            text: text.into(),
            max_keywords,
        }
    }

    /// Returns the text that should be forwarded to the model, or `None` when the
    /// request is blank and no model call should be made.
    pub fn prepared_text(&self) -> Option<String> {
        if self.text.trim().is_empty() {
            return None;
        }
        Some(truncate_chars(&self.text, TEXT_MAX_LENGTH))
    }
}

/// Returns at most the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// The extracted keywords. `count` always equals `keywords.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeywordResult {
    pub keywords: Vec<String>,
    pub count: usize,
}

impl KeywordResult {
    pub fn new(keywords: Vec<String>) -> Self {
        let count = keywords.len();
        Self { keywords, count }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// The JSON shape the model is instructed to return.
#[derive(Debug, Deserialize)]
struct ModelKeywords {
    #[serde(default)]
    keywords: Vec<String>,
}

/// Trims, drops blank entries, deduplicates in first-occurrence order and keeps at
/// most `max_keywords` entries.
pub fn dedup_keywords(keywords: Vec<String>, max_keywords: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.clone()))
        .take(max_keywords)
        .collect()
}

/// Parses a raw model reply into a `KeywordResult`.
pub fn parse_keyword_reply(raw: &str, max_keywords: usize) -> Result<KeywordResult, ExtractError> {
    let cleaned = clean_json_string(raw);
    let parsed: ModelKeywords = serde_json::from_str(&cleaned)
        .map_err(|source| ExtractError::MalformedReply { source, cleaned })?;
    Ok(KeywordResult::new(dedup_keywords(
        parsed.keywords,
        max_keywords,
    )))
}

// --- Extractor ---

/// Extracts backlink keywords from text with an injected AI provider.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    ai_provider: Box<dyn AiProvider>,
}

impl KeywordExtractor {
    pub fn new(ai_provider: Box<dyn AiProvider>) -> Self {
        Self { ai_provider }
    }

    /// Asks the model for up to `max_keywords` keywords from `text`.
    ///
    /// `text` is expected to be truncated already; `max_keywords` is not validated.
    pub async fn extract(
        &self,
        text: &str,
        max_keywords: usize,
    ) -> Result<KeywordResult, ExtractError> {
        let user_prompt = keyword_user_prompt(text, max_keywords);
        let raw = self
            .ai_provider
            .generate(keyword_system_prompt(), &user_prompt)
            .await?;

        debug!(raw_response = %raw, "<-- Raw LLM keyword response");

        let result = parse_keyword_reply(&raw, max_keywords)?;
        info!("Extracted {} keyword(s).", result.count);
        Ok(result)
    }

    /// Like `extract`, but any failure is logged and turned into an empty result.
    pub async fn extract_or_empty(&self, text: &str, max_keywords: usize) -> KeywordResult {
        match self.extract(text, max_keywords).await {
            Ok(result) => result,
            Err(ExtractError::MalformedReply { source, cleaned }) => {
                warn!(error = %source, cleaned = %cleaned, "Failed to parse JSON from LLM response. Returning empty keyword list.");
                KeywordResult::empty()
            }
            Err(e) => {
                warn!(error = %e, "Keyword extraction failed. Returning empty keyword list.");
                KeywordResult::empty()
            }
        }
    }

    /// Handles a full request: blank text short-circuits to an empty result without
    /// calling the model, longer text is truncated to `TEXT_MAX_LENGTH` characters.
    pub async fn handle_request(&self, request: &ExtractionRequest) -> KeywordResult {
        match request.prepared_text() {
            Some(text) => self.extract_or_empty(&text, request.max_keywords).await,
            None => KeywordResult::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dedup_preserves_first_occurrence_order() {
        let out = dedup_keywords(strings(&["b", "a", "b", "c", "a"]), 10);
        assert_eq!(out, strings(&["b", "a", "c"]));
    }

    #[test]
    fn test_dedup_truncates_after_deduplication() {
        let out = dedup_keywords(strings(&["a", "a", "b", "c"]), 2);
        assert_eq!(out, strings(&["a", "b"]));
    }

    #[test]
    fn test_dedup_drops_blank_and_trims() {
        let out = dedup_keywords(strings(&["  Rust ", "", "   ", "Rust"]), 5);
        assert_eq!(out, strings(&["Rust"]));
    }

    #[test]
    fn test_parse_reply_counts_match() {
        let result = parse_keyword_reply(r#"{"keywords": ["a", "a", "b"]}"#, 5).unwrap();
        assert_eq!(result.count, 2);
        assert_eq!(result.count, result.keywords.len());
    }

    #[test]
    fn test_parse_reply_missing_field_is_empty_not_error() {
        let result = parse_keyword_reply(r#"{"topics": ["a"]}"#, 5).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_parse_reply_without_braces_is_malformed() {
        let err = parse_keyword_reply("I could not find any keywords.", 5).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedReply { .. }));
    }

    #[test]
    fn test_truncate_chars_counts_characters_not_bytes() {
        let text = "가나다라마";
        assert_eq!(truncate_chars(text, 3), "가나다");
        assert_eq!(truncate_chars(text, 10), text);
    }

    #[test]
    fn test_prepared_text_blank_is_none() {
        assert!(ExtractionRequest::new(" \n\t ", 5).prepared_text().is_none());
        assert!(ExtractionRequest::new("", 5).prepared_text().is_none());
    }

    #[test]
    fn test_prepared_text_truncates_to_limit() {
        let long = "x".repeat(TEXT_MAX_LENGTH + 50);
        let prepared = ExtractionRequest::new(long, 5).prepared_text().unwrap();
        assert_eq!(prepared.chars().count(), TEXT_MAX_LENGTH);
    }

    #[test]
    fn test_request_defaults_max_keywords() {
        let request: ExtractionRequest = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(request.max_keywords, DEFAULT_MAX_KEYWORDS);
    }
}
