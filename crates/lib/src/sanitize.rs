//! # Model Output Sanitisation
//!
//! Chat models frequently wrap JSON in markdown fences or surround it with prose.
//! `clean_json_string` is a heuristic that strips the fences and cuts out the
//! outermost `{...}` span; it is not a parser and assumes a single JSON object.

use regex::Regex;
use std::sync::LazyLock;

static JSON_FENCE_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\s*").expect("static regex is valid"));

/// Strips markdown code fences from `content` and returns the substring from the
/// first `{` to the last `}`. If no such span exists the trimmed remainder is
/// returned, and the caller's JSON parse is expected to fail.
pub fn clean_json_string(content: &str) -> String {
    let without_opener = JSON_FENCE_OPENER.replace_all(content, "");
    let without_fences = without_opener.replace("```", "");

    match (without_fences.find('{'), without_fences.rfind('}')) {
        (Some(start), Some(end)) if start < end => without_fences[start..=end].to_string(),
        _ => without_fences.trim().to_string(),
    }
}
