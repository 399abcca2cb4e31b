//! # Note Linker
//!
//! Rewrites note text so that extracted keywords become `[[wiki-links]]`.
//! Longer keywords are linked first so that "AI safety" wins over "AI". Text that
//! is already inside a `[[...]]` link is never touched, and a keyword directly
//! preceded by `#` is treated as a tag and left alone.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\[\]]*\]\]").expect("static regex is valid"));

/// Counts the existing `[[...]]` links in `text`.
pub fn count_links(text: &str) -> usize {
    WIKI_LINK.find_iter(text).count()
}

/// Wraps every eligible occurrence of each keyword in `[[...]]`.
pub fn apply_links<S: AsRef<str>>(text: &str, keywords: &[S]) -> String {
    let mut sorted: Vec<&str> = keywords
        .iter()
        .map(|k| k.as_ref().trim())
        .filter(|k| !k.is_empty())
        .collect();
    sorted.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    sorted.dedup();

    sorted
        .into_iter()
        .fold(text.to_string(), |acc, keyword| link_keyword(&acc, keyword))
}

fn link_keyword(text: &str, keyword: &str) -> String {
    let protected: Vec<Range<usize>> = WIKI_LINK.find_iter(text).map(|m| m.range()).collect();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for (start, matched) in text.match_indices(keyword) {
        let end = start + matched.len();
        let inside_link = protected.iter().any(|r| start < r.end && end > r.start);
        let is_tag = text[..start].ends_with('#');
        if inside_link || is_tag {
            continue;
        }
        out.push_str(&text[cursor..start]);
        out.push_str("[[");
        out.push_str(matched);
        out.push_str("]]");
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}
