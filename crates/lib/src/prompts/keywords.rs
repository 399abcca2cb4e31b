//! # Keyword Extraction Prompts
//!
//! The prompts sent to the model when extracting backlink keywords from a note.
//! The system prompt fixes the output contract (`{"keywords": [...]}`); the user
//! prompt carries the note text and the requested keyword count.

/// The system prompt for keyword extraction.
pub const KEYWORD_EXTRACTION_SYSTEM_PROMPT: &str = r#"You are an expert content analyzer for Obsidian notes.
Your task is to extract key concepts (keywords) from the provided text for backlinking purposes.

[Rules]
1. Extract only high-level concepts, entities, or topics.
2. **IMPORTANT: Extract keywords in the language of the text (Korean text yields Korean keywords).**
3. **IMPORTANT: Remove all postpositions (Josa) from Korean words.** (e.g., "옵시디언은" -> "옵시디언", "AI를" -> "AI")
4. Do not return generic words like "오늘", "생각", "작업" ("today", "thought", "work").
5. Return the result strictly in JSON format: {"keywords": ["keyword1", "keyword2"]}
6. Do not include any explanation, only the JSON object."#;

/// The user prompt template for keyword extraction.
///
/// Placeholders: `{max_keywords}`, `{text}`
pub const KEYWORD_EXTRACTION_USER_PROMPT: &str = r#"Analyze the following text and extract up to {max_keywords} most important keywords.

Text:
{text}"#;

/// Returns the system prompt for keyword extraction.
pub fn keyword_system_prompt() -> &'static str {
    KEYWORD_EXTRACTION_SYSTEM_PROMPT
}

/// Fills the user prompt template with the note text and the keyword budget.
pub fn keyword_user_prompt(text: &str, max_keywords: usize) -> String {
    KEYWORD_EXTRACTION_USER_PROMPT
        .replace("{max_keywords}", &max_keywords.to_string())
        .replace("{text}", text)
}
