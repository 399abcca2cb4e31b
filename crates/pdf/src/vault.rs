//! Writing converted papers into a notes vault.

use crate::{error::PipelineError, metadata::PaperMetadata};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Vault subdirectory holding extracted images.
pub const ASSETS_DIR: &str = "assets";
/// Note name used when a title has no usable characters.
pub const UNTITLED_NOTE: &str = "Untitled_Paper";

const FORBIDDEN_TITLE_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];
const MAX_NOTE_VERSIONS: usize = 1000;

#[derive(Serialize)]
struct FrontMatter<'a> {
    title: &'a str,
    authors: &'a [String],
    url: &'a str,
    date: &'a str,
}

/// Strips characters that are invalid in file names on common platforms.
pub fn safe_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !FORBIDDEN_TITLE_CHARS.contains(c))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        UNTITLED_NOTE.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Turns the two markdown image forms the converters emit for `name` into an embed.
///
/// Other forms (alt text, titles, different directories) are left unchanged.
pub fn rewrite_image_links(body: &str, name: &str) -> String {
    let embed = format!("![[{name}]]");
    body.replace(&format!("![](images/{name})"), &embed)
        .replace(&format!("![]({name})"), &embed)
}

/// Renders a note with YAML front-matter, a title heading and the body.
pub fn render_note(meta: &PaperMetadata, body: &str) -> Result<String, PipelineError> {
    let front_matter = serde_yaml::to_string(&FrontMatter {
        title: &meta.title,
        authors: &meta.authors,
        url: &meta.url,
        date: &meta.published,
    })?;
    Ok(format!(
        "---\n{front_matter}---\n\n# {}\n\n{body}",
        meta.title
    ))
}

/// Writes `content` as `<stem>.md`, or `<stem> (2).md`, `<stem> (3).md`, ... if taken.
///
/// Names are claimed with create-new semantics, so concurrent writers never
/// overwrite each other.
pub async fn write_note_versioned(
    dir: &Path,
    stem: &str,
    content: &str,
) -> Result<PathBuf, PipelineError> {
    for version in 1..=MAX_NOTE_VERSIONS {
        let file_name = if version == 1 {
            format!("{stem}.md")
        } else {
            format!("{stem} ({version}).md")
        };
        let path = dir.join(file_name);
        let opened = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;
        match opened {
            Ok(mut file) => {
                file.write_all(content.as_bytes())
                    .await
                    .map_err(|e| PipelineError::io(&path, e))?;
                file.flush().await.map_err(|e| PipelineError::io(&path, e))?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("'{}' exists, trying next version.", path.display());
            }
            Err(e) => return Err(PipelineError::io(&path, e)),
        }
    }
    Err(PipelineError::NameExhausted(stem.to_string()))
}
