//! # Paper Metadata
//!
//! Best-effort enrichment of a converted paper with its title, authors,
//! publication date and URL. An arXiv-style identifier is searched for in the
//! file name and the start of the converted text, then looked up through a
//! `MetadataSource`. Every miss falls back to filename-derived defaults.

use crate::error::MetadataError;
use async_trait::async_trait;
use atom_syndication::{Entry, Feed};
use regex::Regex;
use std::fmt::Debug;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The public arXiv export API.
pub const DEFAULT_ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";

static ARXIV_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}\.\d{4,5})").expect("static regex is valid"));
/// Bibliographic data for one paper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperMetadata {
    pub title: String,
    pub authors: Vec<String>,
    /// `YYYY-MM-DD`, or empty when unknown.
    pub published: String,
    pub url: String,
}

impl PaperMetadata {
    /// The fallback used whenever no lookup result is available.
    pub fn from_filename(filename: &str) -> Self {
        Self {
            title: filename.to_string(),
            ..Default::default()
        }
    }
}

/// Looks up a paper by its identifier.
#[async_trait]
pub trait MetadataSource: Send + Sync + Debug {
    /// Returns `Ok(None)` when the source has no record for `id`.
    async fn lookup(&self, id: &str) -> Result<Option<PaperMetadata>, MetadataError>;
}

/// Finds the first arXiv-style identifier (`2301.12345`) in the file name or preview.
pub fn find_arxiv_id(filename: &str, preview: &str) -> Option<String> {
    let haystack = format!("{filename}{preview}");
    ARXIV_ID
        .captures(&haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolves metadata for a converted document, never failing.
pub async fn resolve_metadata(
    source: &dyn MetadataSource,
    preview: &str,
    filename: &str,
) -> PaperMetadata {
    let Some(id) = find_arxiv_id(filename, preview) else {
        debug!("No arXiv identifier found for '{filename}'.");
        return PaperMetadata::from_filename(filename);
    };

    match source.lookup(&id).await {
        Ok(Some(meta)) => {
            info!(arxiv_id = %id, title = %meta.title, "Resolved paper metadata");
            meta
        }
        Ok(None) => {
            info!(arxiv_id = %id, "No metadata record found; using file name");
            PaperMetadata::from_filename(filename)
        }
        Err(e) => {
            warn!(arxiv_id = %id, error = %e, "Metadata lookup failed; using file name");
            PaperMetadata::from_filename(filename)
        }
    }
}

/// A `MetadataSource` backed by the arXiv Atom API.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: reqwest::Client,
    api_url: String,
}

impl ArxivSource {
    pub fn new(api_url: impl Into<String>) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("autolinker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MetadataError::ClientBuild)?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl MetadataSource for ArxivSource {
    async fn lookup(&self, id: &str) -> Result<Option<PaperMetadata>, MetadataError> {
        debug!(arxiv_id = %id, url = %self.api_url, "Querying arXiv");
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("id_list", id), ("max_results", "1")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(MetadataError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }
        parse_arxiv_feed(&body)
    }
}

/// Maps the first entry of an arXiv Atom feed to `PaperMetadata`.
///
/// A feed without entries, arXiv's error entries and untitled entries are
/// `Ok(None)`; a body that is not an Atom feed is an error.
pub fn parse_arxiv_feed(body: &str) -> Result<Option<PaperMetadata>, MetadataError> {
    let feed: Feed = body.parse()?;
    Ok(feed.entries().first().and_then(entry_metadata))
}

fn entry_metadata(entry: &Entry) -> Option<PaperMetadata> {
    if entry.id().contains("arxiv.org/api/errors") {
        return None;
    }
    let title = collapse_whitespace(entry.title().as_str());
    if title.is_empty() {
        return None;
    }

    Some(PaperMetadata {
        title,
        authors: entry
            .authors()
            .iter()
            .map(|author| collapse_whitespace(author.name()))
            .filter(|name| !name.is_empty())
            .collect(),
        published: entry
            .published()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        url: entry.id().trim().to_string(),
    })
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
