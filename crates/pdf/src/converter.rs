//! # PDF Converters
//!
//! A `PdfConverter` turns a PDF on disk into markdown text plus the images it
//! extracted. The pipeline only depends on the trait, so the converter is chosen
//! once at startup and injected.

use crate::error::PdfError;
use async_trait::async_trait;
use pdf::content::{Op, TextDrawAdjusted};
use pdf::file::FileOptions;
use pdf::font::{Font, ToUnicodeMap};
use pdf::object::{Page, Resolve};
use pdf::primitive::Name;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info};

/// The result of converting a PDF.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertedDocument {
    /// The full converted body text.
    pub markdown: String,
    /// Encoded image bytes keyed by the file name the markdown refers to.
    pub images: BTreeMap<String, Vec<u8>>,
}

/// Converts a PDF file to markdown.
#[async_trait]
pub trait PdfConverter: Send + Sync + Debug {
    async fn convert(&self, pdf_path: &Path) -> Result<ConvertedDocument, PdfError>;
}

/// Spacing adjustments in a `TJ` array below this (in thousandths of an em)
/// are treated as a word gap.
const WORD_GAP: f32 = -200.0;

/// Maps the string operands drawn with one font back to text.
struct FontDecoder {
    unicode: Option<ToUnicodeMap>,
    two_byte: bool,
}

impl FontDecoder {
    fn load(font: &Font, resolver: &impl Resolve) -> Self {
        let unicode = match font.to_unicode(resolver) {
            Some(Ok(map)) => Some(map),
            Some(Err(e)) => {
                debug!(error = %e, "Ignoring unreadable ToUnicode map");
                None
            }
            None => None,
        };
        Self {
            unicode,
            two_byte: font.is_cid(),
        }
    }

    fn decode(&self, bytes: &[u8], out: &mut String) {
        decode_codes(
            bytes,
            self.two_byte,
            |code| self.unicode.as_ref().and_then(|map| map.get(code)),
            out,
        );
    }
}

/// Decodes character codes through `lookup`.
///
/// CID fonts use two-byte codes; codes without a mapping are glyph ids and are
/// dropped. Simple fonts use one-byte codes and fall back to the byte itself.
/// Control characters never reach the output.
fn decode_codes<'a>(
    bytes: &[u8],
    two_byte: bool,
    lookup: impl Fn(u16) -> Option<&'a str>,
    out: &mut String,
) {
    let mut push_visible = |text: &str| out.extend(text.chars().filter(|c| !c.is_control()));
    if two_byte {
        for pair in bytes.chunks(2) {
            let code = match *pair {
                [hi, lo] => u16::from_be_bytes([hi, lo]),
                [single] => u16::from(single),
                _ => continue,
            };
            if let Some(text) = lookup(code) {
                push_visible(text);
            }
        }
    } else {
        for &byte in bytes {
            match lookup(u16::from(byte)) {
                Some(text) => push_visible(text),
                None => push_visible(&*char::from(byte).encode_utf8(&mut [0; 4])),
            }
        }
    }
}

fn page_fonts(page: &Page, resolver: &impl Resolve) -> HashMap<Name, FontDecoder> {
    let Ok(resources) = page.resources() else {
        return HashMap::new();
    };
    resources
        .fonts
        .iter()
        .filter_map(|(name, font)| match font.load(resolver) {
            Ok(font) => Some((name.clone(), FontDecoder::load(&font, resolver))),
            Err(e) => {
                debug!(font = %name, error = %e, "Skipping unreadable font");
                None
            }
        })
        .collect()
}

fn draw_text(font: Option<&FontDecoder>, bytes: &[u8], out: &mut String) {
    match font {
        Some(font) => font.decode(bytes, out),
        None => decode_codes(bytes, false, |_| None, out),
    }
}

/// Extracts text from all pages of a PDF synchronously.
///
/// Strings are decoded through each font's ToUnicode map. Pages are separated
/// by a blank line. No images are produced.
pub fn extract_text_from_pdf(pdf_data: &[u8]) -> Result<String, PdfError> {
    let file = FileOptions::cached()
        .load(pdf_data)
        .map_err(|e| PdfError::PdfParse(e.to_string()))?;
    let resolver = file.resolver();
    let mut pages = Vec::new();

    for page_num in 0..file.num_pages() {
        let page = file
            .get_page(page_num)
            .map_err(|e| PdfError::PdfParse(e.to_string()))?;
        let fonts = page_fonts(&page, &resolver);
        let mut current_font = None;
        let mut page_text = String::new();
        if let Some(content) = &page.contents {
            let operations = content
                .operations(&resolver)
                .map_err(|e| PdfError::PdfParse(e.to_string()))?;
            for op in operations.iter() {
                match op {
                    Op::TextFont { name, .. } => current_font = fonts.get(name),
                    Op::TextDraw { text } => draw_text(current_font, text.as_bytes(), &mut page_text),
                    Op::TextDrawAdjusted { array } => {
                        for item in array {
                            match item {
                                TextDrawAdjusted::Text(text) => {
                                    draw_text(current_font, text.as_bytes(), &mut page_text)
                                }
                                TextDrawAdjusted::Spacing(gap) if *gap < WORD_GAP => {
                                    if !page_text.ends_with([' ', '\n']) {
                                        page_text.push(' ');
                                    }
                                }
                                TextDrawAdjusted::Spacing(_) => {}
                            }
                        }
                    }
                    Op::TextNewline | Op::EndText => {
                        if !page_text.ends_with('\n') {
                            page_text.push('\n');
                        }
                    }
                    _ => {}
                }
            }
        }
        let page_text = page_text.trim();
        if !page_text.is_empty() {
            pages.push(page_text.to_string());
        }
        debug!(page = page_num, chars = page_text.len(), "Extracted page text");
    }
    Ok(pages.join("\n\n"))
}

/// A pure-Rust converter that reads the PDF's text layer.
#[derive(Debug, Clone, Default)]
pub struct TextLayerConverter;

impl TextLayerConverter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PdfConverter for TextLayerConverter {
    async fn convert(&self, pdf_path: &Path) -> Result<ConvertedDocument, PdfError> {
        let data = tokio::fs::read(pdf_path)
            .await
            .map_err(|source| PdfError::Io {
                path: pdf_path.to_path_buf(),
                source,
            })?;
        info!(
            "Extracting text layer from '{}' ({} bytes).",
            pdf_path.display(),
            data.len()
        );
        let markdown = tokio::task::spawn_blocking(move || extract_text_from_pdf(&data)).await??;
        Ok(ConvertedDocument {
            markdown,
            images: BTreeMap::new(),
        })
    }
}
