//! Test doubles shared by the autolinker crates.

use autolinker::errors::PromptError;
use autolinker::providers::ai::AiProvider;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

// --- Mock AI Provider ---

/// Replies with pre-programmed text and records every prompt it receives.
#[derive(Clone, Debug, Default)]
pub struct MockAiProvider {
    responses: Arc<Mutex<Vec<(String, String)>>>,
    fallback: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that answers every request with `reply`.
    pub fn replying(reply: &str) -> Self {
        let mock = Self::new();
        mock.set_default_response(reply);
        mock
    }

    /// Programs a reply for requests whose user prompt contains `key`.
    pub fn add_response(&self, key: &str, response: &str) {
        self.responses
            .lock()
            .unwrap()
            .push((key.to_string(), response.to_string()));
    }

    /// Programs the reply used when no keyed response matches.
    pub fn set_default_response(&self, response: &str) {
        *self.fallback.lock().unwrap() = Some(response.to_string());
    }

    /// Retrieves the recorded `(system, user)` prompt pairs.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        let keyed = self
            .responses
            .lock()
            .unwrap()
            .iter()
            .find(|(key, _)| user_prompt.contains(key.as_str()))
            .map(|(_, response)| response.clone());
        if let Some(response) = keyed {
            return Ok(response);
        }
        if let Some(response) = self.fallback.lock().unwrap().clone() {
            return Ok(response);
        }

        Err(PromptError::AiApi(
            "MockAiProvider: no response programmed for this prompt".to_string(),
        ))
    }
}

// --- PDF pipeline doubles ---
#[cfg(feature = "pdf")]
pub mod pipeline {
    use async_trait::async_trait;
    use autolinker_pdf::{
        ConvertedDocument, MetadataError, MetadataSource, PaperMetadata, PdfConverter, PdfError,
    };
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Returns a fixed document, optionally after a delay.
    #[derive(Debug, Clone, Default)]
    pub struct MockConverter {
        document: ConvertedDocument,
        delay: Option<Duration>,
        fail: bool,
        calls: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl MockConverter {
        pub fn new(markdown: &str) -> Self {
            Self {
                document: ConvertedDocument {
                    markdown: markdown.to_string(),
                    images: BTreeMap::new(),
                },
                ..Default::default()
            }
        }

        /// A converter whose every call fails like a corrupt PDF would.
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn with_image(mut self, name: &str, bytes: &[u8]) -> Self {
            self.document
                .images
                .insert(name.to_string(), bytes.to_vec());
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// The paths this converter was asked to convert.
        pub fn calls(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PdfConverter for MockConverter {
        async fn convert(&self, pdf_path: &Path) -> Result<ConvertedDocument, PdfError> {
            self.calls.lock().unwrap().push(pdf_path.to_path_buf());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(PdfError::PdfParse("mock conversion failure".to_string()));
            }
            Ok(self.document.clone())
        }
    }

    /// Answers lookups from a fixed table; unknown ids have no record.
    #[derive(Debug, Clone, Default)]
    pub struct MockMetadataSource {
        records: Arc<Mutex<Vec<(String, PaperMetadata)>>>,
        fail: bool,
        lookups: Arc<Mutex<Vec<String>>>,
    }

    impl MockMetadataSource {
        pub fn new() -> Self {
            Self::default()
        }

        /// A source whose every lookup is a transport error.
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn with_record(self, id: &str, meta: PaperMetadata) -> Self {
            self.records.lock().unwrap().push((id.to_string(), meta));
            self
        }

        pub fn lookups(&self) -> Vec<String> {
            self.lookups.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MetadataSource for MockMetadataSource {
        async fn lookup(&self, id: &str) -> Result<Option<PaperMetadata>, MetadataError> {
            self.lookups.lock().unwrap().push(id.to_string());
            if self.fail {
                return Err(MetadataError::Api {
                    status: 503,
                    message: "mock metadata outage".to_string(),
                });
            }
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|(known, _)| known == id)
                .map(|(_, meta)| meta.clone()))
        }
    }
}

// --- Test-Specific Helpers ---
#[cfg(feature = "pdf")]
pub mod helpers {
    use anyhow::Result;
    use printpdf::{
        BuiltinFont, Layer, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Pt, TextItem,
        TextMatrix, TextRenderingMode,
    };

    /// Generates a PDF with one page per entry in `pages`, set in built-in
    /// Helvetica so the text layer holds the literal text.
    pub fn generate_test_pdf(pages: &[&str]) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::new("Autolinker Test Paper");
        let layer_id = doc.add_layer(&Layer::new("Text"));
        let font = BuiltinFont::Helvetica;

        for text in pages {
            let mut page = PdfPage::new(Mm(210.0), Mm(297.0), vec![]);
            page.ops = vec![
                Op::BeginLayer {
                    layer_id: layer_id.clone(),
                },
                Op::SetFontSizeBuiltinFont {
                    size: Pt(12.0),
                    font,
                },
                Op::StartTextSection,
                Op::SetTextMatrix {
                    matrix: TextMatrix::Translate(Mm(10.0).into(), Mm(280.0).into()),
                },
                Op::SetTextRenderingMode {
                    mode: TextRenderingMode::Fill,
                },
                Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(text.to_string())],
                    font,
                },
                Op::EndTextSection,
                Op::EndLayer {
                    layer_id: layer_id.clone(),
                },
            ];
            doc.pages.push(page);
        }

        let mut warnings = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            eprintln!("PDF generation warnings: {warnings:?}");
        }
        Ok(bytes)
    }
}
