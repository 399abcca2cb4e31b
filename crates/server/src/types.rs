use serde::{Deserialize, Serialize};

/// Acknowledgement returned by `/upload-paper` before the pipeline runs.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub status: String,
    pub filename: String,
}

impl UploadResponse {
    pub fn processing(filename: impl Into<String>) -> Self {
        Self {
            status: "processing".to_string(),
            filename: filename.into(),
        }
    }
}
