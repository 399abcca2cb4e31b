//! # Keyword Extraction Handler

use super::AppState;
use autolinker::{ExtractionRequest, KeywordResult};
use axum::{extract::State, Json};
use tracing::info;

/// Handles `POST /extract`.
///
/// Always answers 200: blank text and extraction failures both yield an empty
/// result.
pub async fn extract_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ExtractionRequest>,
) -> Json<KeywordResult> {
    info!(
        chars = payload.text.chars().count(),
        max_keywords = payload.max_keywords,
        "Received keyword extraction request."
    );
    Json(app_state.extractor.handle_request(&payload).await)
}
