//! # Paper Upload Handler
//!
//! The uploaded PDF is written into its own scratch directory under the upload
//! dir, and a detached task runs the pipeline on it. The task owns the scratch
//! directory, so the copy is removed once the run ends whether it succeeded or not.
//! The HTTP response never waits for the pipeline.

use super::{AppError, AppState};
use crate::types::UploadResponse;
use autolinker_pdf::{PdfPipeline, PipelineJob};
use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use std::{path::Path, sync::Arc};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

/// File name used when the upload carries none.
pub const DEFAULT_UPLOAD_NAME: &str = "uploaded_paper.pdf";

/// Handles `POST /upload-paper`.
pub async fn upload_paper_handler(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" {
            warn!("Ignoring unknown multipart field: {}", name);
            continue;
        }
        let filename = upload_file_name(field.file_name());
        let bytes = field.bytes().await?;
        info!("Received upload '{}' ({} bytes).", filename, bytes.len());
        upload = Some((filename, bytes.to_vec()));
    }

    let (filename, bytes) = upload.ok_or_else(|| {
        AppError::BadRequest("No 'file' part found in the upload.".to_string())
    })?;

    tokio::fs::create_dir_all(&app_state.upload_dir)
        .await
        .map_err(anyhow::Error::from)?;
    let scratch = tempfile::Builder::new()
        .prefix("upload-")
        .tempdir_in(&app_state.upload_dir)
        .map_err(anyhow::Error::from)?;
    let pdf_path = scratch.path().join(&filename);
    tokio::fs::write(&pdf_path, &bytes)
        .await
        .map_err(anyhow::Error::from)?;

    let job = PipelineJob::new(pdf_path, &app_state.vault_path);
    spawn_pipeline(app_state.pipeline.clone(), job, scratch);

    Ok(Json(UploadResponse::processing(filename)))
}

/// Runs the pipeline as a detached task. Failures are only logged.
pub fn spawn_pipeline(
    pipeline: Arc<PdfPipeline>,
    job: PipelineJob,
    scratch: TempDir,
) -> JoinHandle<()> {
    let job_id = Uuid::new_v4();
    let span = tracing::info_span!("pipeline_job", %job_id, source = %job.source_name);
    tokio::spawn(
        async move {
            info!("Pipeline started.");
            match pipeline.run(&job).await {
                Ok(note) => info!(note = %note.display(), "Pipeline finished."),
                Err(e) => error!(error = %e, "Pipeline failed; no note was written."),
            }
            if let Err(e) = scratch.close() {
                warn!(error = %e, "Failed to remove upload scratch directory.");
            }
        }
        .instrument(span),
    )
}

/// Keeps only the final path component of a client-supplied file name.
fn upload_file_name(raw: Option<&str>) -> String {
    raw.and_then(|name| Path::new(name.trim()).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty() && *name != "..")
        .unwrap_or(DEFAULT_UPLOAD_NAME)
        .to_string()
}
