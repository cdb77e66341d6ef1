use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::pdf::validate_pdf;
use crate::extraction::{DocumentExtractor, ExtractionError, ExtractionResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    /// Where the upload was stored; pass this back as `resume_file_path` when merging.
    pub file_path: String,
    pub extraction: ExtractionResult,
}

/// POST /api/v1/resumes/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        upload = Some((file_name, bytes.to_vec()));
        break;
    }

    let Some((file_name, bytes)) = upload else {
        return Err(AppError::Validation("Missing 'file' field".to_string()));
    };
    check_upload(&file_name, bytes.len(), state.config.max_upload_bytes)?;

    let path = store_upload(&state.config.upload_dir, &bytes).await?;
    info!(file_name = %file_name, path = %path.display(), size = bytes.len(), "Stored upload");

    let extraction = extract_or_discard(state.extractor.clone(), &path).await?;

    Ok(Json(ExtractResponse {
        file_path: path.to_string_lossy().into_owned(),
        extraction,
    }))
}

/// Extracts a stored upload, removing the file when extraction fails.
async fn extract_or_discard(
    extractor: Arc<DocumentExtractor>,
    path: &Path,
) -> Result<ExtractionResult, AppError> {
    let result = extract_stored(extractor, path).await;
    if result.is_err() {
        discard_upload(path).await;
    }
    result
}

/// Validates a stored upload and runs the extractor on it off the async runtime.
async fn extract_stored(
    extractor: Arc<DocumentExtractor>,
    path: &Path,
) -> Result<ExtractionResult, AppError> {
    match validate_pdf(path) {
        Ok(_) => {}
        // Structurally broken files still get an OCR attempt.
        Err(ExtractionError::Pdf(e)) => {
            warn!(path = %path.display(), error = %e, "Upload does not parse as PDF");
        }
        Err(e) => return Err(e.into()),
    }

    let target = path.to_path_buf();
    let extraction = tokio::task::spawn_blocking(move || extractor.extract(&target))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}"))
        })??;
    Ok(extraction)
}

/// Removes a stored upload; failure is only logged.
async fn discard_upload(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!(path = %path.display(), "Discarded failed upload"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to discard upload"),
    }
}

fn check_upload(file_name: &str, size: usize, max_bytes: usize) -> Result<(), AppError> {
    let is_pdf = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(AppError::Validation(
            "Only PDF files are supported".to_string(),
        ));
    }
    if size == 0 {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if size > max_bytes {
        return Err(AppError::Validation(format!(
            "File too large. Maximum size is {}MB",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

async fn store_upload(dir: &Path, bytes: &[u8]) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create upload dir: {e}")))?;
    let path = dir.join(format!("{}.pdf", Uuid::new_v4()));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to store upload: {e}")))?;
    Ok(path)
}
