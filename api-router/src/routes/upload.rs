use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use serde_json::json;
use tempfile::NamedTempFile;
use tracing::info;

use common::{error::AppError, storage::document_store::DocumentStore};

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, TryFromMultipart)]
pub struct UploadRequest {
    #[form_data(limit = "unlimited")]
    #[form_data(default)]
    pub files: Vec<FieldData<NamedTempFile>>,
}

/// Replaces the stored document batch and its index with the uploaded files.
///
/// The whole request is validated before any stored state changes; the new
/// batch and index are published together only after a successful build, so
/// a failing upload leaves the previous state intact.
///
/// Route: POST /upload
pub async fn upload_documents(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<UploadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if input.files.is_empty() {
        return Err(ApiError::ValidationError("No files part".to_string()));
    }

    info!(file_count = input.files.len(), "Received upload request");

    // Validate every filename up front; the first invalid file rejects the
    // batch before anything is written.
    let mut incoming = Vec::with_capacity(input.files.len());
    for file in input.files {
        let file_name = file.metadata.file_name.unwrap_or_default();
        let sanitized = DocumentStore::validate_file_name(&file_name).map_err(AppError::from)?;
        incoming.push((sanitized, file.contents));
    }

    // One rebuild at a time; readers keep serving the previous pair.
    let _guard = state.upload_lock.lock().await;

    let batch = state
        .store
        .stage_batch(incoming)
        .await
        .map_err(AppError::from)?;

    let index = match state.ingestion.build_index(&batch).await {
        Ok(index) => index,
        Err(err) => {
            state.store.remove_batch(&batch).await;
            return Err(err.into());
        }
    };

    let uploaded_files = batch.file_names.clone();
    let previous = {
        let mut library = state.library.write().await;
        library.replace(Arc::new(batch), Arc::new(index))
    };

    if let Some(previous) = previous {
        state.store.remove_batch(&previous).await;
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Files uploaded and vector store ready",
            "uploaded_files": uploaded_files,
        })),
    ))
}
