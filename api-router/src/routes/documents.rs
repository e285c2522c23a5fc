use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use common::{error::AppError, storage::document_store::FileError};

use crate::{api_state::ApiState, error::ApiError};

/// Serves the raw bytes of a stored PDF from the current batch.
///
/// Route: GET /get-pdf/{pdf_name}
pub async fn get_pdf(
    State(state): State<ApiState>,
    Path(pdf_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let batch = {
        let library = state.library.read().await;
        library.batch()
    }
    .ok_or_else(|| ApiError::NotFound("PDF not found".to_string()))?;

    let bytes = match state.store.read_document(&batch, &pdf_name).await {
        Ok(bytes) => bytes,
        Err(FileError::FileNotFound(_)) => {
            return Err(ApiError::NotFound("PDF not found".to_string()))
        }
        Err(err) => return Err(AppError::from(err).into()),
    };

    Ok((
        [(header::CONTENT_TYPE, mime::APPLICATION_PDF.to_string())],
        bytes,
    ))
}

/// Lists the filenames of the current batch, in submission order.
///
/// Route: GET /get-pdf-names
pub async fn get_pdf_names(State(state): State<ApiState>) -> impl IntoResponse {
    let file_names = {
        let library = state.library.read().await;
        library.file_names()
    };

    Json(json!({ "pdfNames": file_names }))
}
