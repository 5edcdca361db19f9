use crate::error::AnalysisError;
use crate::models::analysis::NO_TEXT_PLACEHOLDER;
use crate::models::{data_uri, AnalysisResponse};
use crate::services::metrics::record_provider_call;
use crate::services::{InlineImage, StoredUpload};
use crate::startup::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use std::time::Instant;

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// `POST /analyze`: run the configured prompt against one uploaded image.
///
/// A body that is not multipart at all is treated the same as a form without
/// an `image` file.
pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, AnalysisError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "Request body is not multipart");
        AnalysisError::MissingUpload
    })?;

    let upload = receive_image(&state, &mut multipart)
        .await?
        .ok_or(AnalysisError::MissingUpload)?;

    tracing::info!(
        mime_type = %upload.mime_type,
        size_bytes = upload.size,
        file_name = upload.original_name.as_deref().unwrap_or("-"),
        "Image received"
    );

    match analyze_upload(&state, &upload).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            if state.config.upload.cleanup_on_error {
                if let Err(cleanup) = state.uploads.remove(&upload).await {
                    tracing::warn!(
                        path = %upload.path.display(),
                        error = %cleanup,
                        "Failed to remove upload after failed analysis"
                    );
                }
            } else {
                tracing::warn!(
                    path = %upload.path.display(),
                    "Upload left on disk after failed analysis"
                );
            }
            Err(e)
        }
    }
}

/// Persist the first `image` file field. Fields before it are skipped; the
/// rest of the body is not read.
async fn receive_image(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<Option<StoredUpload>, AnalysisError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) && field.file_name().is_some() {
            return Ok(Some(state.uploads.persist_field(field).await?));
        }
    }

    Ok(None)
}

async fn analyze_upload(
    state: &AppState,
    upload: &StoredUpload,
) -> Result<AnalysisResponse, AnalysisError> {
    let data = state.uploads.read_base64(upload).await?;

    let image = InlineImage {
        mime_type: upload.mime_type.clone(),
        data,
    };

    let provider = state.provider.name();
    let started = Instant::now();
    let outcome = state
        .provider
        .analyze(&state.config.provider.prompt, &image)
        .await;

    let response = match outcome {
        Ok(response) => {
            record_provider_call(provider, "success", started.elapsed());
            response
        }
        Err(e) => {
            record_provider_call(provider, e.kind(), started.elapsed());
            return Err(e.into());
        }
    };

    tracing::info!(
        provider,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        finish_reason = response.finish_reason.as_str(),
        has_text = response.text.is_some(),
        "Analysis complete"
    );

    let results = response
        .text
        .unwrap_or_else(|| NO_TEXT_PLACEHOLDER.to_string());

    state.uploads.remove(upload).await?;

    Ok(AnalysisResponse {
        results,
        image: data_uri(&image.mime_type, &image.data),
    })
}
