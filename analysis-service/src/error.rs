//! Errors returned by the analysis endpoint.

use crate::services::ProviderError;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

pub const MISSING_UPLOAD_MESSAGE: &str = "Please upload an image";

const UNKNOWN: &str = "Unknown";
const NO_DETAILS: &str = "No additional details available";

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The request carried no `image` file field.
    #[error("{}", MISSING_UPLOAD_MESSAGE)]
    MissingUpload,

    #[error("{0}")]
    Multipart(#[from] MultipartError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl AnalysisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::MissingUpload => StatusCode::BAD_REQUEST,
            AnalysisError::Multipart(err) => err.status(),
            AnalysisError::Io(_) | AnalysisError::Provider(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn provider(&self) -> Option<&ProviderError> {
        match self {
            AnalysisError::Provider(err) => Some(err),
            _ => None,
        }
    }

    /// Server-error body: the underlying message plus whatever diagnostics the
    /// provider reported, with placeholders for the rest.
    fn server_error_body(&self) -> Value {
        let provider = self.provider();

        let status = provider
            .and_then(ProviderError::status)
            .map_or_else(|| Value::from(UNKNOWN), Value::from);
        let status_text = provider
            .and_then(ProviderError::status_text)
            .unwrap_or(UNKNOWN);
        let error_details = provider
            .and_then(ProviderError::error_details)
            .cloned()
            .unwrap_or_else(|| Value::from(NO_DETAILS));

        json!({
            "error": self.to_string(),
            "status": status,
            "statusText": status_text,
            "errorDetails": error_details,
        })
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AnalysisError::MissingUpload => json!({ "error": MISSING_UPLOAD_MESSAGE }),
            AnalysisError::Multipart(err) => json!({ "error": err.body_text() }),
            AnalysisError::Io(_) | AnalysisError::Provider(_) => {
                tracing::error!(error = %self, "Image analysis failed");
                self.server_error_body()
            }
        };

        (status, Json(body)).into_response()
    }
}
