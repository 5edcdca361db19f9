//! Vision provider abstractions and implementations.
//!
//! Handlers talk to an `Arc<dyn VisionProvider>`, so the Gemini backend can be
//! swapped for the mock in tests and local runs.

pub mod gemini;
pub mod mock;

use crate::config::{AnalysisConfig, ProviderKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use gemini::{GeminiConfig, GeminiVisionProvider};
pub use mock::MockVisionProvider;

/// Error type for provider operations.
///
/// Diagnostic fields reported by the remote service travel with the error and
/// are surfaced to clients through [`ProviderError::status`],
/// [`ProviderError::status_text`] and [`ProviderError::error_details`].
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Error fetching from {provider}: [{status} {status_text}] {message}")]
    Api {
        provider: &'static str,
        status: u16,
        status_text: String,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Response was blocked due to {0}")]
    ContentFiltered(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// HTTP status reported by the provider, if the failure came from it.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        match self {
            ProviderError::Api { status_text, .. } => Some(status_text),
            _ => None,
        }
    }

    pub fn error_details(&self) -> Option<&serde_json::Value> {
        match self {
            ProviderError::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::Api { .. } => "api",
            ProviderError::MalformedResponse(_) => "malformed_response",
            ProviderError::ContentFiltered(_) => "content_filtered",
            ProviderError::NetworkError(_) => "network",
        }
    }
}

/// Image payload sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// MIME type declared by the uploader, passed through untouched.
    pub mime_type: String,

    /// Base64 (standard alphabet, padded) image bytes.
    pub data: String,
}

/// Result of a provider response.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Generated text, `None` when the model returned no text parts.
    pub text: Option<String>,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    /// Finish reason.
    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    Other,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Complete => "complete",
            FinishReason::Length => "length",
            FinishReason::Other => "other",
        }
    }
}

/// Trait for image understanding providers (e.g., Gemini).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Run `prompt` against `image` and return the model's answer.
    async fn analyze(
        &self,
        prompt: &str,
        image: &InlineImage,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Build the provider selected by configuration.
pub fn from_config(config: &AnalysisConfig) -> Result<Arc<dyn VisionProvider>, ProviderError> {
    match config.provider.kind {
        ProviderKind::Gemini => {
            let provider = GeminiVisionProvider::new(GeminiConfig {
                api_key: config.google.api_key.clone(),
                model: config.google.model.clone(),
                api_base: config.google.api_base.clone(),
                timeout: Duration::from_secs(config.google.timeout_secs),
            })?;
            Ok(Arc::new(provider))
        }
        ProviderKind::Mock => Ok(Arc::new(MockVisionProvider::new(
            "Mock analysis: a healthy green plant.",
        ))),
    }
}
