//! Mock provider implementation for testing and offline runs.

use super::{FinishReason, InlineImage, ProviderError, ProviderResponse, VisionProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// A call received by [`MockVisionProvider`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub image: InlineImage,
}

enum Behavior {
    Respond(Option<String>),
    Fail(ProviderError),
}

/// Mock vision provider that never touches the network.
pub struct MockVisionProvider {
    behavior: Behavior,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockVisionProvider {
    /// Provider that answers every request with `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Respond(Some(text.into())))
    }

    /// Provider whose responses carry no text at all.
    pub fn without_text() -> Self {
        Self::with_behavior(Behavior::Respond(None))
    }

    /// Provider that fails every call, health checks included, with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::with_behavior(Behavior::Fail(error))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn analyze(
        &self,
        prompt: &str,
        image: &InlineImage,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                image: image.clone(),
            });
        }

        match &self.behavior {
            Behavior::Respond(text) => Ok(ProviderResponse {
                text: text.clone(),
                input_tokens: prompt.len() as i32 / 4,
                output_tokens: text.as_ref().map_or(0, |t| t.len() as i32 / 4),
                finish_reason: FinishReason::Complete,
            }),
            Behavior::Fail(error) => Err(error.clone()),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.behavior {
            Behavior::Respond(_) => Ok(()),
            Behavior::Fail(error) => Err(error.clone()),
        }
    }
}
