//! Provider driver abstraction.
//!
//! The pipeline only sees [`ProviderDriver`]: a streaming image capability and
//! a one-shot text capability. `Arc<dyn ProviderDriver>` lets the server run
//! against Gemini and tests run against an in-process stub.

pub mod gemini;

use async_trait::async_trait;

use crate::types::{FinishReason, Message, StreamChunk};
use crate::{BoxStream, Result};

pub use gemini::GeminiDriver;

/// Lazy, finite, non-restartable sequence of chunks. Dropping it cancels the call.
pub type ChunkStream = BoxStream<'static, StreamChunk>;

/// One provider invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverRequest {
    pub model: String,
    pub api_key: String,
    pub contents: Vec<Message>,
    /// Requested output modalities (e.g. `["IMAGE", "TEXT"]`); empty means provider default.
    pub response_modalities: Vec<String>,
}

impl DriverRequest {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, contents: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            contents,
            response_modalities: Vec::new(),
        }
    }

    pub fn with_response_modalities(mut self, modalities: &[&str]) -> Self {
        self.response_modalities = modalities.iter().map(|m| m.to_string()).collect();
        self
    }
}

/// Non-streaming answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverResponse {
    /// Text of the first candidate's first text part.
    pub text: Option<String>,
    pub finish_reason: Option<FinishReason>,
}

#[async_trait]
pub trait ProviderDriver: Send + Sync + std::fmt::Debug {
    /// Unique provider identifier, used in logs.
    fn provider_id(&self) -> &str;

    /// Start a streamed generation. Connection failures surface here; failures
    /// after the first byte surface as `Err` items of the stream.
    async fn stream_generate(&self, request: DriverRequest) -> Result<ChunkStream>;

    /// One-shot generation.
    async fn generate(&self, request: DriverRequest) -> Result<DriverResponse>;
}
