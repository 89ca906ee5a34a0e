//! Google Gemini generateContent API driver.
//!
//! - Request: `contents[].parts[]` with `inlineData { mimeType, data }` for images.
//! - Streaming: `:streamGenerateContent?alt=sse`, each SSE frame is a full
//!   generateContent response for the newest slice of output.
//! - Only the first candidate is inspected.
//! - API key goes in the `x-goog-api-key` header.

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::pipeline::decode::SseDecoder;
use crate::transport::HttpTransport;
use crate::types::{FinishReason, InlinePayload, Message, StreamChunk};
use crate::{Error, Result};

use super::{ChunkStream, DriverRequest, DriverResponse, ProviderDriver};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: &'a [String],
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<FinishReason>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlinePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Google Gemini driver over the REST API.
#[derive(Debug, Clone)]
pub struct GeminiDriver {
    provider_id: String,
    transport: HttpTransport,
}

impl GeminiDriver {
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            provider_id: "google".to_string(),
            transport,
        }
    }

    pub fn from_base_url(base_url: &str) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(base_url)?))
    }

    fn build_body(request: &DriverRequest) -> Result<Value> {
        let body = GenerateContentRequest {
            contents: &request.contents,
            generation_config: if request.response_modalities.is_empty() {
                None
            } else {
                Some(GenerationConfig {
                    response_modalities: &request.response_modalities,
                })
            },
        };
        Ok(serde_json::to_value(body)?)
    }

    /// Surface an in-band `{"error": {...}}` frame as a provider error.
    fn in_band_error(v: &Value) -> Option<Error> {
        let err = v.get("error")?;
        Some(Error::Provider {
            status: err
                .get("code")
                .and_then(Value::as_u64)
                .and_then(|c| u16::try_from(c).ok())
                .unwrap_or(500),
            reason: err
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            body: err
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string()),
        })
    }

    /// Reduce one streamed response to the fields the pipeline looks at.
    fn parse_chunk(v: Value) -> Result<StreamChunk> {
        if let Some(err) = Self::in_band_error(&v) {
            return Err(err);
        }

        let resp: GenerateContentResponse = serde_json::from_value(v)?;
        if let Some(reason) = resp
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            warn!(block_reason = reason, "prompt blocked by provider");
        }

        let Some(candidate) = resp.candidates.into_iter().next() else {
            return Ok(StreamChunk::default());
        };

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        let payload = parts.into_iter().find_map(|p| p.inline_data);

        Ok(StreamChunk {
            finish_reason: candidate.finish_reason,
            payload,
            text: if text.is_empty() { None } else { Some(text) },
        })
    }

    fn parse_response(v: Value) -> Result<DriverResponse> {
        if let Some(err) = Self::in_band_error(&v) {
            return Err(err);
        }
        let resp: GenerateContentResponse = serde_json::from_value(v)?;
        let Some(candidate) = resp.candidates.into_iter().next() else {
            return Ok(DriverResponse::default());
        };
        let text = candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text);
        Ok(DriverResponse {
            text,
            finish_reason: candidate.finish_reason,
        })
    }
}

#[async_trait]
impl ProviderDriver for GeminiDriver {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    async fn stream_generate(&self, request: DriverRequest) -> Result<ChunkStream> {
        let body = Self::build_body(&request)?;
        let path = format!(
            "/v1beta/models/{}:streamGenerateContent?alt=sse",
            request.model
        );
        let bytes = self
            .transport
            .post_stream(&path, &request.api_key, &body)
            .await?;

        let chunks = SseDecoder::new()
            .decode_stream(bytes)
            .map(|frame| frame.and_then(Self::parse_chunk));
        Ok(Box::pin(chunks))
    }

    async fn generate(&self, request: DriverRequest) -> Result<DriverResponse> {
        let body = Self::build_body(&request)?;
        let path = format!("/v1beta/models/{}:generateContent", request.model);
        let v = self
            .transport
            .post_json(&path, &request.api_key, &body)
            .await?;
        Self::parse_response(v)
    }
}
