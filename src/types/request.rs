//! Request-side types for the HTTP surface and the pipeline.

use serde::{Deserialize, Serialize};

/// A reference image uploaded by the browser client.
///
/// `id` is assigned client-side for UI identity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineAttachment {
    pub id: u64,
    pub base64: String,
    pub mime_type: String,
}

impl InlineAttachment {
    pub fn new(id: u64, base64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            id,
            base64: base64.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// One validated image generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub attachments: Vec<InlineAttachment>,
    /// Explicit model; falls back to the configured default.
    pub model: Option<String>,
    /// Explicit credential; falls back to the server-held key.
    pub api_key: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            attachments: Vec::new(),
            model: None,
            api_key: None,
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<InlineAttachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// `POST /api/enhance-prompt` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancePromptResponse {
    pub enhanced_prompt: String,
}
