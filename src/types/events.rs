//! Streamed provider chunks, reduced to what the generation pipeline inspects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Completion signal attached to a candidate.
///
/// `Stop` is the normal end of generation; every other value is a block or
/// truncation and ends the call with an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    ProhibitedContent,
    Other,
    /// Any provider value without a dedicated variant (e.g. `BLOCKLIST`, `IMAGE_SAFETY`).
    Unrecognized(String),
}

impl FinishReason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stop => "STOP",
            Self::MaxTokens => "MAX_TOKENS",
            Self::Safety => "SAFETY",
            Self::Recitation => "RECITATION",
            Self::ProhibitedContent => "PROHIBITED_CONTENT",
            Self::Other => "OTHER",
            Self::Unrecognized(s) => s,
        }
    }

    #[inline]
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

impl From<&str> for FinishReason {
    fn from(s: &str) -> Self {
        match s {
            "STOP" => Self::Stop,
            "MAX_TOKENS" => Self::MaxTokens,
            "SAFETY" => Self::Safety,
            "RECITATION" => Self::Recitation,
            "PROHIBITED_CONTENT" => Self::ProhibitedContent,
            "OTHER" => Self::Other,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FinishReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FinishReason {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(FinishReason::from(s.as_str()))
    }
}

/// Inline binary carried by a chunk. Either half may be absent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlinePayload {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

impl InlinePayload {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: Some(mime_type.into()),
            data: Some(data.into()),
        }
    }

    /// Both halves present and non-empty.
    pub fn complete(&self) -> Option<(&str, &str)> {
        match (self.mime_type.as_deref(), self.data.as_deref()) {
            (Some(m), Some(d)) if !m.is_empty() && !d.is_empty() => Some((m, d)),
            _ => None,
        }
    }
}

/// One chunk of a streamed generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamChunk {
    pub finish_reason: Option<FinishReason>,
    pub payload: Option<InlinePayload>,
    /// Text commentary; never part of the result.
    pub text: Option<String>,
}

impl StreamChunk {
    pub fn image(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            payload: Some(InlinePayload::new(mime_type, data)),
            ..Default::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn finished(reason: impl Into<FinishReason>) -> Self {
        Self {
            finish_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn with_finish_reason(mut self, reason: impl Into<FinishReason>) -> Self {
        self.finish_reason = Some(reason.into());
        self
    }

    /// The finish reason, if it is anything other than a normal stop.
    pub fn disruptive_signal(&self) -> Option<&FinishReason> {
        self.finish_reason.as_ref().filter(|r| !r.is_normal())
    }
}
