//! Provider call payload: one user message whose parts are the reference
//! images followed by the prompt text.

use serde::{Deserialize, Serialize};

use super::request::InlineAttachment;

/// A single conversation turn sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub parts: Vec<ContentPart>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            parts: vec![ContentPart::text(text)],
        }
    }

    /// Build the generation turn. Attachments come first, in order, and the
    /// prompt text is always the trailing part.
    pub fn user_with_attachments(attachments: &[InlineAttachment], prompt: &str) -> Self {
        let mut parts: Vec<ContentPart> = attachments
            .iter()
            .map(|a| ContentPart::inline(a.base64.clone(), a.mime_type.clone()))
            .collect();
        parts.push(ContentPart::text(prompt));
        Self {
            role: MessageRole::User,
            parts,
        }
    }

    pub fn contains_image(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, ContentPart::InlineData { .. }))
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
}

/// Content part (text or inline binary)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String, // base64 encoded
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn inline(data: String, mime_type: String) -> Self {
        ContentPart::InlineData {
            inline_data: InlineData { mime_type, data },
        }
    }
}
