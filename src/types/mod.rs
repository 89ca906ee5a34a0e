//! # Types Module
//!
//! Core data types shared by the HTTP surface, the generation pipeline and
//! the provider layer.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`GenerationRequest`] | Validated prompt + reference images for one call |
//! | [`InlineAttachment`] | A base64 reference image uploaded by the client |
//! | [`Message`] | Provider turn (attachments first, prompt text last) |
//! | [`StreamChunk`] | One streamed provider chunk (finish reason / inline payload) |
//! | [`FinishReason`] | Completion signal; anything but `STOP` is a block |
//! | [`OutputArtifact`] | A generated file returned to the client |
//!
//! ## Submodules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`request`] | Client-facing request types |
//! | [`message`] | Provider call content |
//! | [`events`] | Streamed chunk types |
//! | [`output`] | Generated artifacts and extension lookup |

pub mod events;
pub mod message;
pub mod output;
pub mod request;

pub use events::{FinishReason, InlinePayload, StreamChunk};
pub use message::{ContentPart, InlineData, Message, MessageRole};
pub use output::{extension_for_media_type, GenerateResponse, OutputArtifact};
pub use request::{EnhancePromptResponse, GenerationRequest, InlineAttachment};
