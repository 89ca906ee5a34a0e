//! # image-forge
//!
//! Image generation and editing proxy in front of Google's Gemini image models.
//!
//! ## Overview
//!
//! A client posts a text instruction plus zero or more base64 images. The
//! server validates the request, streams a single multimodal generation call
//! to the provider and folds the chunks into either a list of output images or
//! exactly one classified, user-facing error.
//!
//! ## Core Philosophy
//!
//! - **Fail fast**: shape errors are rejected before any network activity
//! - **Stop early**: the first blocking finish reason ends stream consumption
//! - **One error shape**: every failure crossing the HTTP boundary is an
//!   [`ErrorBody`](classify::ErrorBody) with a machine code
//! - **Explicit configuration**: [`config::ServerConfig`] is threaded in, never read ambiently
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use image_forge::config::ServerConfig;
//! use image_forge::drivers::GeminiDriver;
//! use image_forge::pipeline::GenerationPipeline;
//! use image_forge::types::GenerationRequest;
//!
//! #[tokio::main]
//! async fn main() -> image_forge::Result<()> {
//!     let config = Arc::new(ServerConfig::from_env()?);
//!     let driver = Arc::new(GeminiDriver::from_base_url(&config.base_url)?);
//!     let pipeline = GenerationPipeline::new(config, driver);
//!
//!     match pipeline.generate(GenerationRequest::new("a watercolor cat")).await {
//!         Ok(outputs) => println!("{} image(s)", outputs.len()),
//!         Err(e) => eprintln!("{} ({})", e.message, e.code),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pipeline`] | Generation pipeline, prompt enhancement, SSE decoding |
//! | [`classify`] | Error classification into user-facing records |
//! | [`drivers`] | Provider driver trait and the Gemini driver |
//! | [`transport`] | Pooled HTTP transport to the provider |
//! | [`types`] | Requests, messages, stream chunks, outputs |
//! | [`validation`] | Request validation |
//! | [`server`] | axum HTTP surface |
//! | [`store`] | Draft and saved-prompt persistence |
//! | [`config`] | Environment-sourced server configuration |
//! | [`telemetry`] | Tracing setup and failure logging |

pub mod classify;
pub mod config;
pub mod drivers;
pub mod error_code;
pub mod pipeline;
pub mod server;
pub mod store;
pub mod telemetry;
pub mod transport;
pub mod types;
pub mod validation;

// Re-export main types for convenience
pub use classify::{ClassifiedError, ErrorBody};
pub use config::ServerConfig;
pub use error_code::ErrorCode;
pub use pipeline::{GenerationPipeline, PromptEnhancer};
pub use types::{
    events::{FinishReason, StreamChunk},
    output::OutputArtifact,
    request::{GenerationRequest, InlineAttachment},
};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A specialized Result for pipeline operations
pub type PipeResult<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `PipeResult<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = PipeResult<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
