//! # Generation Pipeline
//!
//! Orchestrates one image generation call and normalizes its result.
//!
//! ```text
//! GenerationRequest → validate → DriverRequest → provider stream
//!                                                   │
//!        ┌──────────────────────────────────────────┘
//!        ▼
//!   per chunk: non-STOP finish reason? ── yes ──▶ ClassifiedError (stop reading)
//!        │ no
//!        ▼
//!   complete inline payload? ── yes ──▶ push OutputArtifact
//!        │
//!   end of stream: no outputs ──▶ NO_OUTPUT, else outputs in arrival order
//! ```
//!
//! The terminal state of one invocation is either a non-empty output list or
//! exactly one [`ClassifiedError`], never both.
//!
//! ## Submodules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`decode`] | SSE byte stream decoder |
//! | [`enhance`] | One-shot prompt enhancement |

pub mod decode;
pub mod enhance;

pub use enhance::PromptEnhancer;

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tracing::{debug, info};

use crate::classify::{classify_finish_reason, ClassifiedError};
use crate::config::ServerConfig;
use crate::drivers::{DriverRequest, ProviderDriver};
use crate::telemetry::log_failure;
use crate::types::{GenerationRequest, Message, OutputArtifact};
use crate::validation::{check_generation_request, resolve_api_key};

/// Output modalities requested from the image model.
pub const RESPONSE_MODALITIES: &[&str] = &["IMAGE", "TEXT"];

/// Stateless per call: any number of `generate` futures may run concurrently.
#[derive(Debug, Clone)]
pub struct GenerationPipeline {
    config: Arc<ServerConfig>,
    driver: Arc<dyn ProviderDriver>,
}

impl GenerationPipeline {
    pub fn new(config: Arc<ServerConfig>, driver: Arc<dyn ProviderDriver>) -> Self {
        Self { config, driver }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Resolve model and credential and build the provider call.
    ///
    /// Fails with a validation error before any network activity.
    pub fn prepare(&self, request: &GenerationRequest) -> Result<DriverRequest, ClassifiedError> {
        check_generation_request(request)?;
        let api_key = resolve_api_key(request.api_key.as_deref(), self.config.api_key.as_deref())?;
        let model = request
            .model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.config.default_model);

        let message = Message::user_with_attachments(&request.attachments, &request.prompt);
        Ok(DriverRequest::new(model, api_key, vec![message])
            .with_response_modalities(RESPONSE_MODALITIES))
    }

    /// Run one generation.
    ///
    /// Stops reading at the first non-normal finish reason; outputs gathered
    /// before it are discarded. Dropping the returned future drops the provider
    /// stream and closes its connection.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<Vec<OutputArtifact>, ClassifiedError> {
        let call = self
            .prepare(&request)
            .map_err(|e| e.with_phase("validate-request"))?;
        let started = Instant::now();
        let model = call.model.clone();
        debug!(
            provider = self.driver.provider_id(),
            model = %model,
            attachments = request.attachments.len(),
            "starting generation"
        );

        let mut stream = self
            .driver
            .stream_generate(call)
            .await
            .map_err(|e| log_failure("generate-image", &e))?;

        let mut outputs: Vec<OutputArtifact> = Vec::new();
        let mut chunks = 0usize;
        while let Some(item) = stream.next().await {
            let chunk = item.map_err(|e| log_failure("generate-image", &e))?;
            chunks += 1;

            if let Some(reason) = chunk.disruptive_signal() {
                debug!(
                    model = %model,
                    finish_reason = %reason,
                    chunk = chunks,
                    discarded = outputs.len(),
                    "generation blocked"
                );
                return Err(classify_finish_reason(reason).with_phase("generate-image"));
            }

            if let Some((mime_type, data)) = chunk.payload.as_ref().and_then(|p| p.complete()) {
                let timestamp_ms = chrono::Utc::now().timestamp_millis();
                outputs.push(OutputArtifact::new(mime_type, data, timestamp_ms));
            }
        }

        if outputs.is_empty() {
            debug!(model = %model, chunks, "stream ended without output");
            return Err(ClassifiedError::no_output().with_phase("generate-image"));
        }

        info!(
            model = %model,
            outputs = outputs.len(),
            chunks,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generation complete"
        );
        Ok(outputs)
    }
}
