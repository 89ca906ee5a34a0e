//! Prompt enhancement: wrap the user's prompt in the configured instruction
//! template and ask the text model for a richer version.

use std::sync::Arc;

use tracing::info;

use crate::classify::ClassifiedError;
use crate::config::ServerConfig;
use crate::drivers::{DriverRequest, ProviderDriver};
use crate::telemetry::log_failure;
use crate::types::Message;
use crate::validation::resolve_api_key;

#[derive(Debug, Clone)]
pub struct PromptEnhancer {
    config: Arc<ServerConfig>,
    driver: Arc<dyn ProviderDriver>,
}

impl PromptEnhancer {
    pub fn new(config: Arc<ServerConfig>, driver: Arc<dyn ProviderDriver>) -> Self {
        Self { config, driver }
    }

    /// Enhance `prompt` using the server credential only.
    pub async fn enhance(&self, prompt: &str) -> Result<String, ClassifiedError> {
        let api_key = resolve_api_key(None, self.config.api_key.as_deref())
            .map_err(|e| {
                e.with_suggestion("Server configuration missing Google API key.")
                    .with_phase("validate-request")
            })?;

        let request = DriverRequest::new(
            self.config.enhancement_model.clone(),
            api_key,
            vec![Message::user(self.config.render_enhancement_prompt(prompt))],
        );

        let response = self
            .driver
            .generate(request)
            .await
            .map_err(|e| log_failure("enhance-prompt", &e))?;

        let enhanced = response
            .text
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if enhanced.is_empty() {
            return Err(ClassifiedError::enhancement_failed().with_phase("enhance-prompt"));
        }

        info!(
            model = %self.config.enhancement_model,
            input_chars = prompt.chars().count(),
            output_chars = enhanced.chars().count(),
            "prompt enhanced"
        );
        Ok(enhanced.to_string())
    }
}
