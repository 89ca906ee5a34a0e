//! Server configuration.
//!
//! Loaded once at startup and passed by value (or `Arc`) into the pipeline and
//! the HTTP layer; nothing reads the environment after that.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, ErrorContext, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_ENHANCEMENT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(120_000);

/// Placeholder substituted with the user's prompt.
pub const PROMPT_PLACEHOLDER: &str = "{prompt}";

pub const DEFAULT_ENHANCEMENT_TEMPLATE: &str = r#"You are an expert at writing detailed, creative prompts for AI image editing.

Take this user prompt and enhance it by:
* Adding specific visual details (lighting, composition, style, colors)
* Making it more descriptive
* Keep it concise but detailed (aim for 1-3 sentences)
* Make it safer for a LLM

Original prompt: "{prompt}"

Enhanced prompt:"#;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Server-held credential used when a request carries none.
    pub api_key: Option<String>,
    pub default_model: String,
    pub enhancement_model: String,
    pub enhancement_template: String,
    pub base_url: String,
    /// Nominal only; the pipeline does not enforce it.
    pub request_timeout: Duration,
    pub max_request_bytes: usize,
    /// Built client to serve for non-API routes.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            api_key: None,
            default_model: DEFAULT_MODEL.to_string(),
            enhancement_model: DEFAULT_ENHANCEMENT_MODEL.to_string(),
            enhancement_template: DEFAULT_ENHANCEMENT_TEMPLATE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load from the process environment, after reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset and empty values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let enhancement_template = get("PROMPT_ENHANCEMENT_TEMPLATE")
            .unwrap_or(defaults.enhancement_template);
        if !enhancement_template.contains(PROMPT_PLACEHOLDER) {
            return Err(Error::configuration_with_context(
                "enhancement template must contain the {prompt} placeholder",
                ErrorContext::new()
                    .with_field_path("PROMPT_ENHANCEMENT_TEMPLATE")
                    .with_source("config_loader"),
            ));
        }

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_var(&get, "PORT")?.unwrap_or(defaults.port),
            api_key: get("GOOGLE_API_KEY"),
            default_model: get("DEFAULT_MODEL").unwrap_or(defaults.default_model),
            enhancement_model: get("PROMPT_ENHANCEMENT_MODEL")
                .unwrap_or(defaults.enhancement_model),
            enhancement_template,
            base_url: get("GEMINI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            request_timeout: parse_var::<u64, _>(&get, "REQUEST_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            max_request_bytes: parse_var(&get, "MAX_REQUEST_BYTES")?
                .unwrap_or(defaults.max_request_bytes),
            static_dir: get("STATIC_DIR").map(PathBuf::from),
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_enhancement_template(mut self, template: impl Into<String>) -> Self {
        self.enhancement_template = template.into();
        self
    }

    pub fn with_max_request_bytes(mut self, limit: usize) -> Self {
        self.max_request_bytes = limit;
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Substitute the prompt into the enhancement template, verbatim.
    pub fn render_enhancement_prompt(&self, prompt: &str) -> String {
        self.enhancement_template.replace(PROMPT_PLACEHOLDER, prompt)
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            Error::configuration_with_context(
                format!("{} must be a number", key),
                ErrorContext::new()
                    .with_field_path(key)
                    .with_details(format!("{:?}: {}", raw, e))
                    .with_source("config_loader"),
            )
        }),
    }
}
