use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "PORT", "candidates[0].content")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "gemini_stream")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the generation runtime.
///
/// These are internal failures. Before anything crosses the HTTP boundary it is
/// turned into a [`crate::classify::ClassifiedError`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    /// Non-success HTTP answer from the provider.
    #[error("got status: {status} {reason}. {body}")]
    Provider {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Malformed or interrupted provider stream.
    #[error("Stream error: {message}{}", format_context(.context))]
    Stream {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new stream error with structured context
    pub fn stream_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Stream {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::Validation { context, .. }
            | Error::Stream { context, .. } => Some(context),
            _ => None,
        }
    }

    /// The text handed to the provider-message classifier.
    ///
    /// Provider answers keep their status line and raw body so both the numeric
    /// status and the RPC status name are visible to pattern matching.
    pub fn provider_message(&self) -> String {
        match self {
            Error::Transport(e) => match e.status() {
                Some(status) => format!("got status: {} {}", status.as_u16(), e),
                None => e.to_string(),
            },
            other => other.to_string(),
        }
    }

    /// Walk the `source()` chain into a single line for logging.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        // Wrapping variants already print their direct source.
        let mut cur = std::error::Error::source(self).and_then(|s| s.source());
        while let Some(inner) = cur {
            out.push_str(": ");
            out.push_str(&inner.to_string());
            cur = inner.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_keeps_status_and_body() {
        let err = Error::Provider {
            status: 429,
            reason: "Too Many Requests".into(),
            body: r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#.into(),
        };
        let msg = err.provider_message();
        assert!(msg.starts_with("got status: 429 Too Many Requests."));
        assert!(msg.contains("RESOURCE_EXHAUSTED"));
    }

    #[test]
    fn context_is_rendered() {
        let err = Error::configuration_with_context(
            "PORT must be a number",
            ErrorContext::new()
                .with_field_path("PORT")
                .with_source("config_loader"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: PORT must be a number (field: PORT, source: config_loader)"
        );
        assert!(err.context().is_some());
    }
}
