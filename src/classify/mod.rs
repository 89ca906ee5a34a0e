//! Error normalization: every failure reaching the HTTP boundary becomes one
//! [`ClassifiedError`].
//!
//! Two classification paths exist:
//!
//! | Path | Input | Function |
//! |------|-------|----------|
//! | block | a non-`STOP` finish reason seen mid-stream | [`classify_finish_reason`] |
//! | provider | the text of a failed provider call | [`classify_provider_message`] |
//!
//! Validation failures and the empty-result case are built directly with
//! their own fixed codes and never go through either path.

mod finish;
mod provider;

pub use finish::classify_finish_reason;
pub use provider::classify_provider_message;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::error_code::ErrorCode;

/// A user-facing error record. Built once per failed invocation.
///
/// `phase` names where the failure originated (`validate-request`,
/// `generate-image`, ...). It is logged but never sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({code})")]
pub struct ClassifiedError {
    pub message: String,
    pub code: ErrorCode,
    pub status: u16,
    pub suggestion: Option<String>,
    pub retryable: Option<bool>,
    pub phase: Option<&'static str>,
    logged: bool,
}

impl ClassifiedError {
    /// New error delivered with the code's default HTTP status.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            status: code.default_status(),
            suggestion: None,
            retryable: None,
            phase: None,
            logged: false,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    /// Record the originating phase unless one is already set.
    pub fn with_phase(mut self, phase: &'static str) -> Self {
        self.phase.get_or_insert(phase);
        self
    }

    /// Mark the record as already logged with its full cause.
    pub(crate) fn mark_logged(mut self) -> Self {
        self.logged = true;
        self
    }

    pub fn is_logged(&self) -> bool {
        self.logged
    }

    /// `retryable` defaults to false when unset.
    pub fn is_retryable(&self) -> bool {
        self.retryable.unwrap_or(false)
    }

    /// Stream finished normally without a single image.
    pub fn no_output() -> Self {
        Self::new(
            ErrorCode::NoOutput,
            "No images were generated. The request may have been blocked or failed.",
        )
        .with_suggestion(
            "Try a different prompt or check if your content meets content policy guidelines.",
        )
        .with_retryable(true)
    }

    /// The enhancement model answered with empty text.
    pub fn enhancement_failed() -> Self {
        Self::new(
            ErrorCode::EnhancementFailed,
            "Failed to enhance prompt. Please try again.",
        )
        .with_suggestion("The AI service was unable to enhance your prompt.")
        .with_retryable(true)
    }

    /// Catch-all for failures that are neither provider nor validation errors.
    pub fn internal() -> Self {
        Self::new(ErrorCode::InternalError, "Internal server error")
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.message.clone(),
            code: self.code.as_str().to_string(),
            suggestion: self.suggestion.clone(),
            retryable: self.retryable,
        }
    }
}

impl From<&Error> for ClassifiedError {
    fn from(err: &Error) -> Self {
        classify_provider_message(&err.provider_message())
    }
}

impl From<Error> for ClassifiedError {
    fn from(err: Error) -> Self {
        ClassifiedError::from(&err)
    }
}

/// Wire shape of every non-2xx answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}
