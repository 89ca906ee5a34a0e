//! Provider-message classification.
//!
//! Matching is on lower-cased substrings of the provider's error text, so it
//! depends on the wording the provider uses. Keep every pattern here; only add
//! one when a real provider error string calls for it.

use super::ClassifiedError;
use crate::error_code::ErrorCode;

struct Rule {
    /// Every group must match; a group matches when any of its needles occurs.
    groups: &'static [&'static [&'static str]],
    code: ErrorCode,
    status: u16,
    message: &'static str,
    suggestion: &'static str,
    retryable: Option<bool>,
}

const BAD_REQUEST: &[&str] = &["invalid_argument", "400"];

/// First match wins; order matters (billing before generic 400).
const RULES: &[Rule] = &[
    Rule {
        groups: &[BAD_REQUEST, &["failed_precondition", "billing"]],
        code: ErrorCode::RegionBillingRequired,
        status: 400,
        message: "API requires billing in your region. Enable billing in Google AI Studio.",
        suggestion: "Visit Google AI Studio to enable billing for your project.",
        retryable: None,
    },
    Rule {
        groups: &[BAD_REQUEST],
        code: ErrorCode::InvalidRequest,
        status: 400,
        message: "Invalid request. Please check your prompt and images.",
        suggestion: "Verify your prompt format and uploaded images.",
        retryable: None,
    },
    Rule {
        groups: &[&["permission_denied", "403"]],
        code: ErrorCode::PermissionDenied,
        status: 403,
        message: "Invalid API key or insufficient permissions.",
        suggestion: "Check your API key configuration.",
        retryable: None,
    },
    Rule {
        groups: &[&["not_found", "404"]],
        code: ErrorCode::NotFound,
        status: 404,
        message: "Resource not found. Please try again.",
        suggestion: "Verify the model name and all referenced files exist.",
        retryable: None,
    },
    Rule {
        groups: &[&["resource_exhausted", "429"]],
        code: ErrorCode::RateLimited,
        status: 429,
        message: "Rate limit exceeded. Please wait and try again.",
        suggestion: "Wait a moment before making another request.",
        retryable: Some(true),
    },
    Rule {
        groups: &[&["unavailable", "503"]],
        code: ErrorCode::ServiceUnavailable,
        status: 503,
        message: "Service temporarily unavailable.",
        suggestion: "Try again in a few moments or switch to a different model.",
        retryable: Some(true),
    },
    Rule {
        groups: &[&["deadline_exceeded", "504"]],
        code: ErrorCode::Timeout,
        status: 504,
        message: "Request timed out. Try a shorter prompt.",
        suggestion: "Reduce your prompt length or try again.",
        retryable: Some(true),
    },
    Rule {
        groups: &[&["internal", "500"]],
        code: ErrorCode::InternalError,
        status: 500,
        message: "Server error. Try reducing context or switching models.",
        suggestion: "Reduce input length or try a different model.",
        retryable: Some(true),
    },
];

impl Rule {
    fn matches(&self, haystack: &str) -> bool {
        self.groups
            .iter()
            .all(|group| group.iter().any(|needle| haystack.contains(needle)))
    }

    fn build(&self) -> ClassifiedError {
        let err = ClassifiedError::new(self.code, self.message)
            .with_status(self.status)
            .with_suggestion(self.suggestion);
        match self.retryable {
            Some(r) => err.with_retryable(r),
            None => err,
        }
    }
}

/// Classify a provider failure from its message text.
///
/// Total: anything unmatched becomes `UNKNOWN_ERROR`/500 carrying the original
/// message verbatim and no suggestion.
pub fn classify_provider_message(message: &str) -> ClassifiedError {
    let lowered = message.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(Rule::build)
        .unwrap_or_else(|| {
            ClassifiedError::new(ErrorCode::UnknownError, message).with_status(500)
        })
}
