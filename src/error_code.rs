//! Machine-readable error codes returned to the browser client.
//!
//! Every failure that leaves the server carries exactly one of these codes in
//! the `code` field of the error body. The set is closed: new provider message
//! shapes fall into [`ErrorCode::UnknownError`] until a real provider error
//! string justifies a dedicated variant.
//!
//! ## Categories
//!
//! | Category    | Origin                                            |
//! |-------------|---------------------------------------------------|
//! | validation  | request rejected before any provider call        |
//! | block       | finish reason signalled inside the stream        |
//! | provider    | transport / API failure classified from its text |
//! | result      | provider answered but produced nothing usable    |
//! | server      | boundary failures (bad JSON, oversize body, ...) |
//!
//! ## Example
//!
//! ```rust
//! use image_forge::error_code::ErrorCode;
//!
//! let code = ErrorCode::RateLimited;
//! assert_eq!(code.as_str(), "RATE_LIMITED");
//! assert_eq!(code.default_status(), 429);
//! assert_eq!(code.category(), "provider");
//! ```

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Prompt missing, not a string, or blank after trimming
    InvalidPrompt,
    /// Enhancement prompt longer than the allowed maximum
    PromptTooLong,
    /// `images` is not an array
    InvalidImages,
    /// An `images` element is not an object
    InvalidImageObject,
    /// Image id missing, zero, negative or not an integer
    InvalidImageId,
    /// Image base64 payload missing or empty
    InvalidImageBase64,
    /// Image mime type missing or not `image/*`
    InvalidImageMimeType,
    /// No credential supplied and none configured
    MissingApiKey,

    /// Finish reason PROHIBITED_CONTENT
    ProhibitedContent,
    /// Finish reason SAFETY
    SafetyBlocked,
    /// Finish reason RECITATION
    RecitationBlocked,
    /// Finish reason OTHER
    ContentBlocked,
    /// Finish reason MAX_TOKENS
    MaxTokens,
    /// Any other non-STOP finish reason
    UnknownBlock,

    RegionBillingRequired,
    InvalidRequest,
    PermissionDenied,
    NotFound,
    RateLimited,
    ServiceUnavailable,
    Timeout,
    InternalError,
    UnknownError,

    /// Stream finished without a single image payload
    NoOutput,
    /// Enhancement model answered with empty text
    EnhancementFailed,

    /// Request body is not valid JSON
    InvalidJson,
    /// Request body exceeds the configured limit
    RequestTooLarge,
}

impl ErrorCode {
    /// Returns the wire string (e.g., `"SAFETY_BLOCKED"`).
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidPrompt => "INVALID_PROMPT",
            Self::PromptTooLong => "PROMPT_TOO_LONG",
            Self::InvalidImages => "INVALID_IMAGES",
            Self::InvalidImageObject => "INVALID_IMAGE_OBJECT",
            Self::InvalidImageId => "INVALID_IMAGE_ID",
            Self::InvalidImageBase64 => "INVALID_IMAGE_BASE64",
            Self::InvalidImageMimeType => "INVALID_IMAGE_MIME_TYPE",
            Self::MissingApiKey => "MISSING_API_KEY",
            Self::ProhibitedContent => "PROHIBITED_CONTENT",
            Self::SafetyBlocked => "SAFETY_BLOCKED",
            Self::RecitationBlocked => "RECITATION_BLOCKED",
            Self::ContentBlocked => "CONTENT_BLOCKED",
            Self::MaxTokens => "MAX_TOKENS",
            Self::UnknownBlock => "UNKNOWN_BLOCK",
            Self::RegionBillingRequired => "REGION_BILLING_REQUIRED",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::RateLimited => "RATE_LIMITED",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
            Self::InternalError => "INTERNAL_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::NoOutput => "NO_OUTPUT",
            Self::EnhancementFailed => "ENHANCEMENT_FAILED",
            Self::InvalidJson => "INVALID_JSON",
            Self::RequestTooLarge => "REQUEST_TOO_LARGE",
        }
    }

    /// HTTP status this code is normally delivered with.
    #[inline]
    pub fn default_status(&self) -> u16 {
        match self {
            Self::PermissionDenied => 403,
            Self::NotFound => 404,
            Self::RequestTooLarge => 413,
            Self::RateLimited => 429,
            Self::InternalError | Self::UnknownError | Self::EnhancementFailed => 500,
            Self::ServiceUnavailable => 503,
            Self::Timeout => 504,
            _ => 400,
        }
    }

    /// Returns the category: `"validation"`, `"block"`, `"provider"`, `"result"` or `"server"`.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidPrompt
            | Self::PromptTooLong
            | Self::InvalidImages
            | Self::InvalidImageObject
            | Self::InvalidImageId
            | Self::InvalidImageBase64
            | Self::InvalidImageMimeType
            | Self::MissingApiKey => "validation",
            Self::ProhibitedContent
            | Self::SafetyBlocked
            | Self::RecitationBlocked
            | Self::ContentBlocked
            | Self::MaxTokens
            | Self::UnknownBlock => "block",
            Self::RegionBillingRequired
            | Self::InvalidRequest
            | Self::PermissionDenied
            | Self::NotFound
            | Self::RateLimited
            | Self::ServiceUnavailable
            | Self::Timeout
            | Self::InternalError
            | Self::UnknownError => "provider",
            Self::NoOutput | Self::EnhancementFailed => "result",
            Self::InvalidJson | Self::RequestTooLarge => "server",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_codes_are_bad_requests() {
        for code in [
            ErrorCode::InvalidPrompt,
            ErrorCode::InvalidImages,
            ErrorCode::InvalidImageObject,
            ErrorCode::InvalidImageId,
            ErrorCode::InvalidImageBase64,
            ErrorCode::InvalidImageMimeType,
            ErrorCode::MissingApiKey,
        ] {
            assert_eq!(code.default_status(), 400, "{code}");
            assert_eq!(code.category(), "validation");
        }
    }

    #[test]
    fn serializes_as_wire_string() {
        let v = serde_json::to_value(ErrorCode::RegionBillingRequired).unwrap();
        assert_eq!(v, serde_json::json!("REGION_BILLING_REQUIRED"));
    }
}
