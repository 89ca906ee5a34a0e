//! Finish-reason classification (block path).

use super::ClassifiedError;
use crate::error_code::ErrorCode;
use crate::types::FinishReason;

/// Map a non-normal finish reason to its error record. All blocks are HTTP 400.
///
/// `STOP` is not an error and callers must not pass it here; if they do it is
/// reported like any other unexpected reason.
pub fn classify_finish_reason(reason: &FinishReason) -> ClassifiedError {
    match reason {
        FinishReason::ProhibitedContent => ClassifiedError::new(
            ErrorCode::ProhibitedContent,
            "Content policy violation. Your prompt or images contain prohibited content.",
        )
        .with_suggestion(
            "Please modify your prompt to avoid inappropriate, harmful, or policy-violating content.",
        )
        .with_retryable(false),
        FinishReason::Safety => ClassifiedError::new(
            ErrorCode::SafetyBlocked,
            "Content blocked by safety filters.",
        )
        .with_suggestion("Please revise your prompt to ensure it's safe and appropriate.")
        .with_retryable(false),
        FinishReason::Recitation => ClassifiedError::new(
            ErrorCode::RecitationBlocked,
            "Content blocked due to recitation concerns.",
        )
        .with_suggestion("Please use more original content in your prompt.")
        .with_retryable(false),
        FinishReason::Other => ClassifiedError::new(
            ErrorCode::ContentBlocked,
            "Content generation was blocked for an unspecified reason.",
        )
        .with_suggestion("Please try rephrasing your prompt or using different images.")
        .with_retryable(true),
        FinishReason::MaxTokens => ClassifiedError::new(
            ErrorCode::MaxTokens,
            "Response was truncated due to length limits.",
        )
        .with_suggestion("Try using a shorter prompt or fewer images.")
        .with_retryable(true),
        other => ClassifiedError::new(
            ErrorCode::UnknownBlock,
            format!("Content generation was blocked. Finish reason: {}", other),
        )
        .with_suggestion(
            "Please try rephrasing your prompt or using different images. Check the server logs for more details.",
        )
        .with_retryable(true),
    }
    .with_status(400)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_reason_keeps_raw_value_in_message() {
        let e = classify_finish_reason(&FinishReason::from("IMAGE_SAFETY"));
        assert_eq!(e.code, ErrorCode::UnknownBlock);
        assert!(e.message.ends_with("Finish reason: IMAGE_SAFETY"));
        assert_eq!(e.retryable, Some(true));
    }

    #[test]
    fn safety_is_not_retryable() {
        let e = classify_finish_reason(&FinishReason::Safety);
        assert_eq!((e.code, e.status, e.retryable), (ErrorCode::SafetyBlocked, 400, Some(false)));
    }
}
