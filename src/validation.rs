//! Fail-fast request validation.
//!
//! Runs on the raw JSON body so that shape errors (wrong types, missing
//! fields) map to their dedicated codes instead of a generic parse failure.
//! Nothing here touches the network.

use serde_json::Value;

use crate::classify::ClassifiedError;
use crate::error_code::ErrorCode;
use crate::types::{GenerationRequest, InlineAttachment};

/// Maximum accepted length of a prompt sent for enhancement, in characters.
pub const MAX_ENHANCE_PROMPT_CHARS: usize = 2000;

fn invalid(code: ErrorCode, message: impl Into<String>) -> ClassifiedError {
    ClassifiedError::new(code, message).with_status(400)
}

/// Model ids are spliced into the provider URL path, so they must stay a
/// single segment: ASCII letters, digits, `.`, `-` and `_`, and not `.`/`..`.
pub fn is_valid_model_id(model: &str) -> bool {
    !model.is_empty()
        && model != "."
        && model != ".."
        && model
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'))
}

fn check_model(model: Option<&str>) -> Result<(), ClassifiedError> {
    match model {
        Some(m) if !m.is_empty() && !is_valid_model_id(m) => Err(invalid(
            ErrorCode::InvalidRequest,
            "Model must be a plain model id such as gemini-2.5-flash-image-preview",
        )),
        _ => Ok(()),
    }
}

fn require_prompt(body: &Value) -> Result<&str, ClassifiedError> {
    match body.get("prompt").and_then(Value::as_str) {
        Some(p) if !p.trim().is_empty() => Ok(p),
        _ => Err(invalid(
            ErrorCode::InvalidPrompt,
            "Prompt is required and must be a non-empty string",
        )),
    }
}

/// Optional string field; empty strings count as absent.
fn optional_string(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn validate_attachment(index: usize, img: &Value) -> Result<InlineAttachment, ClassifiedError> {
    let obj = img.as_object().ok_or_else(|| {
        invalid(
            ErrorCode::InvalidImageObject,
            format!("Image at index {} must be an object", index),
        )
    })?;

    let id = obj
        .get("id")
        .and_then(Value::as_u64)
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            invalid(
                ErrorCode::InvalidImageId,
                format!("Image at index {} must have a valid numeric id", index),
            )
        })?;

    let base64 = obj
        .get("base64")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            invalid(
                ErrorCode::InvalidImageBase64,
                format!("Image at index {} must have a valid base64 string", index),
            )
        })?;

    let mime_type = obj
        .get("mimeType")
        .and_then(Value::as_str)
        .filter(|m| m.starts_with("image/"))
        .ok_or_else(|| {
            invalid(
                ErrorCode::InvalidImageMimeType,
                format!("Image at index {} must have a valid image mime type", index),
            )
        })?;

    Ok(InlineAttachment::new(id, base64, mime_type))
}

/// Validate a `POST /api/generate` body.
///
/// Checks run in a fixed order: prompt, images container, then each image's
/// shape, id, base64 and mime type, then the optional model id. The first
/// violation is returned.
pub fn validate_generate_request(body: &Value) -> Result<GenerationRequest, ClassifiedError> {
    let prompt = require_prompt(body)?;

    let images = body
        .get("images")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(ErrorCode::InvalidImages, "Images must be an array"))?;

    let attachments = images
        .iter()
        .enumerate()
        .map(|(i, img)| validate_attachment(i, img))
        .collect::<Result<Vec<_>, _>>()?;

    let model = optional_string(body, "model");
    check_model(model.as_deref())?;

    Ok(GenerationRequest {
        prompt: prompt.to_string(),
        attachments,
        model,
        api_key: optional_string(body, "apiKey"),
    })
}

/// Re-check an already typed request, for callers that build
/// [`GenerationRequest`] directly instead of going through the HTTP body.
pub fn check_generation_request(request: &GenerationRequest) -> Result<(), ClassifiedError> {
    if request.prompt.trim().is_empty() {
        return Err(invalid(
            ErrorCode::InvalidPrompt,
            "Prompt is required and must be a non-empty string",
        ));
    }
    for (index, a) in request.attachments.iter().enumerate() {
        if a.id == 0 {
            return Err(invalid(
                ErrorCode::InvalidImageId,
                format!("Image at index {} must have a valid numeric id", index),
            ));
        }
        if a.base64.is_empty() {
            return Err(invalid(
                ErrorCode::InvalidImageBase64,
                format!("Image at index {} must have a valid base64 string", index),
            ));
        }
        if !a.mime_type.starts_with("image/") {
            return Err(invalid(
                ErrorCode::InvalidImageMimeType,
                format!("Image at index {} must have a valid image mime type", index),
            ));
        }
    }
    check_model(request.model.as_deref())
}

/// Validate a `POST /api/enhance-prompt` body and return the prompt.
pub fn validate_enhance_request(body: &Value) -> Result<String, ClassifiedError> {
    let prompt = require_prompt(body)?;
    if prompt.chars().count() > MAX_ENHANCE_PROMPT_CHARS {
        return Err(invalid(
            ErrorCode::PromptTooLong,
            format!(
                "Prompt is too long. Maximum {} characters allowed.",
                MAX_ENHANCE_PROMPT_CHARS
            ),
        ));
    }
    Ok(prompt.to_string())
}

/// Pick the explicit credential, else the configured one.
pub fn resolve_api_key(
    explicit: Option<&str>,
    configured: Option<&str>,
) -> Result<String, ClassifiedError> {
    explicit
        .filter(|k| !k.is_empty())
        .or(configured.filter(|k| !k.is_empty()))
        .map(str::to_string)
        .ok_or_else(|| {
            invalid(ErrorCode::MissingApiKey, "API key is required")
                .with_suggestion("Please provide a Google AI API key.")
        })
}
