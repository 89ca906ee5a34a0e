//! Generated output files returned to the client.

use serde::{Deserialize, Serialize};

/// Extension used when a media type has no known mapping.
pub const DEFAULT_EXTENSION: &str = "png";

/// One generated image, in the order the provider produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputArtifact {
    pub mime_type: String,
    pub base64: String,
    pub filename: String,
}

impl OutputArtifact {
    /// Build an artifact named `output-<millis>.<ext>`.
    pub fn new(mime_type: impl Into<String>, base64: impl Into<String>, timestamp_ms: i64) -> Self {
        let mime_type = mime_type.into();
        let filename = format!(
            "output-{}.{}",
            timestamp_ms,
            extension_for_media_type(&mime_type)
        );
        Self {
            mime_type,
            base64: base64.into(),
            filename,
        }
    }
}

/// `POST /api/generate` success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub outputs: Vec<OutputArtifact>,
}

/// Map a media type to a file extension, falling back to `png`.
pub fn extension_for_media_type(media_type: &str) -> String {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    let ext = match essence.as_str() {
        "image/png" => "png",
        "image/jpeg" => "jpeg",
        "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/heic" => "heic",
        "image/heif" => "heif",
        "image/avif" => "avif",
        "image/bmp" => "bmp",
        "image/tiff" => "tif",
        "image/svg+xml" => "svg",
        _ => {
            return mime_guess::get_mime_extensions_str(&essence)
                .and_then(|exts| exts.first())
                .map(|e| e.to_string())
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        }
    };
    ext.to_string()
}
