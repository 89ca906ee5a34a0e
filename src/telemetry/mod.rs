//! Logging setup and structured failure reporting.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`init_tracing`] | Install the global subscriber (`RUST_LOG`, `LOG_FORMAT=json`) |
//! | [`log_failure`] | Log a provider failure with full context and classify it |
//! | [`log_error_response`] | Log an error record on its way out, unless already logged |
//!
//! Each failed request produces exactly one error log line carrying its `phase`.

use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use crate::classify::ClassifiedError;
use crate::Error;

const DEFAULT_FILTER: &str = "image_forge=info,tower_http=info";

/// Install the global tracing subscriber. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Log a failed provider call and turn it into its client-facing record.
///
/// `phase` names where the failure happened (e.g. `generate-image`). The
/// returned record is marked logged so the HTTP boundary stays quiet.
pub fn log_failure(phase: &'static str, err: &Error) -> ClassifiedError {
    let classified = ClassifiedError::from(err).with_phase(phase);
    error!(
        phase,
        code = %classified.code,
        status = classified.status,
        error = %err,
        chain = %err.chain(),
        context = ?err.context(),
        "provider call failed"
    );
    classified.mark_logged()
}

/// Log an error record on its way out.
pub fn log_error_response(err: &ClassifiedError) {
    if err.is_logged() {
        return;
    }
    warn!(
        phase = err.phase.unwrap_or("unknown"),
        code = %err.code,
        status = err.status,
        retryable = ?err.retryable,
        suggestion = ?err.suggestion,
        message = %err.message,
        "API error"
    );
}
