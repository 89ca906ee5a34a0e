//! Error responses and body extraction for the API routes.

use std::any::Any;

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::Value;

use crate::classify::ClassifiedError;
use crate::error_code::ErrorCode;
use crate::telemetry::log_error_response;

impl IntoResponse for ClassifiedError {
    fn into_response(self) -> Response {
        log_error_response(&self);
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_body())).into_response()
    }
}

/// Turn a handler panic into a plain `INTERNAL_ERROR` answer.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    let err = ClassifiedError::internal().with_phase("handler");
    tracing::error!(
        phase = "handler",
        code = %err.code,
        status = err.status,
        detail,
        "handler panicked"
    );
    err.mark_logged().into_response()
}

/// Request body parsed as untyped JSON.
///
/// Field-level checks happen in [`crate::validation`] so each shape problem
/// gets its own error code. An empty body reads as `{}`.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ClassifiedError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            let err = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ClassifiedError::new(ErrorCode::RequestTooLarge, "Request body is too large")
            } else {
                ClassifiedError::new(ErrorCode::InvalidJson, rejection.body_text())
                    .with_status(rejection.status().as_u16())
            };
            err.with_phase("parse-body")
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(Value::Object(Default::default())));
        }

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            tracing::debug!(error = %e, "rejecting unparsable body");
            ClassifiedError::new(ErrorCode::InvalidJson, "Invalid JSON in request body")
                .with_phase("parse-body")
        })
    }
}
