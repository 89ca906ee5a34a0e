//! Gemini driver and pipeline against a mock Generative Language API.

use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use image_forge::config::ServerConfig;
use image_forge::drivers::{DriverRequest, GeminiDriver, ProviderDriver};
use image_forge::error_code::ErrorCode;
use image_forge::types::{GenerationRequest, InlineAttachment, Message};
use image_forge::{GenerationPipeline, PromptEnhancer};

const MODEL: &str = "gemini-2.5-flash-image-preview";

fn stream_path() -> String {
    format!("/v1beta/models/{}:streamGenerateContent", MODEL)
}

fn sse_body(frames: &[serde_json::Value]) -> String {
    frames
        .iter()
        .map(|f| format!("data: {}\r\n\r\n", f))
        .collect()
}

struct Fixture {
    server: ServerGuard,
    config: Arc<ServerConfig>,
    driver: Arc<GeminiDriver>,
}

impl Fixture {
    async fn new() -> Self {
        let server = Server::new_async().await;
        let config = Arc::new(
            ServerConfig::default()
                .with_api_key("test-key")
                .with_base_url(server.url()),
        );
        let driver = Arc::new(GeminiDriver::from_base_url(&config.base_url).unwrap());
        Self {
            server,
            config,
            driver,
        }
    }

    fn pipeline(&self) -> GenerationPipeline {
        GenerationPipeline::new(self.config.clone(), self.driver.clone())
    }

    fn enhancer(&self) -> PromptEnhancer {
        PromptEnhancer::new(self.config.clone(), self.driver.clone())
    }
}

#[tokio::test]
async fn streams_images_through_pipeline() {
    let mut fx = Fixture::new().await;
    let body = sse_body(&[
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": "Sure"}]}}]}),
        json!({"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "QUJD"}}]}}]}),
        json!({"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/jpeg", "data": "REVG"}}]}, "finishReason": "STOP"}]}),
    ]);
    let mock = fx
        .server
        .mock("POST", stream_path().as_str())
        .match_query(Matcher::UrlEncoded("alt".into(), "sse".into()))
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({
            "contents": [{"role": "user", "parts": [
                {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                {"text": "make it blue"}
            ]}],
            "generationConfig": {"responseModalities": ["IMAGE", "TEXT"]}
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let req = GenerationRequest::new("make it blue")
        .with_attachments(vec![InlineAttachment::new(1, "AAAA", "image/png")]);
    let outputs = fx.pipeline().generate(req).await.unwrap();

    mock.assert_async().await;
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].base64, "QUJD");
    assert!(outputs[0].filename.ends_with(".png"));
    assert_eq!(outputs[1].mime_type, "image/jpeg");
}

#[tokio::test]
async fn blocked_stream_is_classified() {
    let mut fx = Fixture::new().await;
    let body = sse_body(&[
        json!({"candidates": [{"finishReason": "PROHIBITED_CONTENT"}]}),
        json!({"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "QUJD"}}]}}]}),
    ]);
    fx.server
        .mock("POST", stream_path().as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let err = fx
        .pipeline()
        .generate(GenerationRequest::new("x"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ProhibitedContent);
    assert_eq!(err.status, 400);
}

#[tokio::test]
async fn text_only_stream_is_no_output() {
    let mut fx = Fixture::new().await;
    let body = sse_body(&[json!({
        "candidates": [{"content": {"parts": [{"text": "I cannot help"}]}, "finishReason": "STOP"}]
    })]);
    fx.server
        .mock("POST", stream_path().as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let err = fx
        .pipeline()
        .generate(GenerationRequest::new("x"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NoOutput);
}

#[tokio::test]
async fn http_errors_are_classified() {
    let cases = [
        (429, "RESOURCE_EXHAUSTED", ErrorCode::RateLimited, 429),
        (403, "PERMISSION_DENIED", ErrorCode::PermissionDenied, 403),
        (503, "UNAVAILABLE", ErrorCode::ServiceUnavailable, 503),
        (404, "NOT_FOUND", ErrorCode::NotFound, 404),
    ];

    for (status, rpc_status, code, http) in cases {
        let mut fx = Fixture::new().await;
        fx.server
            .mock("POST", stream_path().as_str())
            .match_query(Matcher::Any)
            .with_status(status)
            .with_body(
                json!({"error": {"code": status, "message": "nope", "status": rpc_status}})
                    .to_string(),
            )
            .create_async()
            .await;

        let err = fx
            .pipeline()
            .generate(GenerationRequest::new("x"))
            .await
            .unwrap_err();
        assert_eq!(err.code, code, "status {}", status);
        assert_eq!(err.status, http, "status {}", status);
    }
}

#[tokio::test]
async fn billing_error_is_region_billing_required() {
    let mut fx = Fixture::new().await;
    fx.server
        .mock("POST", stream_path().as_str())
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(
            json!({"error": {
                "code": 400,
                "message": "Image generation is not available in your country. Billing required.",
                "status": "FAILED_PRECONDITION"
            }})
            .to_string(),
        )
        .create_async()
        .await;

    let err = fx
        .pipeline()
        .generate(GenerationRequest::new("x"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RegionBillingRequired);
}

#[tokio::test]
async fn in_band_error_frame_is_classified() {
    let mut fx = Fixture::new().await;
    let body = sse_body(&[json!({
        "error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}
    })]);
    fx.server
        .mock("POST", stream_path().as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let err = fx
        .pipeline()
        .generate(GenerationRequest::new("x"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RateLimited);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn one_shot_generate_reads_first_text_part() {
    let mut fx = Fixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
        .match_header("x-goog-api-key", "k")
        .with_status(200)
        .with_body(
            json!({"candidates": [{"content": {"parts": [{"text": "hello"}, {"text": "ignored"}]}, "finishReason": "STOP"}]})
                .to_string(),
        )
        .create_async()
        .await;

    let resp = fx
        .driver
        .generate(DriverRequest::new("gemini-2.5-flash", "k", vec![Message::user("hi")]))
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(resp.text.as_deref(), Some("hello"));
}

#[tokio::test]
async fn enhancer_trims_and_sends_template() {
    let mut fx = Fixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::Regex("Original prompt: .*a cat".into()))
        .with_status(200)
        .with_body(
            json!({"candidates": [{"content": {"parts": [{"text": "  A fluffy cat at golden hour.\n"}]}}]})
                .to_string(),
        )
        .create_async()
        .await;

    let enhanced = fx.enhancer().enhance("a cat").await.unwrap();
    mock.assert_async().await;
    assert_eq!(enhanced, "A fluffy cat at golden hour.");
}

#[tokio::test]
async fn enhancer_empty_answer_fails() {
    let mut fx = Fixture::new().await;
    fx.server
        .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
        .with_status(200)
        .with_body(json!({"candidates": [{"content": {"parts": [{"text": "   "}]}}]}).to_string())
        .create_async()
        .await;

    let err = fx.enhancer().enhance("a cat").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::EnhancementFailed);
    assert_eq!(err.status, 500);
    assert_eq!(err.retryable, Some(true));
}

#[tokio::test]
async fn path_escaping_model_never_reaches_provider() {
    let mut fx = Fixture::new().await;
    let mock = fx
        .server
        .mock("POST", Matcher::Any)
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let err = fx
        .pipeline()
        .generate(GenerationRequest::new("x").with_model("../cachedContents?"))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidRequest);
    assert_eq!(err.status, 400);
    mock.assert_async().await;
}
