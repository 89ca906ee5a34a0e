//! Generation pipeline against an in-process stub provider.

mod common;

use common::{config_with_key, config_without_key, Script, StubDriver};
use image_forge::error_code::ErrorCode;
use image_forge::types::{ContentPart, GenerationRequest, InlineAttachment, StreamChunk};
use image_forge::GenerationPipeline;
use regex::Regex;

fn filename_pattern() -> Regex {
    Regex::new(r"^output-\d{13}\.[a-z0-9]+$").unwrap()
}

#[tokio::test]
async fn returns_every_payload_in_arrival_order() {
    let driver = StubDriver::chunks(vec![
        StreamChunk::text("thinking"),
        StreamChunk::image("image/png", "AAAA"),
        StreamChunk::default(),
        StreamChunk::image("image/jpeg", "BBBB"),
        StreamChunk::image("image/webp", "CCCC").with_finish_reason("STOP"),
    ]);
    let pipeline = GenerationPipeline::new(config_with_key(), driver.clone());

    let outputs = pipeline.generate(GenerationRequest::new("a cat")).await.unwrap();

    let data: Vec<_> = outputs.iter().map(|o| o.base64.as_str()).collect();
    assert_eq!(data, ["AAAA", "BBBB", "CCCC"]);
    let pattern = filename_pattern();
    for o in &outputs {
        assert!(pattern.is_match(&o.filename), "bad filename {}", o.filename);
    }
    assert!(outputs[0].filename.ends_with(".png"));
    assert!(outputs[1].filename.ends_with(".jpeg"));
    assert!(outputs[2].filename.ends_with(".webp"));
    assert_eq!(driver.stream_calls(), 1);
}

#[tokio::test]
async fn incomplete_payloads_are_skipped() {
    let driver = StubDriver::chunks(vec![
        StreamChunk::image("", "AAAA"),
        StreamChunk::image("image/png", ""),
        StreamChunk::image("image/png", "QUJD"),
    ]);
    let pipeline = GenerationPipeline::new(config_with_key(), driver);
    let outputs = pipeline.generate(GenerationRequest::new("x")).await.unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].base64, "QUJD");
}

#[tokio::test]
async fn first_disruptive_signal_wins_and_discards_outputs() {
    let driver = StubDriver::chunks(vec![
        StreamChunk::image("image/png", "AAAA"),
        StreamChunk::finished("SAFETY"),
        StreamChunk::image("image/png", "BBBB"),
        StreamChunk::finished("PROHIBITED_CONTENT"),
    ]);
    let pipeline = GenerationPipeline::new(config_with_key(), driver.clone());

    let err = pipeline.generate(GenerationRequest::new("x")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::SafetyBlocked);
    assert_eq!(err.status, 400);
    assert_eq!(err.retryable, Some(false));
    assert_eq!(driver.pulled(), 2, "chunks after the block must not be read");
    assert_eq!(err.phase, Some("generate-image"));
}

#[tokio::test]
async fn block_on_first_chunk_stops_reading() {
    let driver = StubDriver::chunks(vec![
        StreamChunk::finished("SAFETY"),
        StreamChunk::image("image/png", "AAAA"),
        StreamChunk::image("image/png", "BBBB"),
    ]);
    let pipeline = GenerationPipeline::new(config_with_key(), driver.clone());

    let err = pipeline.generate(GenerationRequest::new("x")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::SafetyBlocked);
    assert_eq!(driver.pulled(), 1);
}

#[tokio::test]
async fn payload_on_blocking_chunk_is_not_kept() {
    let driver = StubDriver::chunks(vec![
        StreamChunk::image("image/png", "AAAA").with_finish_reason("MAX_TOKENS"),
    ]);
    let pipeline = GenerationPipeline::new(config_with_key(), driver);
    let err = pipeline.generate(GenerationRequest::new("x")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::MaxTokens);
    assert_eq!(err.retryable, Some(true));
}

#[tokio::test]
async fn unrecognized_finish_reason_is_unknown_block() {
    let driver = StubDriver::chunks(vec![StreamChunk::finished("IMAGE_SAFETY")]);
    let pipeline = GenerationPipeline::new(config_with_key(), driver);
    let err = pipeline.generate(GenerationRequest::new("x")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownBlock);
    assert!(err.message.contains("IMAGE_SAFETY"));
}

#[tokio::test]
async fn empty_stream_is_no_output() {
    let driver = StubDriver::chunks(vec![
        StreamChunk::text("I can't draw that"),
        StreamChunk::finished("STOP"),
    ]);
    let pipeline = GenerationPipeline::new(config_with_key(), driver);

    let err = pipeline.generate(GenerationRequest::new("x")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NoOutput);
    assert_eq!(err.status, 400);
    assert_eq!(err.retryable, Some(true));
}

#[tokio::test]
async fn invalid_attachment_never_reaches_provider() {
    let driver = StubDriver::chunks(vec![StreamChunk::image("image/png", "QUJD")]);
    let pipeline = GenerationPipeline::new(config_with_key(), driver.clone());
    let req = GenerationRequest::new("x")
        .with_attachments(vec![InlineAttachment::new(1, "QUJD", "text/plain")]);

    let err = pipeline.generate(req).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidImageMimeType);
    assert_eq!(err.status, 400);
    assert_eq!(driver.stream_calls(), 0);
}

#[tokio::test]
async fn missing_credential_never_reaches_provider() {
    let driver = StubDriver::chunks(vec![StreamChunk::image("image/png", "QUJD")]);
    let pipeline = GenerationPipeline::new(config_without_key(), driver.clone());

    let err = pipeline.generate(GenerationRequest::new("x")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingApiKey);
    assert_eq!(err.phase, Some("validate-request"));
    assert_eq!(driver.stream_calls(), 0);

    // A caller-supplied key is enough.
    let outputs = pipeline
        .generate(GenerationRequest::new("x").with_api_key("user-key"))
        .await
        .unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(driver.last_request().unwrap().api_key, "user-key");
}

#[tokio::test]
async fn single_chunk_scenario() {
    let driver = StubDriver::chunks(vec![
        StreamChunk::image("image/png", "QUJD").with_finish_reason("STOP"),
    ]);
    let pipeline = GenerationPipeline::new(config_with_key(), driver.clone());

    let outputs = pipeline.generate(GenerationRequest::new("a cat")).await.unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].mime_type, "image/png");
    assert_eq!(outputs[0].base64, "QUJD");
    assert!(filename_pattern().is_match(&outputs[0].filename));

    let call = driver.last_request().unwrap();
    assert_eq!(call.api_key, "server-key");
    assert_eq!(call.model, "gemini-2.5-flash-image-preview");
    assert_eq!(call.response_modalities, ["IMAGE", "TEXT"]);
}

#[tokio::test]
async fn attachments_precede_prompt_and_model_override_applies() {
    let driver = StubDriver::chunks(vec![StreamChunk::image("image/png", "QUJD")]);
    let pipeline = GenerationPipeline::new(config_with_key(), driver.clone());
    let req = GenerationRequest::new("make it blue")
        .with_model("gemini-custom")
        .with_attachments(vec![
            InlineAttachment::new(1, "AAAA", "image/png"),
            InlineAttachment::new(2, "BBBB", "image/jpeg"),
        ]);

    pipeline.generate(req).await.unwrap();

    let call = driver.last_request().unwrap();
    assert_eq!(call.model, "gemini-custom");
    let parts = &call.contents[0].parts;
    assert_eq!(parts.len(), 3);
    assert!(matches!(&parts[0], ContentPart::InlineData { inline_data } if inline_data.data == "AAAA"));
    assert!(matches!(&parts[1], ContentPart::InlineData { inline_data } if inline_data.mime_type == "image/jpeg"));
    assert!(matches!(&parts[2], ContentPart::Text { text } if text == "make it blue"));
}

#[tokio::test]
async fn repeated_runs_are_identical_modulo_filename() {
    let chunks = vec![
        StreamChunk::image("image/png", "AAAA"),
        StreamChunk::image("image/gif", "BBBB"),
    ];
    let driver = StubDriver::chunks(chunks);
    let pipeline = GenerationPipeline::new(config_with_key(), driver.clone());

    let strip = |outputs: Vec<image_forge::OutputArtifact>| {
        outputs
            .into_iter()
            .map(|o| (o.mime_type, o.base64))
            .collect::<Vec<_>>()
    };
    let first = strip(pipeline.generate(GenerationRequest::new("x")).await.unwrap());
    let second = strip(pipeline.generate(GenerationRequest::new("x")).await.unwrap());
    assert_eq!(first, second);
    assert_eq!(driver.stream_calls(), 2);
}

#[tokio::test]
async fn provider_failure_before_stream_is_classified() {
    let driver = StubDriver::new(Script::Reject("429 RESOURCE_EXHAUSTED: quota".into()));
    let pipeline = GenerationPipeline::new(config_with_key(), driver);

    let err = pipeline.generate(GenerationRequest::new("x")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RateLimited);
    assert_eq!(err.status, 429);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn mid_stream_failure_discards_partial_outputs() {
    let driver = StubDriver::new(Script::ChunksThenError(
        vec![StreamChunk::image("image/png", "AAAA")],
        "UNAVAILABLE: model overloaded".into(),
    ));
    let pipeline = GenerationPipeline::new(config_with_key(), driver);

    let err = pipeline.generate(GenerationRequest::new("x")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ServiceUnavailable);
    assert_eq!(err.status, 503);
}

#[tokio::test]
async fn concurrent_invocations_do_not_interfere() {
    let driver = StubDriver::chunks(vec![StreamChunk::image("image/png", "QUJD")]);
    let pipeline = GenerationPipeline::new(config_with_key(), driver.clone());

    let runs = (0..8).map(|i| {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.generate(GenerationRequest::new(format!("p{i}"))).await })
    });
    for handle in futures::future::join_all(runs).await {
        assert_eq!(handle.unwrap().unwrap().len(), 1);
    }
    assert_eq!(driver.stream_calls(), 8);
}
