//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::{stream, StreamExt};

use image_forge::config::ServerConfig;
use image_forge::drivers::{ChunkStream, DriverRequest, DriverResponse, ProviderDriver};
use image_forge::types::StreamChunk;
use image_forge::{Error, ErrorContext, PipeResult, Result};

/// What the stub does when the streaming capability is invoked.
#[derive(Debug, Clone)]
pub enum Script {
    Chunks(Vec<StreamChunk>),
    /// Chunks followed by a mid-stream failure.
    ChunksThenError(Vec<StreamChunk>, String),
    /// Failure before the first chunk.
    Reject(String),
}

/// In-process provider that replays a script and counts calls.
#[derive(Debug)]
pub struct StubDriver {
    script: Script,
    text: Option<String>,
    stream_calls: AtomicUsize,
    generate_calls: AtomicUsize,
    /// Stream items handed to the consumer so far.
    pulled: Arc<AtomicUsize>,
    last_request: Mutex<Option<DriverRequest>>,
}

impl StubDriver {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            text: None,
            stream_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            pulled: Arc::new(AtomicUsize::new(0)),
            last_request: Mutex::new(None),
        })
    }

    pub fn chunks(chunks: Vec<StreamChunk>) -> Arc<Self> {
        Self::new(Script::Chunks(chunks))
    }

    /// Stub whose one-shot capability answers with `text`.
    pub fn text(text: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            script: Script::Chunks(Vec::new()),
            text: text.map(str::to_string),
            stream_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            pulled: Arc::new(AtomicUsize::new(0)),
            last_request: Mutex::new(None),
        })
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<DriverRequest> {
        self.last_request.lock().unwrap().clone()
    }

    fn provider_error(message: &str) -> Error {
        Error::stream_with_context(message, ErrorContext::new())
    }
}

#[async_trait]
impl ProviderDriver for StubDriver {
    fn provider_id(&self) -> &str {
        "stub"
    }

    async fn stream_generate(&self, request: DriverRequest) -> Result<ChunkStream> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);

        let items: Vec<PipeResult<StreamChunk>> = match self.script.clone() {
            Script::Chunks(chunks) => chunks.into_iter().map(Ok).collect(),
            Script::ChunksThenError(chunks, msg) => chunks
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(Self::provider_error(&msg))))
                .collect(),
            Script::Reject(msg) => return Err(Self::provider_error(&msg)),
        };
        let pulled = self.pulled.clone();
        Ok(Box::pin(stream::iter(items).inspect(move |_| {
            pulled.fetch_add(1, Ordering::SeqCst);
        })))
    }

    async fn generate(&self, request: DriverRequest) -> Result<DriverResponse> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        if let Script::Reject(msg) = &self.script {
            return Err(Self::provider_error(msg));
        }
        Ok(DriverResponse {
            text: self.text.clone(),
            finish_reason: None,
        })
    }
}

pub fn config_with_key() -> Arc<ServerConfig> {
    Arc::new(ServerConfig::default().with_api_key("server-key"))
}

pub fn config_without_key() -> Arc<ServerConfig> {
    Arc::new(ServerConfig::default())
}
