use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use std::env;
use std::time::Duration;

/// Header Google's Generative Language API reads the key from.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Thin reqwest wrapper. The connection pool lives in the inner client and is
/// shared by every request; no per-request state is kept here.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        // No overall request timeout: image streams can legitimately run long.
        let connect_timeout_secs = env::var("AI_HTTP_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .pool_max_idle_per_host(
                env::var("AI_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(32),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(
        &self,
        path: &str,
        api_key: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(Error::Provider {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }

    /// POST and hand back the raw body as a byte stream.
    ///
    /// Dropping the returned stream closes the connection.
    pub async fn post_stream(
        &self,
        path: &str,
        api_key: &str,
        body: &serde_json::Value,
    ) -> Result<BoxStream<'static, Bytes>> {
        let resp = self.post(path, api_key, body).await?;
        let byte_stream = resp.bytes_stream().map_err(Error::Transport);
        Ok(Box::pin(byte_stream))
    }

    pub async fn post_json(
        &self,
        path: &str,
        api_key: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let resp = self.post(path, api_key, body).await?;
        Ok(resp.json().await?)
    }
}
