//! Streaming decoder (Bytes -> JSON Value) for Server-Sent Events.
//!
//! Frames are split on a blank line, `data:` prefixes are stripped and every
//! data payload is parsed as one JSON document. Comment lines and `[DONE]`
//! sentinels are skipped.

use crate::{BoxStream, Error, ErrorContext, PipeResult};
use bytes::Bytes;
use futures::{stream, StreamExt};
use serde_json::Value;

const DONE_SIGNAL: &str = "[DONE]";

/// Incremental SSE decoder. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct SseDecoder;

impl SseDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Turn one frame into its JSON payload. `Ok(None)` for frames without data.
    fn parse_frame(frame: &str) -> PipeResult<Option<Value>> {
        let mut data = String::new();
        for line in frame.lines() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            if let Some(rest) = line.strip_prefix("data:") {
                if !data.is_empty() {
                    data.push('\n');
                }
                data.push_str(rest.strip_prefix(' ').unwrap_or(rest));
            }
        }

        let payload = data.trim();
        if payload.is_empty() || payload == DONE_SIGNAL {
            return Ok(None);
        }

        serde_json::from_str(payload).map(Some).map_err(|e| {
            Error::stream_with_context(
                format!("malformed stream frame: {}", e),
                ErrorContext::new().with_source("sse_decoder"),
            )
        })
    }

    pub fn decode_stream(
        &self,
        input: BoxStream<'static, Bytes>,
    ) -> BoxStream<'static, Value> {
        // Buffer raw bytes so multi-byte characters split across chunks survive.
        // `scan_from` marks where the next delimiter search starts.
        let stream = stream::unfold(
            Some((input, Vec::<u8>::new(), 0usize)),
            |state| async move {
                let (mut input, mut buf, mut scan_from) = state?;
                loop {
                    if let Some(pos) = find_frame_end(&buf[scan_from..]) {
                        let idx = scan_from + pos;
                        let frame = String::from_utf8_lossy(&buf[..idx]).into_owned();
                        buf.drain(..idx + 2);
                        scan_from = 0;
                        match Self::parse_frame(&frame) {
                            Ok(Some(v)) => return Some((Ok(v), Some((input, buf, scan_from)))),
                            Ok(None) => continue,
                            Err(e) => return Some((Err(e), None)),
                        }
                    }
                    // A trailing '\n' or '\r' may pair with the next chunk.
                    scan_from = buf.len().saturating_sub(1);

                    match input.next().await {
                        Some(Ok(bytes)) => {
                            buf.extend_from_slice(&bytes);
                            strip_carriage_returns(&mut buf, scan_from);
                        }
                        Some(Err(e)) => return Some((Err(e), None)),
                        None => {
                            // EOF: the last frame may lack its trailing blank line.
                            let frame = String::from_utf8_lossy(&buf).into_owned();
                            return match Self::parse_frame(&frame) {
                                Ok(Some(v)) => Some((Ok(v), None)),
                                Ok(None) => None,
                                Err(e) => Some((Err(e), None)),
                            };
                        }
                    }
                }
            },
        );

        Box::pin(stream)
    }
}

fn find_frame_end(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

/// Collapse `\r\n` to `\n` in `buf[from..]`.
fn strip_carriage_returns(buf: &mut Vec<u8>, from: usize) {
    if !buf[from..].contains(&b'\r') {
        return;
    }
    let mut out = Vec::with_capacity(buf.len());
    out.extend_from_slice(&buf[..from]);
    let tail = &buf[from..];
    for (i, b) in tail.iter().enumerate() {
        if *b == b'\r' && tail.get(i + 1) == Some(&b'\n') {
            continue;
        }
        out.push(*b);
    }
    *buf = out;
}
