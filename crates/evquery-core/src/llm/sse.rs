//! Server-sent event decoding for streamed chat completions
//!
//! Turns the raw byte stream of an OpenAI-compatible `stream: true` response
//! into the ordered sequence of `choices[0].delta.content` fragments.

use super::FragmentStream;
use crate::error::{EvQueryError, Result};
use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use std::pin::Pin;

const DONE_MARKER: &str = "[DONE]";

struct SseState<S> {
    inner: Pin<Box<S>>,
    buffer: Vec<u8>,
    data_lines: Vec<String>,
    pending: VecDeque<Result<String>>,
    finished: bool,
}

impl<S> SseState<S> {
    /// Consume every complete line currently in the buffer
    fn drain_lines(&mut self) {
        while !self.finished {
            let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') else {
                break;
            };
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            self.handle_line(line.trim_end_matches(['\n', '\r']));
        }
    }

    fn handle_line(&mut self, line: &str) {
        if line.is_empty() {
            self.dispatch();
        } else if let Some(data) = line.strip_prefix("data:") {
            self.data_lines
                .push(data.strip_prefix(' ').unwrap_or(data).to_string());
        }
        // `event:`, `id:`, `retry:` and `:` comment lines carry nothing we need
    }

    /// Handle one complete event made of the collected data lines
    fn dispatch(&mut self) {
        if self.data_lines.is_empty() {
            return;
        }
        let data = self.data_lines.join("\n");
        self.data_lines.clear();

        if data.trim() == DONE_MARKER {
            self.finished = true;
            return;
        }

        match decode_chunk(&data) {
            Ok(Some(fragment)) => self.pending.push_back(Ok(fragment)),
            Ok(None) => {}
            Err(e) => {
                self.pending.push_back(Err(e));
                self.finished = true;
            }
        }
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            self.buffer.push(b'\n');
            self.drain_lines();
        }
        if !self.finished {
            self.dispatch();
        }
        self.finished = true;
    }
}

/// Extract the delta content of one streamed chunk
fn decode_chunk(data: &str) -> Result<Option<String>> {
    let chunk: Value = serde_json::from_str(data).map_err(|e| {
        EvQueryError::ModelRequestFailed(format!("Malformed stream chunk: {}", e))
    })?;

    if let Some(error) = chunk.get("error") {
        let message = error["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(EvQueryError::ModelRequestFailed(message));
    }

    Ok(chunk["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|content| !content.is_empty())
        .map(str::to_string))
}

/// Decode a chat-completion SSE byte stream into content fragments
pub fn decode_chat_stream<S, B, E>(bytes: S) -> FragmentStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<EvQueryError> + Send + 'static,
{
    let initial = SseState {
        inner: Box::pin(bytes),
        buffer: Vec::new(),
        data_lines: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(initial, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.inner.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.extend_from_slice(chunk.as_ref());
                    state.drain_lines();
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    if !state.buffer.is_empty() {
                        tracing::debug!("Stream ended without a trailing newline");
                    }
                    state.flush();
                }
            }
        }
    })
    .boxed()
}
