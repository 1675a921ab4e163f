//! Debug event delivery
//!
//! Conversion progress (status lines, streamed model fragments, recovered
//! failures) is reported as [`DebugEvent`]s to an optional [`DebugSink`].
//! Delivery is best-effort: a missing sink or a receiver that has gone away
//! never changes the outcome of a conversion.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Kind of debug event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugKind {
    Info,
    Stream,
    Error,
}

/// A single debug event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugEvent {
    #[serde(rename = "type")]
    pub kind: DebugKind,
    #[serde(rename = "content")]
    pub text: String,
}

impl DebugEvent {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: DebugKind::Info,
            text: text.into(),
        }
    }

    pub fn stream(text: impl Into<String>) -> Self {
        Self {
            kind: DebugKind::Stream,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: DebugKind::Error,
            text: text.into(),
        }
    }
}

/// Observer for debug events
pub trait DebugSink: Send + Sync {
    /// Deliver an event. Must not block and must not fail.
    fn send(&self, event: DebugEvent);
}

/// Sink forwarding events into an unbounded channel
///
/// Once the receiver is dropped, events are silently discarded.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<DebugEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver end it feeds
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DebugEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DebugSink for ChannelSink {
    fn send(&self, event: DebugEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Debug receiver closed, dropping event");
        }
    }
}

/// Sink writing events to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn send(&self, event: DebugEvent) {
        match event.kind {
            DebugKind::Info => tracing::info!(target: "evquery::debug", "{}", event.text),
            DebugKind::Stream => tracing::debug!(target: "evquery::debug", "{}", event.text),
            DebugKind::Error => tracing::warn!(target: "evquery::debug", "{}", event.text),
        }
    }
}

/// Per-call handle that only emits when debugging was requested and a sink exists
#[derive(Clone, Default)]
pub(crate) struct DebugEmitter {
    sink: Option<Arc<dyn DebugSink>>,
}

impl DebugEmitter {
    pub(crate) fn new(sink: Option<&Arc<dyn DebugSink>>, enabled: bool) -> Self {
        Self {
            sink: if enabled { sink.cloned() } else { None },
        }
    }

    pub(crate) fn emit(&self, event: DebugEvent) {
        if let Some(sink) = &self.sink {
            sink.send(event);
        }
    }

    pub(crate) fn info(&self, text: impl Into<String>) {
        self.emit(DebugEvent::info(text));
    }

    pub(crate) fn stream(&self, text: impl Into<String>) {
        self.emit(DebugEvent::stream(text));
    }

    pub(crate) fn error(&self, text: impl Into<String>) {
        self.emit(DebugEvent::error(text));
    }
}
