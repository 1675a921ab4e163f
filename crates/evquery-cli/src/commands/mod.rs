//! CLI command handlers

pub mod config;
pub mod convert;
pub mod search;
pub mod status;

use crate::live::DebugPrinter;
use anyhow::Result;
use evquery_core::{ChannelSink, LLMServiceConfig, QueryConverter};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Build a converter, wiring its debug events to stderr when requested.
///
/// The printer task ends once the converter (and with it the sink) is
/// dropped, so callers drop the converter before awaiting the handle.
pub(crate) fn build_converter(
    config: &LLMServiceConfig,
    debug: bool,
) -> Result<(QueryConverter, Option<JoinHandle<()>>)> {
    let converter = QueryConverter::from_config(config)?;
    if !debug {
        return Ok((converter, None));
    }

    let (sink, events) = ChannelSink::new();
    let printer = DebugPrinter::new().spawn(events);
    Ok((converter.with_debug_sink(Arc::new(sink)), Some(printer)))
}

pub(crate) async fn finish_printer(printer: Option<JoinHandle<()>>) {
    if let Some(handle) = printer {
        let _ = handle.await;
    }
}
