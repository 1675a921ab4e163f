//! Live debug output on stderr

use evquery_core::{DebugEvent, DebugKind};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Prints debug events as they arrive. Stream fragments are written inline
/// so a model reply reads as it is generated.
pub struct DebugPrinter {
    stderr: StandardStream,
    mid_stream: bool,
}

impl DebugPrinter {
    pub fn new() -> Self {
        Self {
            stderr: StandardStream::stderr(ColorChoice::Auto),
            mid_stream: false,
        }
    }

    /// Drain `events` on a background task until every sender is gone
    pub fn spawn(mut self, mut events: UnboundedReceiver<DebugEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.print(&event);
            }
            self.finish();
        })
    }

    fn print(&mut self, event: &DebugEvent) {
        match event.kind {
            DebugKind::Stream => {
                let _ = write!(self.stderr, "{}", event.text);
                let _ = self.stderr.flush();
                self.mid_stream = true;
            }
            DebugKind::Info => {
                self.finish();
                let _ = self
                    .stderr
                    .set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
                let _ = writeln!(self.stderr, "[debug] {}", event.text);
                let _ = self.stderr.reset();
            }
            DebugKind::Error => {
                self.finish();
                let _ = self
                    .stderr
                    .set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
                let _ = writeln!(self.stderr, "[error] {}", event.text);
                let _ = self.stderr.reset();
            }
        }
    }

    fn finish(&mut self) {
        if self.mid_stream {
            let _ = writeln!(self.stderr);
            self.mid_stream = false;
        }
    }
}
