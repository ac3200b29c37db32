//! Response sink abstraction for decoupling the API from presentation.
//!
//! The send path emits events through the `ResponseSink` trait so the
//! core never knows whether it is driving a terminal, a collector in a
//! test, or an embedding application.

use std::io;

/// Events emitted while a completion is being received.
#[derive(Debug, Clone)]
pub enum ResponseEvent<'a> {
    /// A chunk of assistant text (one delta when streaming, the whole
    /// reply on the blocking path).
    TextChunk(&'a str),

    /// A diagnostic message.
    Diagnostic {
        message: String,
        /// If true, only show when verbose mode is enabled.
        verbose_only: bool,
    },

    /// The response has finished arriving.
    Finished,
}

/// Trait for handling response events.
///
/// Implementations own the presentation concerns (terminal streaming,
/// buffering for an embedder) while the send path stays agnostic.
pub trait ResponseSink {
    fn handle(&mut self, event: ResponseEvent<'_>) -> io::Result<()>;
}

/// A sink that collects the response for programmatic use.
///
/// Useful for testing or when the caller wants the full text without any
/// terminal output.
#[derive(Debug, Default)]
pub struct CollectingSink {
    /// Accumulated assistant text.
    pub text: String,
    /// Diagnostic messages emitted along the way.
    pub diagnostics: Vec<String>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseSink for CollectingSink {
    fn handle(&mut self, event: ResponseEvent<'_>) -> io::Result<()> {
        match event {
            ResponseEvent::TextChunk(chunk) => self.text.push_str(chunk),
            ResponseEvent::Diagnostic { message, .. } => self.diagnostics.push(message),
            ResponseEvent::Finished => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_accumulates_text() {
        let mut sink = CollectingSink::new();
        sink.handle(ResponseEvent::TextChunk("Hello ")).unwrap();
        sink.handle(ResponseEvent::TextChunk("World")).unwrap();
        sink.handle(ResponseEvent::Finished).unwrap();
        assert_eq!(sink.text, "Hello World");
    }

    #[test]
    fn collecting_sink_records_diagnostics() {
        let mut sink = CollectingSink::new();
        sink.handle(ResponseEvent::Diagnostic {
            message: "note".to_string(),
            verbose_only: true,
        })
        .unwrap();
        assert_eq!(sink.diagnostics, vec!["note"]);
    }
}
