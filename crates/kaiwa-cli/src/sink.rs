//! Terminal response sink: deltas straight to stdout as they arrive.

use kaiwa_core::{ResponseEvent, ResponseSink};
use std::io::{self, Write};

use crate::output::OutputHandler;

pub struct CliResponseSink<'a> {
    output: &'a OutputHandler,
}

impl<'a> CliResponseSink<'a> {
    pub fn new(output: &'a OutputHandler) -> Self {
        Self { output }
    }
}

impl ResponseSink for CliResponseSink<'_> {
    fn handle(&mut self, event: ResponseEvent<'_>) -> io::Result<()> {
        match event {
            ResponseEvent::TextChunk(chunk) => {
                let mut stdout = io::stdout();
                stdout.write_all(chunk.as_bytes())?;
                stdout.flush()
            }
            ResponseEvent::Diagnostic {
                message,
                verbose_only,
            } => {
                if verbose_only {
                    self.output.diagnostic(&message);
                } else {
                    self.output.diagnostic_always(&message);
                }
                Ok(())
            }
            ResponseEvent::Finished => {
                // Streamed text rarely ends with a newline of its own
                let mut stdout = io::stdout();
                stdout.write_all(b"\n")?;
                stdout.flush()
            }
        }
    }
}
