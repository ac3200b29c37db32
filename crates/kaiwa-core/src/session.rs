//! Session orchestration: one conversation against the gateway.

use crate::api::request::build_request_body;
use crate::api::send::{send_blocking, send_streaming};
use crate::api::sink::{ResponseEvent, ResponseSink};
use crate::api::stream::Usage;
use crate::auth::TokenProvider;
use crate::config::Config;
use crate::transcript::Transcript;
use std::io::{self, ErrorKind};

/// A chat session: the transcript, the selected model, the streaming
/// toggle, and the last usage snapshot.
///
/// `send` takes `&mut self`, so the borrow checker enforces the
/// one-in-flight-send-per-session rule the design relies on.
#[derive(Debug)]
pub struct Session {
    config: Config,
    transcript: Transcript,
    model: String,
    streaming: bool,
    usage: Option<Usage>,
    client: reqwest::Client,
}

impl Session {
    pub fn new(config: Config) -> io::Result<Self> {
        let model = config
            .models
            .first()
            .cloned()
            .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "No models configured"))?;
        let transcript = Transcript::new(config.system_prompt.clone());
        Ok(Self {
            transcript,
            model,
            streaming: config.stream,
            usage: None,
            client: reqwest::Client::new(),
            config,
        })
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn models(&self) -> &[String] {
        &self.config.models
    }

    pub fn streaming(&self) -> bool {
        self.streaming
    }

    pub fn set_streaming(&mut self, streaming: bool) {
        self.streaming = streaming;
    }

    pub fn usage(&self) -> Option<Usage> {
        self.usage
    }

    /// Switch to another configured model.
    pub fn select_model(&mut self, name: &str) -> io::Result<()> {
        if self.config.models.iter().any(|m| m == name) {
            self.model = name.to_string();
            Ok(())
        } else {
            Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "Unknown model '{}' (available: {})",
                    name,
                    self.config.models.join(", ")
                ),
            ))
        }
    }

    /// Start over: fresh system entry, usage cleared.
    pub fn reset(&mut self) {
        self.transcript.reset();
        self.usage = None;
    }

    /// Send one user message and fold the reply into the transcript.
    ///
    /// Empty (after trimming) input is a silent no-op. The user message
    /// is appended before the first suspension point, so it is in the
    /// log even when the send later fails; failures surface as a single
    /// error for the caller to report.
    pub async fn send<P: TokenProvider, S: ResponseSink>(
        &mut self,
        input: &str,
        provider: &P,
        sink: &mut S,
    ) -> io::Result<()> {
        if input.trim().is_empty() {
            return Ok(());
        }
        self.transcript.push_user(input);

        sink.handle(ResponseEvent::Diagnostic {
            message: format!(
                "[Sending {} message(s) to {} ({})]",
                self.transcript.len(),
                self.model,
                if self.streaming { "streaming" } else { "blocking" }
            ),
            verbose_only: true,
        })?;

        let url = self.config.api_url()?;
        let token = provider.access_token().await?;
        let body = build_request_body(
            &self.model,
            self.transcript.messages(),
            self.config.temperature,
            self.streaming,
        );

        let usage = if self.streaming {
            send_streaming(&self.client, &url, &token, body, &mut self.transcript, sink).await?
        } else {
            send_blocking(&self.client, &url, &token, body, &mut self.transcript, sink).await?
        };
        if let Some(usage) = usage {
            self.usage = Some(usage);
        }
        Ok(())
    }
}
