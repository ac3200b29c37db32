//! SSE stream decoding for chat-completion responses.
//!
//! The completion endpoint streams `data: <json>` lines terminated by a
//! `data: [DONE]` sentinel. Network chunks split those lines anywhere,
//! including inside a multi-byte character, so the decoder carries both
//! an undecoded byte tail and an unterminated line tail across chunks.
//! Malformed frames are dropped without aborting the stream.

use serde::{Deserialize, Serialize};

/// Token accounting reported by the API, when it reports any.
/// Later frames overwrite earlier ones wholesale; fields are not merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// One decoded unit of the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental text for the in-flight assistant message (may be empty).
    Delta(String),
    /// Usage snapshot carried by a frame.
    Usage(Usage),
    /// The `[DONE]` sentinel; nothing after it is processed.
    Done,
}

/// Push-based decoder: feed it raw byte chunks as they arrive, get back
/// the events each chunk completed. Call [`SseDecoder::finish`] when the
/// transport signals end-of-stream to flush an unterminated final line.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Bytes that ended mid-codepoint, waiting for the rest.
    bytes: Vec<u8>,
    /// Decoded text that ended mid-line, waiting for its newline.
    line: String,
    terminated: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk. Returns every event completed by it, in
    /// arrival order. After the sentinel has been seen all further input
    /// is ignored.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.terminated {
            return events;
        }

        self.bytes.extend_from_slice(chunk);
        let valid = match std::str::from_utf8(&self.bytes) {
            Ok(_) => self.bytes.len(),
            Err(e) => e.valid_up_to(),
        };
        // The prefix was just validated, so this is lossless
        let decoded = String::from_utf8_lossy(&self.bytes[..valid]).into_owned();
        self.bytes.drain(..valid);

        self.line.push_str(&decoded);
        self.drain_lines(&mut events);
        events
    }

    /// The transport reached end-of-stream: treat whatever is buffered as
    /// the final line (the stream closing is what terminates it).
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.terminated {
            return events;
        }

        if !self.bytes.is_empty() {
            // A torn trailing codepoint can never complete now; decoding
            // lossily turns it into a frame that fails to parse and drops
            let tail = String::from_utf8_lossy(&self.bytes).into_owned();
            self.bytes.clear();
            self.line.push_str(&tail);
        }

        self.drain_lines(&mut events);
        if !self.terminated && !self.line.is_empty() {
            let line = std::mem::take(&mut self.line);
            self.process_line(&line, &mut events);
        }
        self.terminated = true;
        events
    }

    fn drain_lines(&mut self, events: &mut Vec<StreamEvent>) {
        while let Some(pos) = self.line.find('\n') {
            let line: String = self.line.drain(..=pos).collect();
            self.process_line(&line, events);
            if self.terminated {
                self.line.clear();
                self.bytes.clear();
                return;
            }
        }
    }

    fn process_line(&mut self, line: &str, events: &mut Vec<StreamEvent>) {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return;
        }
        // Anything but an event-data line (comments, keep-alives, other
        // SSE fields) is skipped
        let Some(data) = line.strip_prefix("data: ") else {
            return;
        };
        let data = data.trim();

        if data == "[DONE]" {
            self.terminated = true;
            events.push(StreamEvent::Done);
            return;
        }

        // Malformed frames are dropped; the stream must keep going
        let Ok(json) = serde_json::from_str::<serde_json::Value>(data) else {
            return;
        };

        let delta = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("delta"))
            .and_then(|d| d.get("content"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        events.push(StreamEvent::Delta(delta.to_string()));

        if let Some(usage) = json.get("usage").filter(|u| !u.is_null())
            && let Ok(usage) = serde_json::from_value::<Usage>(usage.clone())
        {
            events.push(StreamEvent::Usage(usage));
        }
    }
}
