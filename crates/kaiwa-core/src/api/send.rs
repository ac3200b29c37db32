//! Dispatching completion requests and folding responses into the
//! transcript.
//!
//! The streaming path appends an empty placeholder assistant entry up
//! front and rewrites it with the cumulative text as deltas arrive, so a
//! failed or interrupted stream leaves a visible (possibly empty) entry
//! rather than a torn log. The blocking path appends exactly one entry
//! after the whole body has been read.

use super::sink::{ResponseEvent, ResponseSink};
use super::stream::{SseDecoder, StreamEvent, Usage};
use crate::transcript::{EntryId, Transcript};
use futures_util::stream::StreamExt;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::io;

/// Safely extract the reply text from a complete (non-streamed) response.
/// Returns None if the response carries no usable first choice.
fn extract_message_content(json: &serde_json::Value) -> Option<&str> {
    json.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}

fn extract_usage(json: &serde_json::Value) -> Option<Usage> {
    json.get("usage")
        .filter(|u| !u.is_null())
        .and_then(|u| serde_json::from_value(u.clone()).ok())
}

/// POST the request and fail on any non-success status.
async fn post_completions(
    client: &Client,
    url: &str,
    token: &str,
    body: serde_json::Value,
) -> io::Result<reqwest::Response> {
    let response = client
        .post(url)
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .header(CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .send()
        .await
        .map_err(|e| io::Error::other(format!("Failed to send request: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(io::Error::other(format!("API error ({}): {}", status, body)));
    }

    Ok(response)
}

/// Fold one decoded event into the transcript, the accumulator, and the
/// sink. Returns true when the sentinel was reached.
fn apply_event<S: ResponseSink>(
    event: StreamEvent,
    transcript: &mut Transcript,
    entry: EntryId,
    assistant: &mut String,
    usage: &mut Option<Usage>,
    sink: &mut S,
) -> io::Result<bool> {
    match event {
        StreamEvent::Delta(delta) => {
            assistant.push_str(&delta);
            // The entry always holds the full text so far, not the delta
            transcript.set_content(entry, assistant);
            sink.handle(ResponseEvent::TextChunk(&delta))?;
            Ok(false)
        }
        StreamEvent::Usage(u) => {
            *usage = Some(u);
            Ok(false)
        }
        StreamEvent::Done => Ok(true),
    }
}

/// Send a streaming request and grow the placeholder assistant entry as
/// deltas arrive. Returns the last usage snapshot the stream carried.
pub async fn send_streaming<S: ResponseSink>(
    client: &Client,
    url: &str,
    token: &str,
    body: serde_json::Value,
    transcript: &mut Transcript,
    sink: &mut S,
) -> io::Result<Option<Usage>> {
    // Placeholder goes in before the request so a transport failure
    // leaves it visible and empty instead of vanishing mid-send
    let entry = transcript.begin_assistant();

    let response = post_completions(client, url, token, body).await?;

    let mut stream = response.bytes_stream();
    let mut decoder = SseDecoder::new();
    let mut assistant = String::new();
    let mut usage = None;

    'read: while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| io::Error::other(format!("Stream error: {}", e)))?;
        for event in decoder.push_chunk(&chunk) {
            if apply_event(event, transcript, entry, &mut assistant, &mut usage, sink)? {
                break 'read;
            }
        }
    }
    // Returns nothing if the sentinel already ended the stream
    for event in decoder.finish() {
        if apply_event(event, transcript, entry, &mut assistant, &mut usage, sink)? {
            break;
        }
    }

    sink.handle(ResponseEvent::Finished)?;
    Ok(usage)
}

/// Send a non-streaming request and append the complete reply as a
/// single assistant entry.
pub async fn send_blocking<S: ResponseSink>(
    client: &Client,
    url: &str,
    token: &str,
    body: serde_json::Value,
    transcript: &mut Transcript,
    sink: &mut S,
) -> io::Result<Option<Usage>> {
    let response = post_completions(client, url, token, body).await?;

    let json: serde_json::Value = response
        .json()
        .await
        .map_err(|e| io::Error::other(format!("Invalid response body: {}", e)))?;

    let content = extract_message_content(&json).unwrap_or("");
    transcript.push_assistant(content);
    sink.handle(ResponseEvent::TextChunk(content))?;
    sink.handle(ResponseEvent::Finished)?;

    Ok(extract_usage(&json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::sink::CollectingSink;
    use serde_json::json;

    #[test]
    fn extract_message_content_reads_first_choice() {
        let json = json!({
            "choices": [{"message": {"content": "reply"}}],
        });
        assert_eq!(extract_message_content(&json), Some("reply"));
    }

    #[test]
    fn extract_message_content_tolerates_malformed_shapes() {
        for json in [
            json!({}),
            json!({"choices": []}),
            json!({"choices": [{"message": {}}]}),
            json!({"choices": [{"message": {"content": 7}}]}),
        ] {
            assert_eq!(extract_message_content(&json), None);
        }
    }

    #[test]
    fn extract_usage_skips_null() {
        assert_eq!(extract_usage(&json!({"usage": null})), None);
        let usage = extract_usage(&json!({"usage": {"total_tokens": 4}})).unwrap();
        assert_eq!(usage.total_tokens, Some(4));
    }

    #[test]
    fn apply_event_grows_the_placeholder_cumulatively() {
        let mut transcript = crate::transcript::Transcript::new("sys");
        let entry = transcript.begin_assistant();
        let mut assistant = String::new();
        let mut usage = None;
        let mut sink = CollectingSink::new();

        for delta in ["Hel", "lo ", "world"] {
            let done = apply_event(
                StreamEvent::Delta(delta.to_string()),
                &mut transcript,
                entry,
                &mut assistant,
                &mut usage,
                &mut sink,
            )
            .unwrap();
            assert!(!done);
        }
        let done = apply_event(
            StreamEvent::Done,
            &mut transcript,
            entry,
            &mut assistant,
            &mut usage,
            &mut sink,
        )
        .unwrap();

        assert!(done);
        assert_eq!(transcript.messages()[1].content, "Hello world");
        assert_eq!(sink.text, "Hello world");
    }
}
