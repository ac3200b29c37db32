//! Completion request building.

use crate::transcript::Message;
use serde_json::json;

/// Build the JSON body for a chat-completion request.
///
/// Pure transformation: every message's role and content is copied
/// verbatim, in conversation order. Input validation happens before this
/// stage; the body is never mutated after construction.
pub fn build_request_body(
    model: &str,
    messages: &[Message],
    temperature: f64,
    stream: bool,
) -> serde_json::Value {
    let messages: Vec<serde_json::Value> = messages
        .iter()
        .map(|m| {
            json!({
                "role": m.role,
                "content": m.content,
            })
        })
        .collect();

    json!({
        "model": model,
        "messages": messages,
        "temperature": temperature,
        "stream": stream,
    })
}
