//! Wire codec: structured messages in, structured messages or raw text out.
//!
//! `decode` is total — any payload that does not match the message schema
//! degrades to [`Decoded::Raw`] carrying the input verbatim. Raw payloads
//! are display-only: the engine never dedups, forwards, or dispatches them.

use crate::message::Message;

/// Result of decoding an inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A well-formed message — eligible for dedup, forwarding, delivery.
    Message(Message),
    /// Non-conforming input — show it, nothing else.
    Raw(String),
}

/// Serialize a message to its JSON wire form.
///
/// Deterministic: the same message always yields the same payload, so a
/// forwarded re-encode is byte-identical to the payload that arrived.
pub fn encode(message: &Message) -> String {
    serde_json::to_string(message).expect("Message serialization cannot fail")
}

/// Parse a payload, falling back to raw text on any mismatch.
pub fn decode(payload: &str) -> Decoded {
    match serde_json::from_str::<Message>(payload) {
        Ok(message) => Decoded::Message(message),
        Err(_) => Decoded::Raw(payload.to_string()),
    }
}
