use serde::{Deserialize, Serialize};

/// A chat message — the unit of gossip on the mesh.
///
/// Wire format is JSON (self-delimiting, human-inspectable):
/// `{"id": ..., "from": ..., "type": "chat"|"direct"|"room",
///   "to"?: ..., "room"?: ..., "text": ...}`.
///
/// The `id` is minted once at origination and never mutated while the
/// message propagates; it is the dedup key for the whole mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID v4). Empty when the wire payload
    /// carried none — such messages are dropped by the engine.
    #[serde(default)]
    pub id: String,
    /// Sender display name. Unauthenticated, display-only.
    pub from: String,
    /// Addressing scope, tagged as `type` on the wire.
    #[serde(flatten)]
    pub scope: Scope,
    /// Message body.
    pub text: String,
}

/// Addressing scope of a message.
///
/// A closed set: the delivery filter matches it exhaustively, so adding a
/// scope is a compile-time-checked change. An unrecognized `type` tag on
/// the wire fails structured decode and degrades to the raw-text path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Scope {
    /// Public broadcast — displayed by every node.
    Chat,
    /// Addressed to one display name; gossiped to everyone regardless.
    Direct { to: String },
    /// Tagged with a room name; displayed only by local members.
    Room { room: String },
}

impl Message {
    /// Create a public broadcast with a fresh id.
    pub fn chat(from: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from: from.into(),
            scope: Scope::Chat,
            text: text.into(),
        }
    }

    /// Create a direct message with a fresh id.
    pub fn direct(
        from: impl Into<String>,
        to: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from: from.into(),
            scope: Scope::Direct { to: to.into() },
            text: text.into(),
        }
    }

    /// Create a room message with a fresh id.
    pub fn room(
        from: impl Into<String>,
        room: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from: from.into(),
            scope: Scope::Room { room: room.into() },
            text: text.into(),
        }
    }
}
