//! Local delivery filter.
//!
//! Decides whether and how a post-dedup message is shown to this node's
//! user. Pure function of the message and the local session — forwarding
//! has already been decided independently by the engine, so a `None` here
//! never stops propagation.

use crate::message::{Message, Scope};
use crate::session::Session;

/// How a message should be presented locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Public broadcast: `[PUBLIC][from] text`.
    Public { from: String, text: String },
    /// Direct message addressed to this node's user: `[DM][from → you] text`.
    Direct { from: String, text: String },
    /// Message for a room this node has joined: `[ROOM:room][from] text`.
    Room {
        room: String,
        from: String,
        text: String,
    },
}

/// Apply the display rules, first match wins.
///
/// Every peer on the mesh receives direct and room messages in plaintext;
/// only local display is gated here. No confidentiality is provided.
pub fn deliver(message: &Message, session: &Session) -> Option<Delivery> {
    // Self-originated echo that looped back through the mesh.
    if message.from == session.username() {
        return None;
    }

    match &message.scope {
        Scope::Direct { to } => {
            if to == session.username() {
                Some(Delivery::Direct {
                    from: message.from.clone(),
                    text: message.text.clone(),
                })
            } else {
                None
            }
        }
        Scope::Room { room } => {
            if session.in_room(room) {
                Some(Delivery::Room {
                    room: room.clone(),
                    from: message.from.clone(),
                    text: message.text.clone(),
                })
            } else {
                None
            }
        }
        Scope::Chat => Some(Delivery::Public {
            from: message.from.clone(),
            text: message.text.clone(),
        }),
    }
}
