/// Gossip engine for the murmur mesh.
///
/// Pure decision logic — receives a payload, returns a `ReceiveAction`
/// telling the caller what to do (display raw, drop, flood + maybe
/// display). No I/O, no transport dependency. The engine owns the
/// session and seen-set, so any number of independent nodes can live in
/// one process.
use crate::codec::{self, Decoded};
use crate::error::ChatError;
use crate::filter::{self, Delivery};
use crate::message::Message;
use crate::seen::SeenSet;
use crate::session::Session;

/// Why an inbound message was silently absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The payload carried no id — no dedup is possible, so it is
    /// rejected fail-safe rather than folded onto one seen-set entry.
    EmptyId,
    /// Already processed via an earlier path through the mesh.
    Duplicate,
}

/// What to do with an inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveAction {
    /// Non-conforming payload — display it labeled with the delivering
    /// peer. Never deduped, never forwarded.
    DisplayRaw { peer: String, text: String },
    /// Normal dedup outcome (or missing id) — do nothing.
    Drop(DropReason),
    /// First sighting: broadcast `payload` to **all** connected peers
    /// (including the one that delivered it — its own dedup absorbs the
    /// bounce), and render `delivery` if the filter produced one.
    /// Forwarding is unconditional; a `None` delivery must not stop it.
    Flood {
        payload: String,
        delivery: Option<Delivery>,
    },
}

/// Stateless-flood gossip engine with per-message dedup.
///
/// Each distinct id floods from this node at most once: the id enters the
/// seen-set before the flood action is returned, so a duplicate arriving
/// concurrently on another link is already blocked.
pub struct ChatEngine {
    session: Session,
    seen: SeenSet,
}

impl ChatEngine {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            session: Session::new(username),
            seen: SeenSet::new(),
        }
    }

    /// The local session (identity, rooms).
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable session access for the command path.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Number of ids currently held for dedup.
    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    /// Process an inbound payload from a peer. Returns the action to take.
    pub fn receive(&mut self, peer: &str, payload: &str) -> ReceiveAction {
        let message = match codec::decode(payload) {
            Decoded::Message(message) => message,
            Decoded::Raw(text) => {
                return ReceiveAction::DisplayRaw {
                    peer: peer.to_string(),
                    text,
                }
            }
        };

        if message.id.is_empty() {
            tracing::debug!(%peer, "dropping message without id");
            return ReceiveAction::Drop(DropReason::EmptyId);
        }

        // Seen-set insert must precede the flood so a concurrent duplicate
        // cannot double-process.
        if !self.seen.insert(&message.id) {
            tracing::debug!(%peer, id = %message.id, "duplicate absorbed");
            return ReceiveAction::Drop(DropReason::Duplicate);
        }

        let delivery = filter::deliver(&message, &self.session);

        ReceiveAction::Flood {
            payload: codec::encode(&message),
            delivery,
        }
    }

    /// Originate a public broadcast. Returns the payload to send to all peers.
    pub fn send_public(&mut self, text: &str) -> String {
        self.originate(Message::chat(self.session.username(), text))
    }

    /// Originate a direct message. The whole mesh carries it; only the
    /// named recipient displays it.
    pub fn send_direct(&mut self, to: &str, text: &str) -> String {
        self.originate(Message::direct(self.session.username(), to, text))
    }

    /// Originate a room message. Fails before any send if this node is not
    /// a member of the room.
    pub fn send_room(&mut self, room: &str, text: &str) -> Result<String, ChatError> {
        if !self.session.in_room(room) {
            return Err(ChatError::NotInRoom {
                room: room.to_string(),
            });
        }
        Ok(self.originate(Message::room(self.session.username(), room, text)))
    }

    /// Pre-seed the seen-set with the fresh id, then encode.
    ///
    /// Seeding before the caller can broadcast guarantees the looped-back
    /// copy is dropped without re-display or re-forward.
    fn originate(&mut self, message: Message) -> String {
        self.seen.insert(&message.id);
        codec::encode(&message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Delivery;

    fn engine(username: &str) -> ChatEngine {
        ChatEngine::new(username)
    }

    // ── Inbound path ───────────────────────────────────────────────────

    #[test]
    fn first_sighting_floods_and_displays() {
        let mut bob = engine("bob");
        let payload = codec::encode(&Message::chat("alice", "hi"));

        match bob.receive("peer-1", &payload) {
            ReceiveAction::Flood { payload: forward, delivery } => {
                assert_eq!(forward, payload, "forward must re-encode unchanged");
                assert_eq!(
                    delivery,
                    Some(Delivery::Public {
                        from: "alice".into(),
                        text: "hi".into()
                    })
                );
            }
            other => panic!("expected Flood, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_is_dropped() {
        let mut bob = engine("bob");
        let payload = codec::encode(&Message::chat("alice", "once"));

        assert!(matches!(
            bob.receive("peer-1", &payload),
            ReceiveAction::Flood { .. }
        ));
        // Same id via another path
        assert_eq!(
            bob.receive("peer-2", &payload),
            ReceiveAction::Drop(DropReason::Duplicate)
        );
    }

    #[test]
    fn unaddressed_message_still_floods() {
        // Relay that is neither the recipient nor a room member must
        // forward, or the mesh stops propagating.
        let mut relay = engine("carol");
        let dm = codec::encode(&Message::direct("alice", "bob", "psst"));
        let room = codec::encode(&Message::room("alice", "ops", "x"));

        match relay.receive("peer-1", &dm) {
            ReceiveAction::Flood { delivery, .. } => assert_eq!(delivery, None),
            other => panic!("expected Flood, got {:?}", other),
        }
        match relay.receive("peer-1", &room) {
            ReceiveAction::Flood { delivery, .. } => assert_eq!(delivery, None),
            other => panic!("expected Flood, got {:?}", other),
        }
    }

    #[test]
    fn raw_payload_skips_dedup_and_forward() {
        let mut bob = engine("bob");

        let action = bob.receive("peer-1", "plain text hello");
        assert_eq!(
            action,
            ReceiveAction::DisplayRaw {
                peer: "peer-1".into(),
                text: "plain text hello".into()
            }
        );
        assert_eq!(bob.seen_len(), 0);

        // The same raw text again is displayed again — no dedup applies.
        assert!(matches!(
            bob.receive("peer-1", "plain text hello"),
            ReceiveAction::DisplayRaw { .. }
        ));
    }

    #[test]
    fn empty_id_dropped_without_seen_entry() {
        let mut bob = engine("bob");
        let payload = r#"{"id":"","from":"alice","type":"chat","text":"hi"}"#;

        assert_eq!(
            bob.receive("peer-1", payload),
            ReceiveAction::Drop(DropReason::EmptyId)
        );
        assert_eq!(bob.seen_len(), 0, "empty ids must not pollute the seen-set");

        // A second one is dropped again, not treated as a duplicate of the first.
        let other = r#"{"from":"carol","type":"chat","text":"yo"}"#;
        assert_eq!(
            bob.receive("peer-2", other),
            ReceiveAction::Drop(DropReason::EmptyId)
        );
    }

    #[test]
    fn own_message_looped_back_is_dropped() {
        let mut alice = engine("alice");
        let payload = alice.send_public("hello mesh");

        // The mesh bounces the payload back.
        assert_eq!(
            alice.receive("peer-1", &payload),
            ReceiveAction::Drop(DropReason::Duplicate)
        );
    }

    // ── Origination ────────────────────────────────────────────────────

    #[test]
    fn originate_preseeds_seen_set() {
        let mut alice = engine("alice");
        let payload = alice.send_public("hi");

        let Decoded::Message(message) = codec::decode(&payload) else {
            panic!("originated payload must decode");
        };
        assert!(alice.seen.contains(&message.id));
        assert_eq!(message.from, "alice");
    }

    #[test]
    fn send_room_requires_membership() {
        let mut alice = engine("alice");

        let err = alice.send_room("ops", "hello").unwrap_err();
        assert!(matches!(err, ChatError::NotInRoom { .. }));
        assert_eq!(alice.seen_len(), 0, "failed send must not touch state");

        alice.session_mut().join_room("ops");
        let payload = alice.send_room("ops", "hello").unwrap();
        assert!(payload.contains("\"room\":\"ops\""));
    }

    #[test]
    fn send_direct_carries_recipient() {
        let mut alice = engine("alice");
        let payload = alice.send_direct("bob", "psst");

        let Decoded::Message(message) = codec::decode(&payload) else {
            panic!("originated payload must decode");
        };
        assert_eq!(
            message.scope,
            crate::message::Scope::Direct { to: "bob".into() }
        );
    }

    #[test]
    fn renamed_identity_stamps_new_from() {
        let mut node = engine("node-9000");
        node.session_mut().set_username("alice");
        let payload = node.send_public("hi");
        assert!(payload.contains("\"from\":\"alice\""));
    }
}
