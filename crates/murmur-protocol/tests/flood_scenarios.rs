//! End-to-end flood scenarios over a small in-memory mesh.
//!
//! Each node is a pure `ChatEngine`; the harness plays the transport,
//! delivering every flooded payload to every node (including the sender,
//! as a real full mesh would loop it back).

use murmur_protocol::{ChatEngine, Delivery, DropReason, ReceiveAction};

/// Fully connected mesh of engines with a synchronous flood pump.
struct Mesh {
    nodes: Vec<ChatEngine>,
}

/// One displayed item, tagged with the index of the node that displayed it.
#[derive(Debug, PartialEq, Eq)]
enum Shown {
    Delivery(usize, Delivery),
    Raw(usize, String),
}

impl Mesh {
    fn new(usernames: &[&str]) -> Self {
        Self {
            nodes: usernames.iter().map(|name| ChatEngine::new(*name)).collect(),
        }
    }

    fn node(&mut self, index: usize) -> &mut ChatEngine {
        &mut self.nodes[index]
    }

    /// Flood `payload` from node `origin` until the mesh is quiet.
    /// Returns everything any node displayed, in propagation order.
    fn flood_from(&mut self, origin: usize, payload: String) -> Vec<Shown> {
        let mut shown = Vec::new();
        // (sending node, payload) pairs still in flight
        let mut in_flight = vec![(origin, payload)];

        while let Some((sender, payload)) = in_flight.pop() {
            let sender_name = format!("node-{sender}");
            for receiver in 0..self.nodes.len() {
                // A broadcast reaches every peer, the originator's own
                // loop-back link included.
                match self.nodes[receiver].receive(&sender_name, &payload) {
                    ReceiveAction::Flood {
                        payload: forward,
                        delivery,
                    } => {
                        if let Some(delivery) = delivery {
                            shown.push(Shown::Delivery(receiver, delivery));
                        }
                        in_flight.push((receiver, forward));
                    }
                    ReceiveAction::DisplayRaw { text, .. } => {
                        shown.push(Shown::Raw(receiver, text));
                    }
                    ReceiveAction::Drop(_) => {}
                }
            }
        }
        shown
    }
}

#[test]
fn public_message_displays_exactly_once_per_node() {
    let mut mesh = Mesh::new(&["alice", "bob", "carol"]);

    let payload = mesh.node(0).send_public("hello everyone");
    let shown = mesh.flood_from(0, payload);

    // Alice suppresses her own message; bob and carol each display once,
    // no matter how many redundant paths the flood took.
    let mut displayed: Vec<usize> = shown
        .iter()
        .map(|s| match s {
            Shown::Delivery(node, _) => *node,
            Shown::Raw(node, _) => *node,
        })
        .collect();
    displayed.sort_unstable();
    assert_eq!(displayed, vec![1, 2]);

    for item in &shown {
        assert!(matches!(
            item,
            Shown::Delivery(
                _,
                Delivery::Public { from, text }
            ) if from == "alice" && text == "hello everyone"
        ));
    }
}

#[test]
fn direct_message_relayed_silently_reaches_recipient() {
    // carol sits between alice and bob in terms of addressing: she is
    // neither sender nor recipient, yet her forward is what carries the DM.
    let mut mesh = Mesh::new(&["alice", "bob", "carol"]);

    let payload = mesh.node(0).send_direct("bob", "meet at noon");
    let shown = mesh.flood_from(0, payload);

    assert_eq!(
        shown,
        vec![Shown::Delivery(
            1,
            Delivery::Direct {
                from: "alice".into(),
                text: "meet at noon".into()
            }
        )]
    );
}

#[test]
fn room_message_displays_only_for_members() {
    let mut mesh = Mesh::new(&["alice", "bob", "carol"]);
    mesh.node(0).session_mut().join_room("ops");
    mesh.node(1).session_mut().join_room("ops");

    let payload = mesh.node(0).send_room("ops", "deploy at 5").unwrap();
    let shown = mesh.flood_from(0, payload.clone());

    assert_eq!(
        shown,
        vec![Shown::Delivery(
            1,
            Delivery::Room {
                room: "ops".into(),
                from: "alice".into(),
                text: "deploy at 5".into()
            }
        )]
    );

    // carol joins afterwards; the message was already absorbed by her
    // dedup, so it is not retroactively displayed.
    mesh.node(2).session_mut().join_room("ops");
    assert_eq!(
        mesh.node(2).receive("node-0", &payload),
        ReceiveAction::Drop(DropReason::Duplicate)
    );
}

#[test]
fn raw_payload_displays_everywhere_but_never_propagates() {
    let mut mesh = Mesh::new(&["alice", "bob", "carol"]);

    // Injected by node 0's link, as a foreign client speaking plain text.
    let shown = mesh.flood_from(0, "hello from telnet".to_string());

    // Every node on the delivering hop shows it; no node forwards it, so
    // there is exactly one round.
    assert_eq!(shown.len(), 3);
    for item in &shown {
        assert!(matches!(item, Shown::Raw(_, text) if text == "hello from telnet"));
    }
}

#[test]
fn redundant_paths_forward_once_per_node() {
    let mut mesh = Mesh::new(&["alice", "bob", "carol", "dave"]);

    let payload = mesh.node(0).send_public("ping");
    mesh.flood_from(0, payload.clone());

    // After the flood settles, every copy from any direction is a duplicate.
    for node in 0..4 {
        assert_eq!(
            mesh.node(node).receive("node-9", &payload),
            ReceiveAction::Drop(DropReason::Duplicate)
        );
    }
}

#[test]
fn two_messages_with_distinct_ids_both_deliver() {
    let mut mesh = Mesh::new(&["alice", "bob"]);

    let first = mesh.node(0).send_public("first");
    let second = mesh.node(0).send_public("second");

    let shown_first = mesh.flood_from(0, first);
    let shown_second = mesh.flood_from(0, second);

    assert_eq!(
        shown_first,
        vec![Shown::Delivery(
            1,
            Delivery::Public {
                from: "alice".into(),
                text: "first".into()
            }
        )]
    );
    assert_eq!(
        shown_second,
        vec![Shown::Delivery(
            1,
            Delivery::Public {
                from: "alice".into(),
                text: "second".into()
            }
        )]
    );
}
