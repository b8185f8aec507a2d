/// The chat runtime event loop.
///
/// A single async task that owns all mutable protocol state (the gossip
/// engine) and multiplexes over mesh events and application commands.
use tokio::sync::mpsc;

use murmur_transport::MeshEvent;

use crate::engine::{ChatEngine, ReceiveAction};

use super::{ChatCommand, ChatEvent, RuntimeConfig, Transport};

/// Main event loop — owns all chat state.
pub(super) async fn chat_loop<T: Transport>(
    transport: T,
    config: RuntimeConfig,
    mut cmd_rx: mpsc::Receiver<ChatCommand>,
    mut mesh_rx: mpsc::Receiver<MeshEvent>,
    event_tx: mpsc::Sender<ChatEvent>,
) {
    let mut engine = ChatEngine::new(config.username);

    loop {
        tokio::select! {
            // ── 1. Incoming mesh traffic ────────────────────────
            mesh_event = mesh_rx.recv() => {
                let Some(mesh_event) = mesh_event else {
                    tracing::info!("mesh event stream closed, stopping runtime");
                    break;
                };
                match mesh_event {
                    MeshEvent::Payload { from, data } => {
                        let payload = String::from_utf8_lossy(&data);
                        match engine.receive(from.as_str(), &payload) {
                            ReceiveAction::Flood { payload, delivery } => {
                                transport.broadcast(&payload).await;
                                if let Some(delivery) = delivery {
                                    let _ = event_tx.send(ChatEvent::Delivered(delivery)).await;
                                }
                            }
                            ReceiveAction::DisplayRaw { peer, text } => {
                                let _ = event_tx
                                    .send(ChatEvent::RawPayload { peer, text })
                                    .await;
                            }
                            ReceiveAction::Drop(reason) => {
                                tracing::trace!(?reason, "payload absorbed");
                            }
                        }
                    }
                    MeshEvent::PeerConnected(peer) => {
                        let _ = event_tx
                            .send(ChatEvent::PeerConnected { peer: peer.to_string() })
                            .await;
                    }
                    MeshEvent::PeerDisconnected(peer) => {
                        let _ = event_tx
                            .send(ChatEvent::PeerDisconnected { peer: peer.to_string() })
                            .await;
                    }
                }
            }

            // ── 2. Application commands ─────────────────────────
            command = cmd_rx.recv() => {
                let Some(command) = command else {
                    tracing::info!("all handles dropped, stopping runtime");
                    break;
                };
                match command {
                    ChatCommand::SetUsername { name } => {
                        engine.session_mut().set_username(&name);
                        let _ = event_tx
                            .send(ChatEvent::Notice(format!("you are now '{name}'")))
                            .await;
                    }
                    ChatCommand::SendPublic { text } => {
                        let payload = engine.send_public(&text);
                        transport.broadcast(&payload).await;
                    }
                    ChatCommand::SendDirect { to, text } => {
                        let payload = engine.send_direct(&to, &text);
                        transport.broadcast(&payload).await;
                    }
                    ChatCommand::SendRoom { room, text } => {
                        match engine.send_room(&room, &text) {
                            Ok(payload) => transport.broadcast(&payload).await,
                            Err(e) => {
                                let _ = event_tx
                                    .send(ChatEvent::Error { description: e.to_string() })
                                    .await;
                            }
                        }
                    }
                    ChatCommand::JoinRoom { room } => {
                        let notice = if engine.session_mut().join_room(&room) {
                            format!("joined room '{room}'")
                        } else {
                            format!("already in room '{room}'")
                        };
                        let _ = event_tx.send(ChatEvent::Notice(notice)).await;
                    }
                    ChatCommand::LeaveRoom { room } => {
                        let notice = if engine.session_mut().leave_room(&room) {
                            format!("left room '{room}'")
                        } else {
                            format!("not in room '{room}'")
                        };
                        let _ = event_tx.send(ChatEvent::Notice(notice)).await;
                    }
                    ChatCommand::ListRooms { reply } => {
                        let rooms = engine
                            .session()
                            .rooms()
                            .map(str::to_string)
                            .collect();
                        let _ = reply.send(rooms);
                    }
                    ChatCommand::Connect { addr } => {
                        match transport.connect(addr).await {
                            Ok(peer) => {
                                let _ = event_tx
                                    .send(ChatEvent::Notice(format!("connected to {peer} at {addr}")))
                                    .await;
                            }
                            Err(e) => {
                                let _ = event_tx
                                    .send(ChatEvent::Error {
                                        description: format!("connect to {addr} failed: {e}"),
                                    })
                                    .await;
                            }
                        }
                    }
                    ChatCommand::Shutdown => {
                        tracing::info!("shutdown requested");
                        break;
                    }
                }
            }
        }
    }
}
