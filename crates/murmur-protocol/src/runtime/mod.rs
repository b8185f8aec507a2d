/// Chat runtime — integrates the protocol modules into a live event loop.
///
/// The runtime owns the transport and all protocol state (session, gossip
/// engine). It exposes a channel-based API so the application (TUI, bot)
/// never touches raw payloads or dedup internals.
mod r#loop;
mod transport;

use std::net::SocketAddr;

use tokio::sync::{mpsc, oneshot};

use crate::error::ChatError;
use crate::filter::Delivery;
use murmur_transport::MeshEvent;

pub use transport::Transport;

// ── Configuration ─────────────────────────────────────────────────────

/// Configuration for the chat runtime.
pub struct RuntimeConfig {
    /// Initial local username (changeable at runtime).
    pub username: String,
    /// Capacity of the application-facing event channel.
    pub event_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            username: "anonymous".to_string(),
            event_buffer: 256,
        }
    }
}

// ── Commands (app → runtime) ──────────────────────────────────────────

/// Commands the application sends to the runtime event loop.
pub enum ChatCommand {
    /// Change the local display identity.
    SetUsername { name: String },
    /// Broadcast a public message to the whole mesh.
    SendPublic { text: String },
    /// Send a direct message. It travels the whole mesh; only the named
    /// recipient displays it.
    SendDirect { to: String, text: String },
    /// Send a message scoped to a room. Requires local membership.
    SendRoom { room: String, text: String },
    /// Join a room (purely local subscription).
    JoinRoom { room: String },
    /// Leave a room.
    LeaveRoom { room: String },
    /// Query: rooms currently joined, lexicographic.
    ListRooms { reply: oneshot::Sender<Vec<String>> },
    /// Dial a new peer.
    Connect { addr: SocketAddr },
    /// Graceful shutdown.
    Shutdown,
}

// ── Events (runtime → app) ───────────────────────────────────────────

/// Events the application renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A message passed the delivery filter and should be displayed.
    Delivered(Delivery),
    /// A non-conforming payload, displayed verbatim with its source peer.
    RawPayload { peer: String, text: String },
    /// A peer link came up.
    PeerConnected { peer: String },
    /// A peer link went down.
    PeerDisconnected { peer: String },
    /// Informational feedback for a command (joins, renames).
    Notice(String),
    /// A command failed; the runtime keeps running.
    Error { description: String },
}

// ── ChatHandle (app-facing API) ──────────────────────────────────────

/// Handle to communicate with a running `ChatRuntime`.
///
/// Cheap to clone. All methods are non-blocking channel sends; they fail
/// only once the runtime has shut down.
#[derive(Clone)]
pub struct ChatHandle {
    cmd_tx: mpsc::Sender<ChatCommand>,
}

impl ChatHandle {
    async fn send(&self, command: ChatCommand) -> Result<(), ChatError> {
        self.cmd_tx
            .send(command)
            .await
            .map_err(|_| ChatError::RuntimeClosed)
    }

    /// Change the local username used for outbound messages.
    pub async fn set_username(&self, name: impl Into<String>) -> Result<(), ChatError> {
        self.send(ChatCommand::SetUsername { name: name.into() }).await
    }

    /// Broadcast a public message.
    pub async fn send_public(&self, text: impl Into<String>) -> Result<(), ChatError> {
        self.send(ChatCommand::SendPublic { text: text.into() }).await
    }

    /// Send a direct message to a username.
    pub async fn send_direct(
        &self,
        to: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), ChatError> {
        self.send(ChatCommand::SendDirect {
            to: to.into(),
            text: text.into(),
        })
        .await
    }

    /// Send a message to a room this node has joined.
    pub async fn send_room(
        &self,
        room: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), ChatError> {
        self.send(ChatCommand::SendRoom {
            room: room.into(),
            text: text.into(),
        })
        .await
    }

    /// Join a room.
    pub async fn join_room(&self, room: impl Into<String>) -> Result<(), ChatError> {
        self.send(ChatCommand::JoinRoom { room: room.into() }).await
    }

    /// Leave a room.
    pub async fn leave_room(&self, room: impl Into<String>) -> Result<(), ChatError> {
        self.send(ChatCommand::LeaveRoom { room: room.into() }).await
    }

    /// Rooms currently joined, in lexicographic order.
    pub async fn rooms(&self) -> Vec<String> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(ChatCommand::ListRooms { reply: tx }).await;
        rx.await.unwrap_or_default()
    }

    /// Dial a new peer.
    pub async fn connect(&self, addr: SocketAddr) -> Result<(), ChatError> {
        self.send(ChatCommand::Connect { addr }).await
    }

    /// Graceful shutdown.
    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(ChatCommand::Shutdown).await;
    }
}

// ── RuntimeChannels ──────────────────────────────────────────────────

/// Channels returned to the application when the runtime starts.
pub struct RuntimeChannels {
    /// Handle to send commands to the runtime.
    pub handle: ChatHandle,
    /// Receive display events.
    pub events: mpsc::Receiver<ChatEvent>,
}

// ── ChatRuntime ──────────────────────────────────────────────────────

/// The chat runtime — spawn it and communicate via channels.
pub struct ChatRuntime;

impl ChatRuntime {
    /// Create and start the chat runtime.
    ///
    /// Takes ownership of the transport and its event stream. Returns
    /// channels for the application. Spawns the event loop as a tokio task.
    pub fn spawn<T: Transport>(
        transport: T,
        mesh_events: mpsc::Receiver<MeshEvent>,
        config: RuntimeConfig,
    ) -> RuntimeChannels {
        let (cmd_tx, cmd_rx) = mpsc::channel::<ChatCommand>(64);
        let (event_tx, event_rx) = mpsc::channel::<ChatEvent>(config.event_buffer);

        tokio::spawn(r#loop::chat_loop(
            transport,
            config,
            cmd_rx,
            mesh_events,
            event_tx,
        ));

        RuntimeChannels {
            handle: ChatHandle { cmd_tx },
            events: event_rx,
        }
    }
}
