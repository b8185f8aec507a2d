use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::MeshConfig;
use crate::framing::{read_framed, write_framed, Hello};
use crate::peers::PeerRegistry;
use crate::{MeshTransportError, PeerId};

/// Per-peer writer queue depth. A slow peer past this point loses payloads
/// rather than stalling the broadcaster.
const WRITER_QUEUE: usize = 64;

/// Something happened on the mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshEvent {
    /// A peer link completed its handshake (either direction).
    PeerConnected(PeerId),
    /// A peer link closed or failed.
    PeerDisconnected(PeerId),
    /// A payload arrived from a peer.
    Payload { from: PeerId, data: Vec<u8> },
}

/// A murmur mesh node — bind, connect, broadcast, receive.
///
/// This is the main entry point for consumers. Inbound and outbound links
/// are symmetric once the hello handshake completes; every link feeds the
/// single event channel returned by [`MeshNode::bind`].
pub struct MeshNode {
    id: PeerId,
    local_addr: SocketAddr,
    registry: Arc<PeerRegistry>,
    event_tx: mpsc::Sender<MeshEvent>,
    max_message_size: usize,
    accept_task: JoinHandle<()>,
}

impl MeshNode {
    /// Bind a listener and start accepting peer connections.
    ///
    /// Returns the node and the receiver for all mesh events.
    pub async fn bind(
        config: MeshConfig,
    ) -> Result<(Self, mpsc::Receiver<MeshEvent>), MeshTransportError> {
        let listener = TcpListener::bind(config.listen_addr)
            .await
            .map_err(MeshTransportError::Bind)?;
        let local_addr = listener.local_addr().map_err(MeshTransportError::Bind)?;

        let id = config
            .peer_id
            .unwrap_or_else(|| PeerId::new(format!("node-{}", local_addr.port())));

        let (event_tx, event_rx) = mpsc::channel(config.recv_buffer);
        let registry = Arc::new(PeerRegistry::new());

        let accept_task = {
            let id = id.clone();
            let registry = registry.clone();
            let event_tx = event_tx.clone();
            let max = config.max_message_size;
            tokio::spawn(async move {
                loop {
                    let (stream, addr) = match listener.accept().await {
                        Ok(pair) => pair,
                        Err(e) => {
                            tracing::warn!("accept failed: {e}");
                            continue;
                        }
                    };
                    let id = id.clone();
                    let registry = registry.clone();
                    let event_tx = event_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) =
                            establish_link(stream, id, registry, event_tx, max).await
                        {
                            tracing::debug!("inbound link from {addr} failed: {e}");
                        }
                    });
                }
            })
        };

        tracing::info!(%id, %local_addr, "mesh node listening");

        Ok((
            Self {
                id,
                local_addr,
                registry,
                event_tx,
                max_message_size: config.max_message_size,
                accept_task,
            },
            event_rx,
        ))
    }

    /// This node's identity, as announced in handshakes.
    pub fn id(&self) -> &PeerId {
        &self.id
    }

    /// The bound listen address (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Dial a peer and complete the handshake.
    ///
    /// Returns the remote's announced identity. The link also emits
    /// [`MeshEvent::PeerConnected`] on the event channel.
    pub async fn connect(&self, addr: SocketAddr) -> Result<PeerId, MeshTransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| MeshTransportError::Connect {
                addr,
                source: e.into(),
            })?;
        establish_link(
            stream,
            self.id.clone(),
            self.registry.clone(),
            self.event_tx.clone(),
            self.max_message_size,
        )
        .await
    }

    /// Queue a payload to every connected peer, best-effort.
    ///
    /// Fire-and-forget: no acknowledgment, no retry, no report of partial
    /// failure. Transport failures surface only as the absence of delivery.
    pub async fn broadcast(&self, data: &[u8]) {
        self.registry.broadcast(data).await;
    }

    /// List all currently connected peers.
    pub async fn connected_peers(&self) -> Vec<PeerId> {
        self.registry.connected_peers().await
    }

    /// Shut down: stop accepting and drop all peer links without draining
    /// in-flight sends.
    pub async fn shutdown(self) {
        self.accept_task.abort();
        self.registry.clear().await;
    }
}

/// Hello exchange plus reader/writer task setup, shared by both directions.
async fn establish_link(
    stream: TcpStream,
    local_id: PeerId,
    registry: Arc<PeerRegistry>,
    event_tx: mpsc::Sender<MeshEvent>,
    max_message_size: usize,
) -> Result<PeerId, MeshTransportError> {
    let _ = stream.set_nodelay(true);
    let (mut read_half, mut write_half) = stream.into_split();

    // Announce ourselves, then learn who answered.
    let hello = Hello { peer: local_id };
    write_framed(&mut write_half, &hello.to_bytes())
        .await
        .map_err(MeshTransportError::Handshake)?;
    let frame = read_framed(&mut read_half, max_message_size).await?;
    let remote = Hello::from_bytes(&frame)?.peer;

    let (writer_tx, writer_rx) = mpsc::channel::<Vec<u8>>(WRITER_QUEUE);
    let generation = registry.register(remote.clone(), writer_tx).await;

    if event_tx
        .send(MeshEvent::PeerConnected(remote.clone()))
        .await
        .is_err()
    {
        // Consumer is gone — the node is effectively shut down.
        registry.remove(&remote, generation).await;
        return Err(MeshTransportError::Shutdown);
    }

    tokio::spawn(write_loop(write_half, writer_rx, remote.clone()));
    tokio::spawn(read_loop(
        read_half,
        remote.clone(),
        generation,
        registry,
        event_tx,
        max_message_size,
    ));

    Ok(remote)
}

/// Drain the writer queue into the socket until the queue closes or a
/// write fails.
async fn write_loop(
    mut write_half: OwnedWriteHalf,
    mut rx: mpsc::Receiver<Vec<u8>>,
    peer: PeerId,
) {
    while let Some(data) = rx.recv().await {
        if let Err(e) = write_framed(&mut write_half, &data).await {
            tracing::debug!(%peer, "write failed, closing link: {e}");
            break;
        }
    }
}

/// Deliver inbound frames until the link dies, then deregister.
async fn read_loop(
    mut read_half: OwnedReadHalf,
    peer: PeerId,
    generation: u64,
    registry: Arc<PeerRegistry>,
    event_tx: mpsc::Sender<MeshEvent>,
    max_message_size: usize,
) {
    loop {
        match read_framed(&mut read_half, max_message_size).await {
            Ok(data) => {
                let event = MeshEvent::Payload {
                    from: peer.clone(),
                    data,
                };
                if event_tx.send(event).await.is_err() {
                    break;
                }
            }
            Err(MeshTransportError::MessageTooLarge { size, max }) => {
                tracing::warn!(%peer, size, max, "oversized frame, closing link");
                break;
            }
            Err(e) => {
                tracing::debug!(%peer, "link closed: {e}");
                break;
            }
        }
    }

    if registry.remove(&peer, generation).await {
        let _ = event_tx.send(MeshEvent::PeerDisconnected(peer)).await;
    }
}
