use std::net::SocketAddr;

use crate::PeerId;

/// Configuration for a [`MeshNode`](crate::MeshNode).
///
/// Only the listen address is required. Use the builder pattern:
///
/// ```rust
/// use murmur_transport::MeshConfig;
///
/// let config = MeshConfig::new("127.0.0.1:9000".parse().unwrap())
///     .peer_id("alice-laptop".parse().unwrap())
///     .max_message_size(512 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct MeshConfig {
    /// Address to listen on for inbound peer connections.
    pub(crate) listen_addr: SocketAddr,
    /// Peer identifier announced in the handshake.
    /// Defaults to `node-<port>` of the bound address.
    pub(crate) peer_id: Option<PeerId>,
    /// Maximum incoming frame size in bytes.
    pub(crate) max_message_size: usize,
    /// Channel buffer size for mesh events.
    pub(crate) recv_buffer: usize,
}

impl MeshConfig {
    /// Create a new config with defaults.
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            peer_id: None,
            max_message_size: 256 * 1024, // 256 KiB
            recv_buffer: 256,
        }
    }

    /// Set the peer identifier announced to other nodes.
    pub fn peer_id(mut self, id: PeerId) -> Self {
        self.peer_id = Some(id);
        self
    }

    /// Set maximum incoming frame size (default: 256 KiB).
    pub fn max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = bytes;
        self
    }

    /// Set the channel buffer size for mesh events (default: 256).
    pub fn recv_buffer(mut self, capacity: usize) -> Self {
        self.recv_buffer = capacity;
        self
    }
}
