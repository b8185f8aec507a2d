use std::net::SocketAddr;

/// Errors returned by the murmur transport layer.
#[derive(Debug, thiserror::Error)]
pub enum MeshTransportError {
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: anyhow::Error,
    },

    #[error("handshake failed: {0}")]
    Handshake(#[source] anyhow::Error),

    #[error("receive failed: {0}")]
    Receive(#[source] anyhow::Error),

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("node is shut down")]
    Shutdown,

    #[error("invalid configuration: {0}")]
    Config(String),
}

// Allow anyhow -> MeshTransportError for convenience in the read path
impl From<anyhow::Error> for MeshTransportError {
    fn from(e: anyhow::Error) -> Self {
        MeshTransportError::Receive(e)
    }
}
