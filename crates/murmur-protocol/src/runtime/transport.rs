use std::net::SocketAddr;

/// Network abstraction for the runtime.
///
/// In production: implemented by `MeshNode` (TCP mesh).
/// In test: implemented by `MockTransport` (records broadcasts).
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Broadcast a payload to every connected peer.
    async fn broadcast(&self, payload: &str);

    /// Dial a new peer. Returns its announced identity.
    async fn connect(&self, addr: SocketAddr) -> Result<String, String>;
}

// ── Impl for MeshNode (production) ──────────────────────────────────

#[async_trait::async_trait]
impl Transport for murmur_transport::MeshNode {
    async fn broadcast(&self, payload: &str) {
        murmur_transport::MeshNode::broadcast(self, payload.as_bytes()).await;
    }

    async fn connect(&self, addr: SocketAddr) -> Result<String, String> {
        murmur_transport::MeshNode::connect(self, addr)
            .await
            .map(|peer| peer.as_str().to_string())
            .map_err(|e| e.to_string())
    }
}

// ── MockTransport (tests) ───────────────────────────────────────────
