use std::collections::HashMap;

use tokio::sync::{mpsc, Mutex};

use crate::PeerId;

/// Registry of live peer links, keyed by handshake identity.
///
/// Each entry holds the sender side of the per-connection writer queue.
/// Registrations carry a generation number so the reader task of a replaced
/// connection cannot evict its successor.
pub(crate) struct PeerRegistry {
    inner: Mutex<Inner>,
}

struct Inner {
    peers: HashMap<PeerId, Entry>,
    next_gen: u64,
}

struct Entry {
    generation: u64,
    tx: mpsc::Sender<Vec<u8>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                peers: HashMap::new(),
                next_gen: 0,
            }),
        }
    }

    /// Register a peer link, replacing any previous one with the same id.
    /// Returns the generation token for later removal.
    pub async fn register(&self, peer: PeerId, tx: mpsc::Sender<Vec<u8>>) -> u64 {
        let mut inner = self.inner.lock().await;
        let generation = inner.next_gen;
        inner.next_gen += 1;
        inner.peers.insert(peer, Entry { generation, tx });
        generation
    }

    /// Remove a peer link, but only if it still holds the given generation.
    /// Returns `true` if an entry was removed.
    pub async fn remove(&self, peer: &PeerId, generation: u64) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.peers.get(peer) {
            Some(entry) if entry.generation == generation => {
                inner.peers.remove(peer);
                true
            }
            _ => false,
        }
    }

    /// Queue a payload to every registered peer, best-effort.
    ///
    /// A full or closed per-peer queue drops the payload for that peer —
    /// the mesh promises no delivery guarantee.
    pub async fn broadcast(&self, data: &[u8]) {
        let senders: Vec<(PeerId, mpsc::Sender<Vec<u8>>)> = {
            let inner = self.inner.lock().await;
            inner
                .peers
                .iter()
                .map(|(id, entry)| (id.clone(), entry.tx.clone()))
                .collect()
        };

        for (peer, tx) in senders {
            if tx.try_send(data.to_vec()).is_err() {
                tracing::debug!(%peer, "broadcast dropped: writer queue full or closed");
            }
        }
    }

    /// List all currently registered peers.
    pub async fn connected_peers(&self) -> Vec<PeerId> {
        let inner = self.inner.lock().await;
        inner.peers.keys().cloned().collect()
    }

    /// Drop every registration, ending all writer tasks.
    pub async fn clear(&self) {
        self.inner.lock().await.peers.clear();
    }
}
