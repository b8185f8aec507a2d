//! murmur transport layer.
//!
//! Maintains a flat mesh of TCP peer links with length-prefixed framing
//! behind a stable API. The protocol layer only needs four things from it:
//! connect to a peer, broadcast a payload to every connected peer, receive
//! inbound payloads tagged with the delivering peer, and learn about
//! connects/disconnects.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use murmur_transport::{MeshConfig, MeshEvent, MeshNode};
//!
//! # async fn example() -> Result<(), murmur_transport::MeshTransportError> {
//! let (node, mut events) = MeshNode::bind(MeshConfig::new("127.0.0.1:9000".parse().unwrap())).await?;
//! println!("listening as {}", node.id());
//!
//! node.connect("127.0.0.1:9001".parse().unwrap()).await?;
//! node.broadcast(b"hello mesh").await;
//!
//! while let Some(event) = events.recv().await {
//!     if let MeshEvent::Payload { from, data } = event {
//!         println!("from {from}: {} bytes", data.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod framing;
mod node;
mod peers;

pub use config::MeshConfig;
pub use error::MeshTransportError;
pub use node::{MeshEvent, MeshNode};

use std::fmt;
use std::str::FromStr;

/// Mesh peer identity — an opaque display string exchanged in the handshake.
///
/// Defaults to `node-<port>` when not set explicitly. Identifies a peer link
/// for display and bookkeeping only; it carries no authentication.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PeerId(String);

impl PeerId {
    /// Create from any displayable string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self.0)
    }
}

impl FromStr for PeerId {
    type Err = MeshTransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(MeshTransportError::Config("empty peer id".into()));
        }
        Ok(Self(s.to_string()))
    }
}

impl serde::Serialize for PeerId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PeerId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
