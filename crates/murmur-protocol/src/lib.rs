//! murmur protocol layer.
//!
//! Implements the chat overlay on top of `murmur-transport` (TCP mesh):
//! a self-delimiting JSON wire format, flood-gossip forwarding with
//! per-message dedup, and a local delivery filter for public, direct,
//! and room-scoped messages.
//!
//! Rooms and identity are purely local state — nothing about them is
//! negotiated with the network, and direct/room messages travel the whole
//! mesh in plaintext. The recipient gate is display-only.

pub mod codec;
pub mod engine;
pub mod error;
pub mod filter;
pub mod message;
pub mod runtime;
pub mod seen;
pub mod session;

pub use codec::{decode, encode, Decoded};
pub use engine::{ChatEngine, DropReason, ReceiveAction};
pub use error::ChatError;
pub use filter::{deliver, Delivery};
pub use message::{Message, Scope};
pub use runtime::{
    ChatCommand, ChatEvent, ChatHandle, ChatRuntime, RuntimeChannels, RuntimeConfig, Transport,
};
pub use seen::SeenSet;
pub use session::Session;
