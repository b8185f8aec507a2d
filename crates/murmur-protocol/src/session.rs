use std::collections::BTreeSet;

/// Local session state: display name and joined rooms.
///
/// Mutated only by local commands — network traffic never touches it.
/// Room membership is a display filter, not a network subscription:
/// nothing about it is synchronized with other nodes.
#[derive(Debug, Clone)]
pub struct Session {
    username: String,
    rooms: BTreeSet<String>,
}

impl Session {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            rooms: BTreeSet::new(),
        }
    }

    /// Current display name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Replace the display name, effective immediately.
    ///
    /// Already-displayed history is not re-filtered.
    pub fn set_username(&mut self, name: impl Into<String>) {
        self.username = name.into();
    }

    /// Join a room. Returns `false` if already a member (idempotent no-op).
    pub fn join_room(&mut self, room: &str) -> bool {
        self.rooms.insert(room.to_string())
    }

    /// Leave a room. Returns `false` if not a member (non-fatal no-op).
    pub fn leave_room(&mut self, room: &str) -> bool {
        self.rooms.remove(room)
    }

    /// Whether this node displays messages for the given room.
    pub fn in_room(&self, room: &str) -> bool {
        self.rooms.contains(room)
    }

    /// Joined rooms in lexicographic order.
    pub fn rooms(&self) -> impl Iterator<Item = &str> {
        self.rooms.iter().map(String::as_str)
    }
}
