/// Protocol-level errors for murmur.
///
/// Everything here is non-fatal: a failed room send is reported to the
/// user and nothing leaves the node; transport failures never surface as
/// errors at all (fire-and-forget broadcast).
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("not a member of room '{room}'")]
    NotInRoom { room: String },

    #[error("chat runtime is shut down")]
    RuntimeClosed,
}
