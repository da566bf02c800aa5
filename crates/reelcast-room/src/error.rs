//! Error types for the room layer.

use reelcast_protocol::{PlayerId, RoomId};

/// Errors that can occur during room operations.
///
/// Only [`RoomFull`](Self::RoomFull) produces an explicit reply to the
/// client; the others mean the sender is desynced (never joined, or the
/// room is gone) and the relay drops the event without a response.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room has no free player slots.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// No room with this id exists in the directory.
    #[error("no room named {0}")]
    UnknownRoom(RoomId),

    /// The player is not a member of this room.
    #[error("player {0} is not a member of room {1}")]
    NotAMember(PlayerId, RoomId),
}
