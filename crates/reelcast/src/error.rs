//! Unified error type for the Reelcast server.

use reelcast_protocol::ProtocolError;
use reelcast_room::RoomError;
use reelcast_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid event).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, unknown room, not a member).
    #[error(transparent)]
    Room(#[from] RoomError),
}
