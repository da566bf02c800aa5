//! Wire protocol for Reelcast.
//!
//! This crate defines the "language" that fishing clients and the relay
//! server speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`PlayerState`], etc.) —
//!   the event structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer sits between transport (raw frames) and the room
//! relay (membership and broadcast). It doesn't know about connections or
//! rooms — it only knows how to serialize and deserialize events.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ClientEvent, FishSpawn, FishingLine, PlayerId, PlayerState, RoomId,
    ServerEvent,
};
