//! Room lifecycle management for Reelcast.
//!
//! A room is an isolated group of up to four connections sharing broadcast
//! scope. The structures here are plain single-owner state — no interior
//! locking. The server wraps the whole relay in one async mutex and
//! processes each inbound event to completion (including all broadcasts)
//! before the next, so every mutation is atomic with respect to other
//! events.
//!
//! # Key types
//!
//! - [`Room`] — member set, replicated player state, broadcast fan-out
//! - [`RoomDirectory`] — creates rooms lazily, destroys them when empty
//! - [`ConnectionRegistry`] — which room each connection is in
//! - [`RelayConfig`] — player cap, layout constants, retention windows
//! - [`RoomError`] — full / unknown-room / not-a-member

mod config;
mod directory;
mod error;
mod registry;
mod room;

pub use config::RelayConfig;
pub use directory::RoomDirectory;
pub use error::RoomError;
pub use registry::ConnectionRegistry;
pub use room::{PlayerSender, Room};
