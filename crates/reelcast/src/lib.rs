//! # Reelcast
//!
//! Relay server for a casual multiplayer fishing mini-game. Clients run
//! their own animation and timer logic; the server synchronizes per-room
//! player state, chat, and fish-catch events.
//!
//! The layers, bottom up: transport (WebSocket frames) → protocol (JSON
//! events) → room (membership and broadcast) → [`Relay`] (per-event
//! dispatch) → [`RelayServer`] (accept loop and background reaper).
//!
//! Events are processed one at a time to completion — the whole relay sits
//! behind a single async mutex — so room state never races and no locking
//! shows up below this crate.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use reelcast::RelayServerBuilder;
//!
//! # async fn run() -> Result<(), reelcast::RelayError> {
//! let server = RelayServerBuilder::new().bind("0.0.0.0:3000").build().await?;
//! server.run().await
//! # }
//! ```

mod dispatcher;
mod error;
mod handler;
mod reaper;
mod server;

pub use dispatcher::Relay;
pub use error::RelayError;
pub use server::{RelayServer, RelayServerBuilder};
