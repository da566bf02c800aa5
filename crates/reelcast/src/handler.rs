//! Per-connection handler: decode, dispatch, and cleanup.
//!
//! Each accepted connection gets its own task running [`handle_connection`]
//! plus a writer task that pumps the connection's outbound channel into the
//! socket. There is no handshake — a connection starts UNJOINED and the
//! first useful thing it can say is `joinRoom`.
//!
//! Whatever ends the read loop — clean close, protocol error, dead socket —
//! the disconnect path runs exactly once and is treated as a clean leave.

use std::sync::Arc;

use reelcast_protocol::{ClientEvent, Codec, PlayerId};
use reelcast_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::reaper::schedule_fish_expiry;
use crate::server::ServerState;
use crate::RelayError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), RelayError> {
    let player_id = PlayerId(conn.id().into_inner());
    tracing::debug!(conn_id = %conn.id(), %player_id, "handling new connection");

    // Outbound path: the room layer holds the sender, this task drains the
    // receiver into the socket. Fire-and-forget from the room's side.
    let (tx, mut rx) = mpsc::unbounded_channel();
    let writer = {
        let conn = conn.clone();
        let codec = state.codec;
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let bytes = match codec.encode(&event) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to encode event");
                        continue;
                    }
                };
                if conn.send(&bytes).await.is_err() {
                    break;
                }
            }
        })
    };

    // Inbound path: one event at a time, relay locked for the duration of
    // each so the event and all its broadcasts land atomically.
    loop {
        let frame = match conn.recv().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&frame) {
            Ok(event) => event,
            Err(e) => {
                // Malformed payloads are a tolerated trust boundary.
                tracing::debug!(%player_id, error = %e, "undecodable frame, skipping");
                continue;
            }
        };

        let mut relay = state.relay.lock().await;
        match event {
            ClientEvent::JoinRoom {
                room_id,
                player_name,
            } => {
                relay.join_room(player_id, room_id, &player_name, tx.clone());
            }
            ClientEvent::UpdatePlayerState { fields } => {
                relay.update_player_state(player_id, fields);
            }
            ClientEvent::FishCaught {
                fish_name,
                fish_value,
            } => {
                relay.fish_caught(player_id, &fish_name, fish_value);
            }
            ClientEvent::SendChatMessage { message } => {
                relay.chat(player_id, &message);
            }
            ClientEvent::PlayerCast => {
                relay.player_cast(player_id);
            }
            ClientEvent::SpawnFish { fish } => {
                if let Some((room_id, spawn_id)) =
                    relay.spawn_fish(player_id, fish)
                {
                    schedule_fish_expiry(
                        Arc::clone(&state),
                        room_id,
                        spawn_id,
                    );
                }
            }
        }
    }

    // Transport-level disconnect is always a clean leave, never retried.
    state.relay.lock().await.disconnect(player_id);

    // Dropping our sender (the room's clone is gone after disconnect)
    // closes the channel and lets the writer flush out and exit.
    drop(tx);
    let _ = writer.await;
    let _ = conn.close().await;

    Ok(())
}
