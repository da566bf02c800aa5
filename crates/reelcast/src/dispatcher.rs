//! The relay dispatcher: one method per inbound event kind.
//!
//! Each method resolves the sender's room through the registry, applies
//! the operation, and lets the room fan the result out. Events with no
//! resolvable room — the connection never joined, or the room has since
//! been deleted — are dropped without an error reply: an unauthenticated
//! relay treats that as client-side desync, not a server error.
//!
//! The [`Relay`] is plain single-owner state. The server wraps it in one
//! async mutex and holds the lock for the full duration of each event, so
//! every mutation and its broadcasts are atomic with respect to other
//! events (cooperative single-threaded processing).

use reelcast_protocol::{PlayerId, RoomId, ServerEvent};
use reelcast_room::{
    ConnectionRegistry, PlayerSender, RelayConfig, Room, RoomDirectory,
    RoomError,
};
use serde_json::{Map, Value};

/// Room directory + connection registry, driven by decoded client events.
pub struct Relay {
    directory: RoomDirectory,
    registry: ConnectionRegistry,
}

impl Relay {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            directory: RoomDirectory::new(config),
            registry: ConnectionRegistry::new(),
        }
    }

    /// Handles `joinRoom`: get-or-create the room and try to add the
    /// player. Replies `roomJoined` (with the seeded player mapping) on
    /// success, `roomFull` on rejection.
    ///
    /// The observed protocol has no room switching — a connection that
    /// already joined keeps its binding and the request is dropped.
    pub fn join_room(
        &mut self,
        player_id: PlayerId,
        room_id: RoomId,
        player_name: &str,
        sender: PlayerSender,
    ) {
        if let Some(current) = self.registry.room_of(player_id) {
            tracing::debug!(
                %player_id,
                room_id = %current,
                "join ignored, connection already in a room"
            );
            return;
        }

        let room = self.directory.get_or_create(&room_id);
        match room.join(player_id, player_name, sender.clone()) {
            Ok(()) => {
                let players = room.snapshot();
                let _ = sender.send(ServerEvent::RoomJoined {
                    room_id: room_id.clone(),
                    players,
                    player_id,
                });
                self.registry.bind(player_id, room_id);
            }
            Err(RoomError::RoomFull(_)) => {
                tracing::info!(%player_id, %room_id, "join rejected, room full");
                let _ = sender.send(ServerEvent::RoomFull);
            }
            Err(err) => {
                tracing::debug!(%player_id, %room_id, error = %err, "join dropped");
            }
        }
    }

    /// Handles `updatePlayerState`: merge and echo to the others.
    pub fn update_player_state(
        &mut self,
        player_id: PlayerId,
        fields: Map<String, Value>,
    ) {
        let Some(room) = self.member_room(player_id) else {
            return;
        };
        if let Err(err) = room.apply_state_update(player_id, fields) {
            tracing::debug!(%player_id, error = %err, "state update dropped");
        }
    }

    /// Handles `fishCaught`: authoritative counter bump, announced to the
    /// whole room.
    pub fn fish_caught(
        &mut self,
        player_id: PlayerId,
        fish_name: &str,
        fish_value: i64,
    ) {
        let Some(room) = self.member_room(player_id) else {
            return;
        };
        if let Err(err) = room.record_catch(player_id, fish_name, fish_value) {
            tracing::debug!(%player_id, error = %err, "catch dropped");
        }
    }

    /// Handles `sendChatMessage`: stamped and broadcast to everyone,
    /// sender included.
    pub fn chat(&mut self, player_id: PlayerId, message: &str) {
        let Some(room) = self.member_room(player_id) else {
            return;
        };
        if let Err(err) = room.broadcast_chat(player_id, message) {
            tracing::debug!(%player_id, error = %err, "chat dropped");
        }
    }

    /// Handles `playerCast`: visual notification to the others.
    pub fn player_cast(&mut self, player_id: PlayerId) {
        let Some(room) = self.member_room(player_id) else {
            return;
        };
        if let Err(err) = room.broadcast_cast(player_id) {
            tracing::debug!(%player_id, error = %err, "cast dropped");
        }
    }

    /// Handles `spawnFish`: register and announce a spawn. Returns the
    /// room and spawn id so the caller can schedule the expiry timer.
    pub fn spawn_fish(
        &mut self,
        player_id: PlayerId,
        fish: Map<String, Value>,
    ) -> Option<(RoomId, String)> {
        let room_id = self.registry.room_of(player_id).cloned()?;
        let room = self.directory.get_mut(&room_id)?;
        let spawn = room.spawn_fish(fish);
        Some((room_id, spawn.id))
    }

    /// Drops an expired fish spawn. Tolerates the room or the spawn being
    /// gone — expiry timers may outlive both.
    pub fn expire_fish(&mut self, room_id: &RoomId, spawn_id: &str) {
        if let Some(room) = self.directory.get_mut(room_id) {
            room.expire_fish(spawn_id);
        }
    }

    /// Handles a transport-level disconnect: always a clean leave. The
    /// departure is announced to the survivors and, if the room emptied,
    /// it is removed from the directory synchronously — before the next
    /// reaper tick.
    pub fn disconnect(&mut self, player_id: PlayerId) {
        let Some(room_id) = self.registry.unbind(player_id) else {
            tracing::debug!(%player_id, "disconnected without joining a room");
            return;
        };

        match self.directory.get_mut(&room_id) {
            Some(room) => {
                if let Err(err) = room.leave(player_id) {
                    tracing::debug!(%player_id, error = %err, "leave on disconnect");
                }
            }
            None => {
                tracing::debug!(%player_id, %room_id, "room already gone on disconnect");
            }
        }

        self.directory.remove_if_empty(&room_id);
    }

    /// Deletes empty rooms older than `retention`. Called by the periodic
    /// reaper; returns the reaped ids for logging.
    pub fn sweep_idle(
        &mut self,
        retention: std::time::Duration,
        now: std::time::Instant,
    ) -> Vec<RoomId> {
        self.directory.sweep_idle(retention, now)
    }

    /// Read access for tests and diagnostics.
    pub fn directory(&self) -> &RoomDirectory {
        &self.directory
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Resolves the room this player is a member of, logging the drop
    /// reason when there isn't one.
    fn member_room(&mut self, player_id: PlayerId) -> Option<&mut Room> {
        let Some(room_id) = self.registry.room_of(player_id).cloned() else {
            tracing::debug!(%player_id, "event from unjoined connection, dropping");
            return None;
        };
        let found = self
            .directory
            .get_mut(&room_id)
            .ok_or_else(|| RoomError::UnknownRoom(room_id));
        match found {
            Ok(room) => Some(room),
            Err(err) => {
                tracing::debug!(%player_id, error = %err, "event dropped");
                None
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
