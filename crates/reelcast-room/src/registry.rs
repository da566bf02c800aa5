//! Connection registry: which room each live connection belongs to.

use std::collections::HashMap;

use reelcast_protocol::{PlayerId, RoomId};

/// Maps each connection's player id to the room it joined.
///
/// A connection is in at most one room at a time (key invariant). The
/// observed protocol has no room-switching: a binding only goes away when
/// the connection does.
#[derive(Default)]
pub struct ConnectionRegistry {
    rooms_by_player: HashMap<PlayerId, RoomId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a connection joined a room.
    pub fn bind(&mut self, player_id: PlayerId, room_id: RoomId) {
        self.rooms_by_player.insert(player_id, room_id);
    }

    /// Clears a connection's binding, returning the room it was in.
    /// Idempotent — unbinding an unknown connection returns `None`.
    pub fn unbind(&mut self, player_id: PlayerId) -> Option<RoomId> {
        self.rooms_by_player.remove(&player_id)
    }

    /// The room this connection is in, if it joined one.
    pub fn room_of(&self, player_id: PlayerId) -> Option<&RoomId> {
        self.rooms_by_player.get(&player_id)
    }

    pub fn len(&self) -> usize {
        self.rooms_by_player.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms_by_player.is_empty()
    }
}
