//! Room directory: lazy creation and the two deletion paths.
//!
//! Rooms die in one of two ways, and both must coexist without
//! double-free surprises:
//!
//! 1. **Explicit**: after a leave empties a room, the dispatcher calls
//!    [`RoomDirectory::remove_if_empty`] synchronously.
//! 2. **Reaper**: a periodic [`RoomDirectory::sweep_idle`] deletes empty
//!    rooms older than the retention window.
//!
//! Removing an already-removed room is always a no-op.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reelcast_protocol::RoomId;

use crate::{RelayConfig, Room};

/// Maps room identifiers to live rooms. Process-wide, owned by the relay;
/// constructed once at startup and passed by handle (no global state).
pub struct RoomDirectory {
    rooms: HashMap<RoomId, Room>,
    config: RelayConfig,
}

impl RoomDirectory {
    /// Creates an empty directory.
    pub fn new(config: RelayConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
        }
    }

    /// Returns the room with this id, creating and registering an empty
    /// one if it doesn't exist yet. No error conditions.
    pub fn get_or_create(&mut self, room_id: &RoomId) -> &mut Room {
        self.rooms.entry(room_id.clone()).or_insert_with(|| {
            tracing::info!(room_id = %room_id, "room created");
            Room::new(room_id.clone(), self.config.clone())
        })
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    /// Deletes a room. Idempotent — removing an absent id is a no-op.
    pub fn remove(&mut self, room_id: &RoomId) {
        if self.rooms.remove(room_id).is_some() {
            tracing::info!(room_id = %room_id, "room destroyed");
        }
    }

    /// Deletes the room only if it has no members. Returns whether a
    /// deletion happened.
    pub fn remove_if_empty(&mut self, room_id: &RoomId) -> bool {
        match self.rooms.get(room_id) {
            Some(room) if room.is_empty() => {
                self.remove(room_id);
                true
            }
            _ => false,
        }
    }

    /// Deletes every empty room whose *creation* is older than `retention`,
    /// returning the reaped ids.
    ///
    /// Idleness is measured from `Room::created_at`, not from the moment
    /// the room became empty. A long-lived room can therefore be reaped on
    /// the first sweep after it empties, with no fresh grace period.
    pub fn sweep_idle(
        &mut self,
        retention: Duration,
        now: Instant,
    ) -> Vec<RoomId> {
        let mut reaped = Vec::new();
        self.rooms.retain(|room_id, room| {
            let stale = room.is_empty()
                && now.saturating_duration_since(room.created_at()) > retention;
            if stale {
                reaped.push(room_id.clone());
            }
            !stale
        });
        for room_id in &reaped {
            tracing::info!(room_id = %room_id, "idle room reaped");
        }
        reaped
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Ids of all live rooms.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcast_protocol::PlayerId;
    use tokio::sync::mpsc;

    fn rid(id: &str) -> RoomId {
        RoomId::new(id)
    }

    fn directory() -> RoomDirectory {
        RoomDirectory::new(RelayConfig::default())
    }

    #[test]
    fn test_get_or_create_creates_once() {
        let mut dir = directory();
        dir.get_or_create(&rid("ABC123"));
        dir.get_or_create(&rid("ABC123"));
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.room_ids(), vec![rid("ABC123")]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut dir = directory();
        dir.get_or_create(&rid("ABC123"));

        dir.remove(&rid("ABC123"));
        assert!(dir.is_empty());

        // Second removal of the same id must be a no-op.
        dir.remove(&rid("ABC123"));
        assert!(dir.is_empty());
    }

    #[test]
    fn test_remove_if_empty_spares_occupied_rooms() {
        let mut dir = directory();
        let (tx, _rx) = mpsc::unbounded_channel();
        dir.get_or_create(&rid("ABC123"))
            .join(PlayerId(1), "Alice", tx)
            .unwrap();

        assert!(!dir.remove_if_empty(&rid("ABC123")));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_sweep_idle_reaps_old_empty_rooms_only() {
        let mut dir = directory();
        dir.get_or_create(&rid("OLD"));
        let (tx, _rx) = mpsc::unbounded_channel();
        dir.get_or_create(&rid("BUSY"))
            .join(PlayerId(1), "Alice", tx)
            .unwrap();

        // Pretend the retention window has elapsed since creation.
        let later = Instant::now() + Duration::from_secs(301);
        let reaped = dir.sweep_idle(Duration::from_secs(300), later);

        assert_eq!(reaped, vec![rid("OLD")]);
        assert!(dir.get(&rid("OLD")).is_none());
        assert!(dir.get(&rid("BUSY")).is_some(), "occupied room must survive");
    }

    #[test]
    fn test_sweep_idle_spares_young_empty_rooms() {
        let mut dir = directory();
        dir.get_or_create(&rid("YOUNG"));

        let reaped =
            dir.sweep_idle(Duration::from_secs(300), Instant::now());

        assert!(reaped.is_empty());
        assert!(dir.get(&rid("YOUNG")).is_some());
    }

    #[test]
    fn test_sweep_idle_measures_from_creation_not_emptying() {
        // The retention clock starts at creation. A room that was occupied
        // for its whole life gets reaped on the first sweep after it
        // empties, with no fresh grace period.
        let mut dir = directory();
        let (tx, _rx) = mpsc::unbounded_channel();
        let room = dir.get_or_create(&rid("VETERAN"));
        room.join(PlayerId(1), "Alice", tx).unwrap();
        room.leave(PlayerId(1)).unwrap();

        let later = Instant::now() + Duration::from_secs(301);
        let reaped = dir.sweep_idle(Duration::from_secs(300), later);

        assert_eq!(reaped, vec![rid("VETERAN")]);
    }
}
