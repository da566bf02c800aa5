//! A single room: member set, replicated player state, and broadcast fan-out.
//!
//! The room owns its player records and holds a back-reference (an outbound
//! channel sender) to each member's connection. It never owns the
//! connections themselves — the transport layer does. Sends are
//! fire-and-forget: a slow or dead connection is the transport's problem,
//! not the room's.

use std::collections::{BTreeMap, HashMap};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rand::Rng;
use reelcast_protocol::{
    FishSpawn, FishingLine, PlayerId, PlayerState, RoomId, ServerEvent,
};
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::{RelayConfig, RoomError};

/// Channel sender for delivering outbound events to one member's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// An isolated group of up to `max_players_per_room` connections sharing
/// broadcast scope.
///
/// Player records iterate in join order: player ids are connection ids,
/// which the transport hands out from a monotonic counter, so the ordered
/// map's key order is arrival order. The re-layout rule on leave depends
/// on this.
pub struct Room {
    id: RoomId,
    config: RelayConfig,
    players: BTreeMap<PlayerId, PlayerState>,
    senders: HashMap<PlayerId, PlayerSender>,
    fish_spawns: Vec<FishSpawn>,
    created_at: Instant,
}

impl Room {
    pub(crate) fn new(id: RoomId, config: RelayConfig) -> Self {
        Self {
            id,
            config,
            players: BTreeMap::new(),
            senders: HashMap::new(),
            fish_spawns: Vec::new(),
            created_at: Instant::now(),
        }
    }

    /// The room's identifier.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// When the room was created. The reaper measures idleness from this
    /// instant, not from when the room last emptied.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// The public player mapping, used to seed joining clients and refresh
    /// everyone after membership changes.
    pub fn snapshot(&self) -> BTreeMap<PlayerId, PlayerState> {
        self.players.clone()
    }

    /// Currently visible fish spawns (not yet expired).
    pub fn fish_spawns(&self) -> &[FishSpawn] {
        &self.fish_spawns
    }

    /// Adds a player at the next free dock slot and announces the join to
    /// everyone already present.
    ///
    /// The slot position is `base_x + index * spacing_x` where `index` is
    /// the member count before insertion — stable only until someone
    /// leaves, at which point [`leave`](Self::leave) re-lays everyone out.
    ///
    /// # Errors
    /// [`RoomError::RoomFull`] when the room is at capacity; membership is
    /// left untouched.
    pub fn join(
        &mut self,
        player_id: PlayerId,
        name: &str,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        if self.players.len() >= self.config.max_players_per_room {
            return Err(RoomError::RoomFull(self.id.clone()));
        }

        let index = self.players.len();
        let player = PlayerState {
            id: player_id,
            name: name.to_string(),
            x: self.config.base_x + index as f32 * self.config.spacing_x,
            y: self.config.spawn_y,
            score: 0,
            fish_count: 0,
            game_state: "ready".to_string(),
            fishing_line: FishingLine::default(),
        };
        self.players.insert(player_id, player);
        self.senders.insert(player_id, sender);

        tracing::info!(
            room_id = %self.id,
            %player_id,
            players = self.players.len(),
            "player joined"
        );

        self.broadcast_except(
            player_id,
            ServerEvent::PlayerJoined {
                player_id,
                player_name: name.to_string(),
                players: self.snapshot(),
            },
        );

        Ok(())
    }

    /// Removes a player, re-lays out the survivors, and announces the
    /// departure to everyone remaining.
    ///
    /// The re-layout re-indexes all survivors from slot 0 in join order —
    /// a full shuffle, not a gap-fill, so everyone after the leaver shifts
    /// left.
    pub fn leave(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        if self.players.remove(&player_id).is_none() {
            return Err(RoomError::NotAMember(player_id, self.id.clone()));
        }
        self.senders.remove(&player_id);

        for (index, player) in self.players.values_mut().enumerate() {
            player.x =
                self.config.base_x + index as f32 * self.config.spacing_x;
        }

        tracing::info!(
            room_id = %self.id,
            %player_id,
            players = self.players.len(),
            "player left"
        );

        self.broadcast(ServerEvent::PlayerLeft {
            player_id,
            players: self.snapshot(),
        });

        Ok(())
    }

    /// Shallow-merges a client-supplied partial into the player's record
    /// and echoes the same partial to every other member.
    ///
    /// Known replicated fields (`name`, `x`, `y`, `gameState`,
    /// `fishingLine`) overwrite the stored record when their values parse;
    /// anything else is forwarded but not stored. `id`, `score`, and
    /// `fishCount` are server-owned and never merged.
    pub fn apply_state_update(
        &mut self,
        player_id: PlayerId,
        fields: Map<String, Value>,
    ) -> Result<(), RoomError> {
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or_else(|| RoomError::NotAMember(player_id, self.id.clone()))?;

        merge_fields(player, &fields);

        self.broadcast_except(
            player_id,
            ServerEvent::PlayerStateUpdate { player_id, fields },
        );

        Ok(())
    }

    /// Applies a self-reported catch: score and fish count are incremented
    /// server-side and the new totals are announced to the whole room,
    /// sender included.
    ///
    /// The relay does not check that `fish_value` corresponds to any known
    /// fish, and two identical reports count twice.
    pub fn record_catch(
        &mut self,
        player_id: PlayerId,
        fish_name: &str,
        fish_value: i64,
    ) -> Result<(), RoomError> {
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or_else(|| RoomError::NotAMember(player_id, self.id.clone()))?;

        player.score += fish_value;
        player.fish_count += 1;
        let new_score = player.score;
        let new_fish_count = player.fish_count;
        let player_name = player.name.clone();

        self.broadcast(ServerEvent::PlayerCaughtFish {
            player_id,
            player_name,
            fish_name: fish_name.to_string(),
            fish_value,
            new_score,
            new_fish_count,
        });

        Ok(())
    }

    /// Wraps a chat line with the sender's identity and the current time,
    /// then delivers it to the whole room including the sender.
    ///
    /// No length limit, no filtering, no rate limiting.
    pub fn broadcast_chat(
        &self,
        player_id: PlayerId,
        message: &str,
    ) -> Result<(), RoomError> {
        let player = self
            .players
            .get(&player_id)
            .ok_or_else(|| RoomError::NotAMember(player_id, self.id.clone()))?;

        self.broadcast(ServerEvent::ChatMessage {
            player_id,
            player_name: player.name.clone(),
            message: message.to_string(),
            timestamp: epoch_millis(),
        });

        Ok(())
    }

    /// Tells everyone else that this player cast their line. Visual only,
    /// carries no state.
    pub fn broadcast_cast(&self, player_id: PlayerId) -> Result<(), RoomError> {
        if !self.players.contains_key(&player_id) {
            return Err(RoomError::NotAMember(player_id, self.id.clone()));
        }
        self.broadcast_except(player_id, ServerEvent::PlayerCast { player_id });
        Ok(())
    }

    /// Registers a fish spawn visible to the whole room and announces it.
    ///
    /// The returned spawn carries the generated id; the caller is
    /// responsible for scheduling [`expire_fish`](Self::expire_fish) after
    /// the configured time-to-live.
    pub fn spawn_fish(&mut self, data: Map<String, Value>) -> FishSpawn {
        let spawn = FishSpawn {
            id: spawn_id(),
            spawn_time: epoch_millis(),
            data,
        };
        self.fish_spawns.push(spawn.clone());
        self.broadcast(ServerEvent::FishSpawned(spawn.clone()));
        spawn
    }

    /// Drops a fish spawn from the list. A no-op if the spawn already
    /// expired or was never known — expiry timers may outlive their target.
    pub fn expire_fish(&mut self, spawn_id: &str) {
        self.fish_spawns.retain(|spawn| spawn.id != spawn_id);
    }

    /// Delivers an event to every member.
    fn broadcast(&self, event: ServerEvent) {
        for player_id in self.players.keys() {
            self.send_to(*player_id, event.clone());
        }
    }

    /// Delivers an event to every member except one.
    fn broadcast_except(&self, excluded: PlayerId, event: ServerEvent) {
        for player_id in self.players.keys() {
            if *player_id != excluded {
                self.send_to(*player_id, event.clone());
            }
        }
    }

    /// Sends an event to a single member. Silently drops if the receiver
    /// is gone (connection already closed).
    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(event);
        }
    }
}

/// Overwrites the replicated fields named in a client partial. Values that
/// fail to parse are skipped — a malformed payload is a tolerated trust
/// boundary, not an error.
fn merge_fields(player: &mut PlayerState, fields: &Map<String, Value>) {
    for (key, value) in fields {
        match key.as_str() {
            "name" => {
                if let Ok(name) = serde_json::from_value(value.clone()) {
                    player.name = name;
                }
            }
            "x" => {
                if let Ok(x) = serde_json::from_value(value.clone()) {
                    player.x = x;
                }
            }
            "y" => {
                if let Ok(y) = serde_json::from_value(value.clone()) {
                    player.y = y;
                }
            }
            "gameState" => {
                if let Ok(state) = serde_json::from_value(value.clone()) {
                    player.game_state = state;
                }
            }
            "fishingLine" => {
                if let Ok(line) =
                    serde_json::from_value::<FishingLine>(value.clone())
                {
                    player.fishing_line = line;
                }
            }
            // id, score, and fishCount are server-owned; unknown keys are
            // client-local extras the snapshot never carries.
            _ => {}
        }
    }
}

/// Milliseconds since the Unix epoch, for chat and spawn timestamps.
fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

/// Random 9-character lowercase base-36 spawn identifier.
fn spawn_id() -> String {
    const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::rng();
    (0..9)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
