//! Core protocol types for Reelcast's wire format.
//!
//! Every event is a single JSON object with a camelCase `type` tag and the
//! payload fields inlined next to it, e.g.
//!
//! ```json
//! { "type": "joinRoom", "roomId": "ABC123", "playerName": "Alice" }
//! ```
//!
//! Field names are camelCase throughout because the reference clients are
//! browser-side JavaScript.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// A player's id IS its connection id — the relay assigns one per accepted
/// connection and never reuses it for the process lifetime.
///
/// `#[serde(transparent)]` makes `PlayerId(42)` serialize as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// A hand-rolled `Deserialize` (instead of `#[derive(Deserialize)]` +
// `#[serde(transparent)]`) so `PlayerId` can also be read from a JSON
// string. `ServerEvent`/`ClientEvent` are internally tagged, and serde
// deserializes internally-tagged enums via a buffered `Content`
// representation where map keys are always strings — so a `PlayerId` used
// as a `BTreeMap` key (e.g. `RoomJoined.players`) arrives as the string
// "7", not the number 7, even though it's serialized as a plain number.
impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PlayerIdVisitor;

        impl Visitor<'_> for PlayerIdVisitor {
            type Value = PlayerId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a u64 or a string containing one")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(PlayerId(v))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map(PlayerId).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(PlayerIdVisitor)
    }
}

/// A client-chosen room identifier, e.g. `"ABC123"`.
///
/// Rooms are created lazily on first join, so any string names a room.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Replicated player state
// ---------------------------------------------------------------------------

/// The client-reported fishing line snapshot, replicated so other clients
/// can draw this player's line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FishingLine {
    /// Whether the line is currently in the water.
    pub cast: bool,
    /// Vertical bobber position in canvas coordinates.
    pub bobber_y: f32,
}

impl Default for FishingLine {
    fn default() -> Self {
        Self {
            cast: false,
            bobber_y: 400.0,
        }
    }
}

/// The public, replicated record of one player in a room.
///
/// `score` and `fish_count` are server-authoritative (only `fishCaught`
/// moves them); everything else is client-reported and trusted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    /// Horizontal dock position, assigned by the room on join and
    /// re-assigned on every leave.
    pub x: f32,
    pub y: f32,
    pub score: i64,
    pub fish_count: u32,
    /// Client-local animation state (`"ready"`, `"casting"`, ...). The
    /// relay never interprets it.
    pub game_state: String,
    pub fishing_line: FishingLine,
}

/// A fish visible to everyone in a room, broadcast when spawned and
/// forgotten after a fixed time-to-live.
///
/// The spawn payload is opaque to the relay — whatever the spawning client
/// sent is flattened into the event unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FishSpawn {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub spawn_time: u64,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Inbound events (client → server)
// ---------------------------------------------------------------------------

/// Events a client may send. All except `joinRoom` are implicitly scoped to
/// the sender's joined room; the relay drops them silently if the sender
/// never joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Join (creating if needed) the given room.
    JoinRoom {
        room_id: RoomId,
        player_name: String,
    },

    /// Merge arbitrary partial fields into the sender's player record.
    /// There is no schema — the relay trusts the client and forwards the
    /// same partial to everyone else.
    UpdatePlayerState {
        #[serde(flatten)]
        fields: Map<String, Value>,
    },

    /// Self-reported catch. The relay increments score and fish count
    /// server-side and announces the new totals.
    FishCaught { fish_name: String, fish_value: i64 },

    /// Room-wide chat.
    SendChatMessage { message: String },

    /// The sender cast their line (visual only, no state).
    PlayerCast,

    /// Announce a fish that everyone in the room can see. Payload is
    /// opaque client data.
    SpawnFish {
        #[serde(flatten)]
        fish: Map<String, Value>,
    },
}

// ---------------------------------------------------------------------------
// Outbound events (server → client)
// ---------------------------------------------------------------------------

/// Events the relay sends to clients.
///
/// `players` mappings carry the full refreshed room snapshot so clients can
/// resync membership and positions after every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Reply to a successful `joinRoom`.
    RoomJoined {
        room_id: RoomId,
        players: BTreeMap<PlayerId, PlayerState>,
        player_id: PlayerId,
    },

    /// Reply to a `joinRoom` against a room at capacity.
    RoomFull,

    /// Someone else joined the sender's room.
    PlayerJoined {
        player_id: PlayerId,
        player_name: String,
        players: BTreeMap<PlayerId, PlayerState>,
    },

    /// Someone left; survivors have been re-laid out.
    PlayerLeft {
        player_id: PlayerId,
        players: BTreeMap<PlayerId, PlayerState>,
    },

    /// Echo of another player's `updatePlayerState` partial.
    PlayerStateUpdate {
        player_id: PlayerId,
        #[serde(flatten)]
        fields: Map<String, Value>,
    },

    /// Another player cast their line.
    PlayerCast { player_id: PlayerId },

    /// Someone (possibly the recipient) caught a fish; totals are the
    /// server-side counters after the increment.
    PlayerCaughtFish {
        player_id: PlayerId,
        player_name: String,
        fish_name: String,
        fish_value: i64,
        new_score: i64,
        new_fish_count: u32,
    },

    /// Room-wide chat line, echoed to the sender too.
    ChatMessage {
        player_id: PlayerId,
        player_name: String,
        message: String,
        /// Milliseconds since the Unix epoch.
        timestamp: u64,
    },

    /// A fish appeared in the room.
    FishSpawned(FishSpawn),
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The wire format is consumed by JavaScript clients, so these tests
    //! pin the exact JSON shapes: camelCase tags, camelCase keys, and
    //! transparent ids.

    use super::*;
    use serde_json::json;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    fn sample_player() -> PlayerState {
        PlayerState {
            id: pid(7),
            name: "Alice".into(),
            x: 200.0,
            y: 100.0,
            score: 0,
            fish_count: 0,
            game_state: "ready".into(),
            fishing_line: FishingLine::default(),
        }
    }

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&pid(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomId::new("ABC123")).unwrap();
        assert_eq!(json, "\"ABC123\"");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(pid(7).to_string(), "P-7");
    }

    // =====================================================================
    // Player state
    // =====================================================================

    #[test]
    fn test_player_state_uses_camel_case_keys() {
        let value = serde_json::to_value(sample_player()).unwrap();
        assert_eq!(value["fishCount"], 0);
        assert_eq!(value["gameState"], "ready");
        assert_eq!(value["fishingLine"]["bobberY"], 400.0);
        assert_eq!(value["fishingLine"]["cast"], false);
    }

    #[test]
    fn test_fishing_line_default_starts_out_of_water() {
        let line = FishingLine::default();
        assert!(!line.cast);
        assert_eq!(line.bobber_y, 400.0);
    }

    // =====================================================================
    // Client events — tag and payload shapes
    // =====================================================================

    #[test]
    fn test_join_room_json_format() {
        let event = ClientEvent::JoinRoom {
            room_id: RoomId::new("ABC123"),
            player_name: "Alice".into(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "joinRoom");
        assert_eq!(value["roomId"], "ABC123");
        assert_eq!(value["playerName"], "Alice");
    }

    #[test]
    fn test_update_player_state_captures_arbitrary_fields() {
        let raw = json!({
            "type": "updatePlayerState",
            "gameState": "casting",
            "fishingLine": { "cast": true, "bobberY": 312.5 },
            "luckyCharm": "horseshoe"
        });
        let event: ClientEvent = serde_json::from_value(raw).unwrap();
        match event {
            ClientEvent::UpdatePlayerState { fields } => {
                assert_eq!(fields["gameState"], "casting");
                assert_eq!(fields["luckyCharm"], "horseshoe");
                assert!(!fields.contains_key("type"), "tag must not leak into fields");
            }
            other => panic!("expected UpdatePlayerState, got {other:?}"),
        }
    }

    #[test]
    fn test_fish_caught_round_trip() {
        let event = ClientEvent::FishCaught {
            fish_name: "Golden Trout".into(),
            fish_value: 50,
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ClientEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_player_cast_is_bare_tag() {
        let value = serde_json::to_value(ClientEvent::PlayerCast).unwrap();
        assert_eq!(value, json!({ "type": "playerCast" }));
    }

    #[test]
    fn test_send_chat_message_round_trip() {
        let event = ClientEvent::SendChatMessage {
            message: "anything biting?".into(),
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ClientEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    // =====================================================================
    // Server events — tag and payload shapes
    // =====================================================================

    #[test]
    fn test_room_joined_json_format() {
        let mut players = BTreeMap::new();
        players.insert(pid(7), sample_player());
        let event = ServerEvent::RoomJoined {
            room_id: RoomId::new("ABC123"),
            players,
            player_id: pid(7),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "roomJoined");
        assert_eq!(value["roomId"], "ABC123");
        assert_eq!(value["playerId"], 7);
        assert_eq!(value["players"]["7"]["name"], "Alice");
    }

    #[test]
    fn test_room_full_is_bare_tag() {
        let value = serde_json::to_value(ServerEvent::RoomFull).unwrap();
        assert_eq!(value, json!({ "type": "roomFull" }));
    }

    #[test]
    fn test_player_state_update_flattens_partial() {
        let mut fields = Map::new();
        fields.insert("gameState".into(), json!("reeling"));
        let event = ServerEvent::PlayerStateUpdate {
            player_id: pid(3),
            fields,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "playerStateUpdate");
        assert_eq!(value["playerId"], 3);
        assert_eq!(value["gameState"], "reeling");
    }

    #[test]
    fn test_player_caught_fish_json_format() {
        let event = ServerEvent::PlayerCaughtFish {
            player_id: pid(3),
            player_name: "Bob".into(),
            fish_name: "Old Boot".into(),
            fish_value: -5,
            new_score: 45,
            new_fish_count: 2,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "playerCaughtFish");
        assert_eq!(value["newScore"], 45);
        assert_eq!(value["newFishCount"], 2);
        assert_eq!(value["fishValue"], -5);
    }

    #[test]
    fn test_chat_message_json_format() {
        let event = ServerEvent::ChatMessage {
            player_id: pid(1),
            player_name: "Alice".into(),
            message: "nice catch".into(),
            timestamp: 1_700_000_000_000,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "chatMessage");
        assert_eq!(value["playerName"], "Alice");
        assert_eq!(value["timestamp"], 1_700_000_000_000u64);
    }

    #[test]
    fn test_fish_spawned_flattens_spawn_data() {
        let mut data = Map::new();
        data.insert("species".into(), json!("bass"));
        let event = ServerEvent::FishSpawned(FishSpawn {
            id: "a1b2c3d4e".into(),
            spawn_time: 1_700_000_000_000,
            data,
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "fishSpawned");
        assert_eq!(value["id"], "a1b2c3d4e");
        assert_eq!(value["spawnTime"], 1_700_000_000_000u64);
        assert_eq!(value["species"], "bass");
    }

    #[test]
    fn test_player_left_round_trip() {
        let mut players = BTreeMap::new();
        players.insert(pid(2), sample_player());
        let event = ServerEvent::PlayerLeft {
            player_id: pid(9),
            players,
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    // =====================================================================
    // Error cases — malformed input
    // =====================================================================

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<ClientEvent, _> = serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_event_type_returns_error() {
        let unknown = r#"{"type": "teleportBoat", "speed": 9000}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_tag_returns_error() {
        let untagged = r#"{"roomId": "ABC123", "playerName": "Alice"}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(untagged);
        assert!(result.is_err());
    }
}
