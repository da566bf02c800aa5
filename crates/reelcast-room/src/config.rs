//! Relay configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the room relay.
///
/// Tests shrink the windows to keep themselves fast; production runs the
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Maximum players allowed in a room.
    pub max_players_per_room: usize,

    /// Horizontal position of the first player slot.
    pub base_x: f32,

    /// Horizontal spacing between player slots.
    pub spacing_x: f32,

    /// Vertical position every player starts at.
    pub spawn_y: f32,

    /// How old an empty room must be before the reaper deletes it.
    ///
    /// Measured from room *creation*, not from the moment the room became
    /// empty — see [`RoomDirectory::sweep_idle`](crate::RoomDirectory::sweep_idle).
    pub idle_retention: Duration,

    /// How often the idle-room reaper runs.
    pub reaper_interval: Duration,

    /// How long a broadcast fish spawn stays in a room's spawn list.
    pub fish_spawn_ttl: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_players_per_room: 4,
            base_x: 200.0,
            spacing_x: 50.0,
            spawn_y: 100.0,
            idle_retention: Duration::from_secs(300),
            reaper_interval: Duration::from_secs(60),
            fish_spawn_ttl: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_config_default() {
        let config = RelayConfig::default();
        assert_eq!(config.max_players_per_room, 4);
        assert_eq!(config.base_x, 200.0);
        assert_eq!(config.spacing_x, 50.0);
        assert_eq!(config.idle_retention, Duration::from_secs(300));
        assert_eq!(config.reaper_interval, Duration::from_secs(60));
        assert_eq!(config.fish_spawn_ttl, Duration::from_secs(30));
    }
}
