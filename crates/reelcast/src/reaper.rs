//! Scheduled background work: the idle-room reaper and per-spawn expiry.
//!
//! Neither timer is cancellable. A timer whose target is already gone
//! finds the corresponding removal a no-op and moves on.

use std::sync::Arc;
use std::time::Instant;

use reelcast_protocol::RoomId;

use crate::server::ServerState;

/// Starts the periodic sweep that deletes rooms which have sat empty past
/// the retention window.
///
/// The window is measured from room creation (see
/// [`RoomDirectory::sweep_idle`](reelcast_room::RoomDirectory::sweep_idle)),
/// and a room removed by the explicit post-disconnect path before the next
/// tick simply isn't there to reap.
pub(crate) fn spawn_idle_reaper(state: Arc<ServerState>) {
    let period = state.config.reaper_interval;
    let retention = state.config.idle_retention;

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first interval tick fires immediately; the first sweep
        // should happen one full period after startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let reaped = state
                .relay
                .lock()
                .await
                .sweep_idle(retention, Instant::now());
            if !reaped.is_empty() {
                tracing::debug!(count = reaped.len(), "idle sweep complete");
            }
        }
    });
}

/// Schedules the fire-and-forget removal of a fish spawn after its
/// time-to-live. Tolerates the room or the spawn being gone by then.
pub(crate) fn schedule_fish_expiry(
    state: Arc<ServerState>,
    room_id: RoomId,
    spawn_id: String,
) {
    let ttl = state.config.fish_spawn_ttl;
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        state.relay.lock().await.expire_fish(&room_id, &spawn_id);
        tracing::trace!(%room_id, %spawn_id, "fish spawn expired");
    });
}
