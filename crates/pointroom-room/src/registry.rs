//! Room registry: maps room identifiers to running room actors.

use std::collections::HashMap;

use pointroom_protocol::{Codec, ParticipantId, RoomId, ServerEvent};
use tokio::sync::Mutex;

use crate::actor::spawn_room;
use crate::{RoomConfig, RoomHandle};

/// Every room in the process, created lazily on first reference.
///
/// Built once at server construction and shared by reference; nothing
/// looks rooms up through a global. Rooms are never evicted, so a room
/// lives as long as its registry.
pub struct RoomRegistry<C: Codec + Clone> {
    rooms: Mutex<HashMap<RoomId, RoomHandle>>,
    codec: C,
    config: RoomConfig,
}

impl<C: Codec + Clone> RoomRegistry<C> {
    /// Creates an empty registry. New rooms encode events with `codec`.
    pub fn new(codec: C, config: RoomConfig) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            codec,
            config,
        }
    }

    /// Returns the room for `room_id`, spawning an empty one if this is
    /// the first reference. Concurrent callers for the same id always get
    /// the same room.
    pub async fn get_or_create(&self, room_id: &RoomId) -> RoomHandle {
        let mut rooms = self.rooms.lock().await;
        if let Some(handle) = rooms.get(room_id) {
            return handle.clone();
        }

        let handle = spawn_room(
            room_id.clone(),
            self.codec.clone(),
            self.config.channel_capacity,
        );
        rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, rooms = rooms.len(), "room created");
        handle
    }

    /// Returns the room for `room_id` if it exists.
    pub async fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.lock().await.get(room_id).cloned()
    }

    /// Broadcasts `event` to a room. Does nothing if the room does not
    /// exist yet; never creates one.
    pub async fn broadcast(
        &self,
        room_id: &RoomId,
        event: ServerEvent,
        exclude: Option<ParticipantId>,
    ) {
        let Some(handle) = self.get(room_id).await else {
            return;
        };
        if let Err(e) = handle.broadcast(event, exclude).await {
            tracing::warn!(%room_id, error = %e, "broadcast failed");
        }
    }

    /// Returns the number of rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// Lists all room IDs.
    pub async fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.lock().await.keys().cloned().collect()
    }
}
