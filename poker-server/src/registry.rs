//! The process-wide `room_id -> room actor mailbox` map. The one structure
//! still guarded by a real `RwLock`; it is held only for the lookup/insert,
//! never across a send into a room's mailbox.

use std::collections::HashMap;
use std::sync::RwLock;

use rand::Rng;
use tokio::sync::mpsc;

use crate::actor::ActorMsg;

#[derive(Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, mpsc::UnboundedSender<ActorMsg>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, room_id: &str) -> Option<mpsc::UnboundedSender<ActorMsg>> {
        self.rooms
            .read()
            .expect("room registry poisoned")
            .get(room_id)
            .cloned()
    }

    pub fn insert(&self, room_id: String, sender: mpsc::UnboundedSender<ActorMsg>) {
        self.rooms
            .write()
            .expect("room registry poisoned")
            .insert(room_id, sender);
    }

    pub fn remove(&self, room_id: &str) {
        self.rooms
            .write()
            .expect("room registry poisoned")
            .remove(room_id);
    }

    /// Generates a fresh 6-digit room id, retrying on the (very unlikely)
    /// collision with a room already registered.
    pub fn fresh_room_id(&self) -> String {
        let rooms = self.rooms.read().expect("room registry poisoned");
        loop {
            let candidate = format!("{:06}", rand::rng().random_range(0..1_000_000u32));
            if !rooms.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}
