use crate::config::MAX_MEMBERS_PER_ROOM;
use crate::error::BrokerError;
use crate::registry::ConnectionRegistry;
use crate::room::Room;
use crate::room::role_assignor::{assign_on_join, promote_after_leave};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tandem_core::{ConnectionId, Role, RoomId};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub room: RoomId,
    pub role: Role,
    /// Members already present before the join, in join order. Empty on a rejoin.
    pub existing: Vec<ConnectionId>,
    /// The connection was already a member; nothing changed.
    pub rejoined: bool,
    /// Set when the connection had to leave another room first.
    pub left: Option<LeaveOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub room: RoomId,
    pub remaining: Vec<ConnectionId>,
    /// Survivor that just became initiator.
    pub promoted: Option<ConnectionId>,
    pub room_deleted: bool,
}

/// Room id → members and initiator.
///
/// Every mutation runs under the map entry lock for that room id, so joins
/// and leaves on one room are serialized while different rooms only share a
/// shard lock for the length of a single mutation.
pub struct RoomTable {
    rooms: DashMap<RoomId, Room>,
    registry: Arc<ConnectionRegistry>,
}

impl RoomTable {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            rooms: DashMap::new(),
            registry,
        }
    }

    pub fn join(
        &self,
        connection: ConnectionId,
        room_id: RoomId,
    ) -> Result<JoinOutcome, BrokerError> {
        if !self.registry.contains(&connection) {
            return Err(BrokerError::UnknownConnection { connection });
        }

        let current = self.registry.room_of(&connection);

        // The seat in the target room is taken under its lock first; a full
        // room rejects before the current room is touched.
        let (role, existing, rejoined) = {
            let mut room = self.rooms.entry(room_id.clone()).or_default();
            match room.role_of(&connection) {
                Some(role) => (role, Vec::new(), true),
                None => {
                    if room.len() >= MAX_MEMBERS_PER_ROOM {
                        return Err(room_full(room_id));
                    }
                    let existing = room.members.clone();
                    let role = assign_on_join(&mut room, connection);
                    (role, existing, false)
                }
            }
        };

        let left = match current {
            Some(old) if old != room_id => self.leave_room(&old, &connection),
            _ => None,
        };

        if let Err(e) = self.registry.set_room(&connection, Some(room_id.clone())) {
            self.leave_room(&room_id, &connection);
            return Err(e);
        }

        if rejoined {
            debug!("Connection {} rejoined room '{}' as {}", connection, room_id, role);
        } else {
            info!(
                "Connection {} joined room '{}' as {} ({} members)",
                connection,
                room_id,
                role,
                existing.len() + 1
            );
        }

        Ok(JoinOutcome {
            room: room_id,
            role,
            existing,
            rejoined,
            left,
        })
    }

    /// Removes the connection from its room, if it has one.
    pub fn leave(&self, connection: &ConnectionId) -> Option<LeaveOutcome> {
        let room_id = self.registry.room_of(connection)?;
        let outcome = self.leave_room(&room_id, connection);
        // Unregistered already during disconnect cleanup; nothing to clear then.
        let _ = self.registry.set_room(connection, None);
        outcome
    }

    fn leave_room(&self, room_id: &RoomId, connection: &ConnectionId) -> Option<LeaveOutcome> {
        let Entry::Occupied(mut entry) = self.rooms.entry(room_id.clone()) else {
            return None;
        };

        let room = entry.get_mut();
        if !room.remove(connection) {
            return None;
        }
        let promoted = promote_after_leave(room, connection);
        let remaining = room.members.clone();
        let room_deleted = remaining.is_empty();
        if room_deleted {
            entry.remove();
        }

        info!(
            "Connection {} left room '{}' ({} remaining)",
            connection,
            room_id,
            remaining.len()
        );
        if let Some(p) = &promoted {
            info!("Connection {} promoted to initiator in room '{}'", p, room_id);
        }

        Some(LeaveOutcome {
            room: room_id.clone(),
            remaining,
            promoted,
            room_deleted,
        })
    }

    /// Members of `room_id` in join order. Empty if the room does not exist.
    pub fn current_members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|room| room.members.clone())
            .unwrap_or_default()
    }

    pub fn role_of(&self, connection: &ConnectionId) -> Option<Role> {
        let room_id = self.registry.room_of(connection)?;
        self.rooms.get(&room_id)?.role_of(connection)
    }

    pub fn initiator_of(&self, room_id: &RoomId) -> Option<ConnectionId> {
        self.rooms.get(room_id).and_then(|room| room.initiator)
    }

    /// Consistent snapshot of everyone in `room_id` except `sender`.
    /// `None` when `sender` is not a member.
    pub fn peers_of(&self, room_id: &RoomId, sender: &ConnectionId) -> Option<Vec<ConnectionId>> {
        let room = self.rooms.get(room_id)?;
        room.contains(sender).then(|| room.others(sender))
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

fn room_full(room: RoomId) -> BrokerError {
    BrokerError::RoomFull {
        room,
        capacity: MAX_MEMBERS_PER_ROOM,
    }
}
