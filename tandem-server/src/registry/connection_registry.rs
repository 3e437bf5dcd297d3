use crate::error::BrokerError;
use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use dashmap::DashMap;
use tandem_core::{ConnectionId, RoomId, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, warn};

struct ConnectionEntry {
    outbox: mpsc::UnboundedSender<SignalMessage>,
    room: Option<RoomId>,
}

/// Live connections and the room each one currently sits in.
///
/// The room index lets disconnect cleanup go straight to the right room
/// instead of scanning the room table.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, outbox: mpsc::UnboundedSender<SignalMessage>) -> ConnectionId {
        let id = ConnectionId::new();
        self.connections
            .insert(id, ConnectionEntry { outbox, room: None });
        id
    }

    /// Drops the connection. Returns the room it was still recorded in, if any.
    pub fn unregister(&self, id: &ConnectionId) -> Option<RoomId> {
        self.connections
            .remove(id)
            .and_then(|(_, entry)| entry.room)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn room_of(&self, id: &ConnectionId) -> Option<RoomId> {
        self.connections.get(id).and_then(|e| e.room.clone())
    }

    pub(crate) fn set_room(
        &self,
        id: &ConnectionId,
        room: Option<RoomId>,
    ) -> Result<(), BrokerError> {
        let mut entry = self
            .connections
            .get_mut(id)
            .ok_or(BrokerError::UnknownConnection { connection: *id })?;
        entry.room = room;
        Ok(())
    }

    /// Queues `msg` on the connection's outbox. Returns false if it is gone.
    pub fn deliver(&self, id: &ConnectionId, msg: SignalMessage) -> bool {
        let Some(entry) = self.connections.get(id) else {
            warn!("Attempted to send signal to disconnected connection {}", id);
            return false;
        };
        if entry.outbox.send(msg).is_err() {
            debug!("Outbox of {} already closed", id);
            return false;
        }
        true
    }
}

#[async_trait]
impl SignalingOutput for ConnectionRegistry {
    async fn send(&self, to: ConnectionId, msg: SignalMessage) {
        self.deliver(&to, msg);
    }
}
