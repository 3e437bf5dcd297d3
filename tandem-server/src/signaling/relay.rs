use crate::error::BrokerError;
use crate::registry::ConnectionRegistry;
use crate::room::RoomTable;
use crate::signaling::SignalingOutput;
use std::sync::Arc;
use tandem_core::{ConnectionId, Signal};
use tracing::debug;

/// Fans a signal out to everyone else in the sender's room. Never looks at
/// the payload.
#[derive(Clone)]
pub struct SignalRelay {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomTable>,
    output: Arc<dyn SignalingOutput>,
}

impl SignalRelay {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomTable>,
        output: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            registry,
            rooms,
            output,
        }
    }

    /// Returns how many peers the signal went to. The room named inside the
    /// signal is replaced by the sender's actual room.
    pub async fn relay(&self, sender: ConnectionId, signal: Signal) -> Result<usize, BrokerError> {
        let orphan = || BrokerError::OrphanSignal { connection: sender };

        let room = self.registry.room_of(&sender).ok_or_else(orphan)?;
        if room != signal.room {
            debug!(
                "Connection {} addressed room '{}' but is in '{}'",
                sender, signal.room, room
            );
        }
        // Snapshot is taken under the room lock; sends happen after it is released.
        let peers = self.rooms.peers_of(&room, &sender).ok_or_else(orphan)?;

        let signal = Signal { room, ..signal };
        for peer in &peers {
            self.output.send_signal(*peer, signal.clone()).await;
        }

        debug!(
            "Relayed {} from {} in room '{}' to {} peer(s)",
            signal.kind,
            sender,
            signal.room,
            peers.len()
        );
        Ok(peers.len())
    }
}
