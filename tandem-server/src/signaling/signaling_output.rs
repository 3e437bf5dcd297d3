use async_trait::async_trait;
use tandem_core::{ConnectionId, Role, RoomId, Signal, SignalMessage};

/// Outgoing side of the broker: whatever can deliver a message to a
/// connected client (the WebSocket registry in production, a recorder in tests).
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send(&self, to: ConnectionId, msg: SignalMessage);

    async fn send_role(&self, to: ConnectionId, room: RoomId, role: Role) {
        self.send(to, SignalMessage::Role { room, role }).await;
    }

    async fn send_peer_joined(&self, to: ConnectionId, room: RoomId, peer: ConnectionId) {
        self.send(
            to,
            SignalMessage::PeerJoined {
                room,
                connection_id: peer,
            },
        )
        .await;
    }

    async fn send_join_rejected(&self, to: ConnectionId, room: RoomId, reason: String) {
        self.send(to, SignalMessage::JoinRejected { room, reason })
            .await;
    }

    async fn send_signal(&self, to: ConnectionId, signal: Signal) {
        self.send(to, SignalMessage::Signal(signal)).await;
    }
}
