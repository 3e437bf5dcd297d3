use bytes::Bytes;
use tandem_core::{ConnectionId, Role, RoomId};

/// What a participant reports to the layer above it (UI, CLI, tests).
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    Welcome(ConnectionId),
    RoleAssigned { room: RoomId, role: Role },
    PeerJoined(ConnectionId),
    JoinRejected { room: RoomId, reason: String },
    /// Both descriptions are in place and the data path is open.
    ChannelReady,
    /// The engine rejected a description; negotiation went back to idle.
    NegotiationFailed { reason: String },
    /// The engine rejected a single remote candidate; negotiation continues.
    CandidateRejected { reason: String },
    Message(Bytes),
    ChannelClosed,
}
