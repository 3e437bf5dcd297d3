use tandem_core::{ConnectionId, RoomId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("room '{room}' already has {capacity} members")]
    RoomFull { room: RoomId, capacity: usize },

    #[error("signal from {connection} dropped: not a member of any room")]
    OrphanSignal { connection: ConnectionId },

    #[error("connection {connection} is not registered")]
    UnknownConnection { connection: ConnectionId },
}
