mod connection;
mod role;
mod room;
mod signaling;

pub use connection::ConnectionId;
pub use role::Role;
pub use room::{DEFAULT_ROOM, RoomId};
pub use signaling::{
    IceServerConfig, Payload, Signal, SignalKind, SignalMessage, default_ice_servers,
};
