use crate::model::connection::ConnectionId;
use crate::model::role::Role;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// Public STUN servers used when nothing else is configured.
pub fn default_ice_servers() -> Vec<IceServerConfig> {
    vec![
        IceServerConfig::stun("stun:stun.l.google.com:19302"),
        IceServerConfig::stun("stun:stun1.l.google.com:19302"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Offer => write!(f, "offer"),
            SignalKind::Answer => write!(f, "answer"),
            SignalKind::Candidate => write!(f, "candidate"),
        }
    }
}

/// Opaque negotiation blob. Only the peer-connection engine at either end
/// knows what is inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(pub serde_json::Value);

impl Payload {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// The unit carried by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub room: RoomId,
    pub kind: SignalKind,
    pub payload: Payload,
}

impl Signal {
    pub fn new(room: RoomId, kind: SignalKind, payload: Payload) -> Self {
        Self {
            room,
            kind,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum SignalMessage {
    Welcome {
        connection_id: ConnectionId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    Join {
        #[serde(default)]
        room: Option<String>,
    },
    Role {
        room: RoomId,
        role: Role,
    },
    PeerJoined {
        room: RoomId,
        connection_id: ConnectionId,
    },
    JoinRejected {
        room: RoomId,
        reason: String,
    },
    Signal(Signal),
}

impl SignalMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
