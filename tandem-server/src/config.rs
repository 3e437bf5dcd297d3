use serde::{Deserialize, Serialize};
use tandem_core::{IceServerConfig, RoomId, default_ice_servers};

/// Sessions are strictly pairwise.
pub const MAX_MEMBERS_PER_ROOM: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Room used when a client joins without naming one.
    #[serde(default)]
    pub default_room: RoomId,
    /// Handed to every client right after it connects.
    #[serde(default = "default_ice_servers")]
    pub ice_servers: Vec<IceServerConfig>,
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            default_room: RoomId::default(),
            ice_servers: default_ice_servers(),
        }
    }
}
