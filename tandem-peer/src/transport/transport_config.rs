use serde::{Deserialize, Serialize};
use tandem_core::{IceServerConfig, default_ice_servers};

/// WebRTC settings (STUN/TURN).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Used when the broker does not advertise any servers of its own.
    #[serde(default = "default_ice_servers")]
    pub ice_servers: Vec<IceServerConfig>,
    #[serde(default = "default_channel_label")]
    pub channel_label: String,
}

fn default_channel_label() -> String {
    "chat".to_string()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: default_ice_servers(),
            channel_label: default_channel_label(),
        }
    }
}

impl TransportConfig {
    /// Local-only: no STUN, host candidates only.
    pub fn local() -> Self {
        Self {
            ice_servers: Vec::new(),
            ..Self::default()
        }
    }
}
