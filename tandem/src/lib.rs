pub use tandem_core::{ConnectionId, Role, RoomId};

pub mod model {
    pub use tandem_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use tandem_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use tandem_peer::*;
}
