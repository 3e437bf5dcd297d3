use crate::config::BrokerConfig;
use crate::error::BrokerError;
use crate::registry::ConnectionRegistry;
use crate::room::{LeaveOutcome, RoomTable};
use crate::signaling::{SignalRelay, SignalingOutput};
use std::sync::Arc;
use tandem_core::{ConnectionId, Role, RoomId, SignalMessage};
use tokio::sync::mpsc;
use tracing::{info, warn};

struct SignalingInner {
    config: BrokerConfig,
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomTable>,
    relay: SignalRelay,
    output: Arc<dyn SignalingOutput>,
}

/// Connection lifecycle for the broker: connect, per-message handling and
/// disconnect cleanup. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    /// Messages are delivered through the connections' own outboxes.
    pub fn new(config: BrokerConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let output: Arc<dyn SignalingOutput> = registry.clone();
        Self::build(config, registry, output)
    }

    /// Routes every outgoing message through `output` instead of the outboxes.
    pub fn with_output(config: BrokerConfig, output: Arc<dyn SignalingOutput>) -> Self {
        Self::build(config, Arc::new(ConnectionRegistry::new()), output)
    }

    fn build(
        config: BrokerConfig,
        registry: Arc<ConnectionRegistry>,
        output: Arc<dyn SignalingOutput>,
    ) -> Self {
        let rooms = Arc::new(RoomTable::new(registry.clone()));
        let relay = SignalRelay::new(registry.clone(), rooms.clone(), output.clone());
        Self {
            inner: Arc::new(SignalingInner {
                config,
                registry,
                rooms,
                relay,
                output,
            }),
        }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.inner.registry
    }

    pub fn rooms(&self) -> &RoomTable {
        &self.inner.rooms
    }

    /// Registers a new client and greets it with its id and the ICE servers.
    pub async fn connect(&self, outbox: mpsc::UnboundedSender<SignalMessage>) -> ConnectionId {
        let id = self.inner.registry.register(outbox);
        info!("Connection {} registered", id);

        let output = &self.inner.output;
        output
            .send(id, SignalMessage::Welcome { connection_id: id })
            .await;
        output
            .send(
                id,
                SignalMessage::IceConfig {
                    ice_servers: self.inner.config.ice_servers.clone(),
                },
            )
            .await;
        id
    }

    pub async fn handle_message(
        &self,
        from: ConnectionId,
        msg: SignalMessage,
    ) -> Result<(), BrokerError> {
        match msg {
            SignalMessage::Join { room } => {
                let room = RoomId::or_default(room.as_deref(), &self.inner.config.default_room);
                self.join(from, room).await
            }
            SignalMessage::Signal(signal) => {
                self.inner.relay.relay(from, signal).await?;
                Ok(())
            }
            other => {
                warn!("Ignoring broker-only message from {}: {:?}", from, other);
                Ok(())
            }
        }
    }

    pub async fn join(&self, connection: ConnectionId, room: RoomId) -> Result<(), BrokerError> {
        let output = &self.inner.output;

        let outcome = match self.inner.rooms.join(connection, room.clone()) {
            Ok(outcome) => outcome,
            Err(e @ BrokerError::RoomFull { .. }) => {
                warn!("Rejected join of {}: {}", connection, e);
                output
                    .send_join_rejected(connection, room, e.to_string())
                    .await;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if let Some(left) = outcome.left {
            self.announce_leave(left).await;
        }

        output
            .send_role(connection, outcome.room.clone(), outcome.role)
            .await;
        for peer in outcome.existing {
            output
                .send_peer_joined(peer, outcome.room.clone(), connection)
                .await;
        }
        Ok(())
    }

    /// Transport-level disconnect: leave the room, hand off the initiator
    /// role if needed and forget the connection.
    pub async fn disconnect(&self, connection: ConnectionId) {
        if let Some(left) = self.inner.rooms.leave(&connection) {
            self.announce_leave(left).await;
        }
        self.inner.registry.unregister(&connection);
        info!("Connection {} unregistered", connection);
    }

    async fn announce_leave(&self, left: LeaveOutcome) {
        let Some(promoted) = left.promoted else {
            return;
        };
        self.inner
            .output
            .send_role(promoted, left.room, Role::Initiator)
            .await;
    }
}
