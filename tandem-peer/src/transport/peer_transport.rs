use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use tandem_core::{IceServerConfig, Payload, Role};
use tokio::sync::mpsc;

/// The peer-connection engine as seen by the negotiator. Descriptions and
/// candidates stay opaque on this side of the seam.
#[async_trait]
pub trait PeerTransport: Send + Sync + 'static {
    async fn create_offer(&self) -> Result<Payload>;

    async fn create_answer(&self) -> Result<Payload>;

    async fn set_local_description(&self, description: Payload) -> Result<()>;

    async fn set_remote_description(&self, description: Payload) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: Payload) -> Result<()>;

    /// Sends over the direct data path once it is open.
    async fn send(&self, data: Bytes) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Reported by a transport while it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A local network path was found and should go to the peer.
    CandidateGenerated(Payload),
    ChannelOpen,
    Message(Bytes),
    Closed,
}

/// Tags every event with the generation of the transport that produced it,
/// so events from a discarded transport can be told apart.
#[derive(Debug, Clone)]
pub struct TransportEventSender {
    generation: u64,
    tx: mpsc::UnboundedSender<(u64, TransportEvent)>,
}

impl TransportEventSender {
    pub fn new(generation: u64, tx: mpsc::UnboundedSender<(u64, TransportEvent)>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn emit(&self, event: TransportEvent) {
        // Receiver gone means the session is shutting down.
        let _ = self.tx.send((self.generation, event));
    }
}

/// Builds one transport per negotiation attempt.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    type Transport: PeerTransport;

    async fn create(
        &self,
        role: Role,
        ice_servers: &[IceServerConfig],
        events: TransportEventSender,
    ) -> Result<Self::Transport>;
}
