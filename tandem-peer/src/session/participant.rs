use crate::event::PeerEvent;
use crate::negotiation::{Negotiator, SignalingPhase};
use crate::session::BrokerSink;
use crate::transport::{PeerTransport, TransportEvent, TransportEventSender, TransportFactory};
use anyhow::{Result, bail};
use bytes::Bytes;
use tandem_core::{ConnectionId, IceServerConfig, Role, RoomId, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub type TransportEventReceiver = mpsc::UnboundedReceiver<(u64, TransportEvent)>;

/// One end of a room: reacts to broker messages and transport events and owns
/// the current negotiation attempt.
///
/// Every attempt gets a fresh transport tagged with a new generation. Events
/// still in flight from an older transport carry the old generation and are
/// ignored.
pub struct Participant<F: TransportFactory> {
    factory: F,
    outbound: mpsc::UnboundedSender<SignalMessage>,
    transport_tx: mpsc::UnboundedSender<(u64, TransportEvent)>,
    events: mpsc::UnboundedSender<PeerEvent>,
    connection_id: Option<ConnectionId>,
    ice_servers: Vec<IceServerConfig>,
    room: Option<RoomId>,
    role: Option<Role>,
    peer_present: bool,
    generation: u64,
    negotiator: Option<Negotiator<F::Transport, BrokerSink>>,
}

impl<F: TransportFactory> Participant<F> {
    /// `outbound` carries messages for the broker. The returned receiver
    /// yields transport events, to be fed back through
    /// [`Participant::handle_transport`].
    pub fn new(
        factory: F,
        outbound: mpsc::UnboundedSender<SignalMessage>,
        events: mpsc::UnboundedSender<PeerEvent>,
    ) -> (Self, TransportEventReceiver) {
        let (transport_tx, transport_rx) = mpsc::unbounded_channel();
        let participant = Self {
            factory,
            outbound,
            transport_tx,
            events,
            connection_id: None,
            ice_servers: Vec::new(),
            room: None,
            role: None,
            peer_present: false,
            generation: 0,
            negotiator: None,
        };
        (participant, transport_rx)
    }

    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection_id
    }

    pub fn room(&self) -> Option<&RoomId> {
        self.room.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn peer_present(&self) -> bool {
        self.peer_present
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Option<SignalingPhase> {
        self.negotiator.as_ref().map(Negotiator::phase)
    }

    pub fn negotiator(&self) -> Option<&Negotiator<F::Transport, BrokerSink>> {
        self.negotiator.as_ref()
    }

    pub fn is_channel_ready(&self) -> bool {
        self.negotiator
            .as_ref()
            .is_some_and(Negotiator::is_channel_ready)
    }

    /// Asks the broker for a room. `None` lets the broker pick its default.
    pub fn join(&self, room: Option<&str>) {
        let msg = SignalMessage::Join {
            room: room.map(str::to_owned),
        };
        if self.outbound.send(msg).is_err() {
            warn!("Broker connection gone, join not sent");
        }
    }

    pub async fn send(&self, data: Bytes) -> Result<()> {
        match &self.negotiator {
            Some(n) if n.is_channel_ready() => n.transport().send(data).await,
            _ => bail!("no open channel to a peer"),
        }
    }

    pub async fn handle_broker(&mut self, msg: SignalMessage) -> Result<()> {
        match msg {
            SignalMessage::Welcome { connection_id } => {
                info!("Connected to broker as {}", connection_id);
                self.connection_id = Some(connection_id);
                self.emit(PeerEvent::Welcome(connection_id));
            }

            SignalMessage::IceConfig { ice_servers } => {
                debug!("Received ICE config: {} server(s)", ice_servers.len());
                self.ice_servers = ice_servers;
            }

            SignalMessage::Role { room, role } => self.on_role(room, role).await?,

            SignalMessage::PeerJoined {
                room,
                connection_id,
            } => {
                if self.room.as_ref() != Some(&room) {
                    debug!("Ignoring peer-joined for {}", room);
                    return Ok(());
                }
                info!("Peer {} joined {}", connection_id, room);
                self.peer_present = true;
                self.emit(PeerEvent::PeerJoined(connection_id));

                if self.role == Some(Role::Initiator) {
                    self.start_call(room).await?;
                }
            }

            SignalMessage::JoinRejected { room, reason } => {
                warn!("Join to {} rejected: {}", room, reason);
                self.emit(PeerEvent::JoinRejected { room, reason });
            }

            SignalMessage::Signal(signal) => {
                if self.room.as_ref() != Some(&signal.room) {
                    debug!("Dropping {} for room {}", signal.kind, signal.room);
                    return Ok(());
                }
                let Some(negotiator) = self.negotiator.as_mut() else {
                    warn!("Dropping {}: no negotiation in progress", signal.kind);
                    return Ok(());
                };
                // Rejections are already logged and reported as events.
                let _ = negotiator.handle_remote(signal.kind, signal.payload).await;
            }

            other => warn!("Unexpected message from broker: {:?}", other),
        }
        Ok(())
    }

    pub async fn handle_transport(&mut self, generation: u64, event: TransportEvent) {
        if generation != self.generation {
            debug!(
                "Ignoring event from transport generation {} (current {})",
                generation, self.generation
            );
            return;
        }
        let Some(negotiator) = self.negotiator.as_mut() else {
            return;
        };

        match event {
            TransportEvent::CandidateGenerated(candidate) => {
                let _ = negotiator.local_candidate(candidate).await;
            }
            TransportEvent::ChannelOpen => negotiator.transport_ready(),
            TransportEvent::Message(data) => self.emit(PeerEvent::Message(data)),
            TransportEvent::Closed => {
                info!("Peer connection closed");
                self.emit(PeerEvent::ChannelClosed);
            }
        }
    }

    pub async fn shutdown(&mut self) {
        if let Some(negotiator) = self.negotiator.take() {
            negotiator.close().await;
        }
        self.generation += 1;
    }

    async fn on_role(&mut self, room: RoomId, role: Role) -> Result<()> {
        let unchanged = self.room.as_ref() == Some(&room)
            && self.role == Some(role)
            && self.negotiator.is_some();

        if unchanged {
            debug!("Role in {} confirmed again: {}", room, role);
        } else {
            info!("Assigned {} in {}", role, room);
            if self.role == Some(Role::Receiver) && role == Role::Initiator {
                info!("Promoted to initiator, discarding current negotiation");
            }
            // A receiver joins a room whose initiator is already there; an
            // initiator waits for somebody to arrive.
            self.peer_present = role == Role::Receiver;
            self.room = Some(room.clone());
            self.role = Some(role);
            self.reset(role, room.clone()).await?;
        }

        self.emit(PeerEvent::RoleAssigned { room, role });
        Ok(())
    }

    async fn start_call(&mut self, room: RoomId) -> Result<()> {
        let idle = self
            .negotiator
            .as_ref()
            .is_some_and(|n| n.phase() == SignalingPhase::Idle && !n.has_local_description());
        if !idle {
            debug!("New peer arrived, starting a fresh negotiation");
            self.reset(Role::Initiator, room).await?;
        }

        if let Some(negotiator) = self.negotiator.as_mut() {
            let _ = negotiator.start_call().await;
        }
        Ok(())
    }

    async fn reset(&mut self, role: Role, room: RoomId) -> Result<()> {
        if let Some(old) = self.negotiator.take() {
            old.close().await;
        }
        self.generation += 1;

        let events = TransportEventSender::new(self.generation, self.transport_tx.clone());
        let transport = self
            .factory
            .create(role, &self.ice_servers, events)
            .await?;
        let sink = BrokerSink::new(room, self.outbound.clone());
        self.negotiator = Some(Negotiator::new(role, transport, sink, self.events.clone()));
        Ok(())
    }

    fn emit(&self, event: PeerEvent) {
        let _ = self.events.send(event);
    }
}
