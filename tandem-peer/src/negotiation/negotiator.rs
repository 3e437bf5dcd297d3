use crate::error::NegotiationError;
use crate::event::PeerEvent;
use crate::negotiation::{Action, EventKind, SignalSink, SignalingPhase, transition};
use crate::transport::PeerTransport;
use std::collections::VecDeque;
use tandem_core::{Payload, Role, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// One negotiation attempt for one participant.
///
/// Driven purely by incoming events; every transition goes through
/// [`transition`], so a message that does not fit the current phase is
/// dropped without touching any state. Remote candidates that arrive before a
/// remote description are queued and drained in arrival order right after
/// one is accepted.
pub struct Negotiator<T, S> {
    role: Role,
    phase: SignalingPhase,
    local_description: Option<Payload>,
    remote_description: Option<Payload>,
    pending_candidates: VecDeque<Payload>,
    channel_open: bool,
    ready_announced: bool,
    transport: T,
    sink: S,
    events: mpsc::UnboundedSender<PeerEvent>,
}

impl<T, S> Negotiator<T, S>
where
    T: PeerTransport,
    S: SignalSink,
{
    pub fn new(role: Role, transport: T, sink: S, events: mpsc::UnboundedSender<PeerEvent>) -> Self {
        Self {
            role,
            phase: SignalingPhase::Idle,
            local_description: None,
            remote_description: None,
            pending_candidates: VecDeque::new(),
            channel_open: false,
            ready_announced: false,
            transport,
            sink,
            events,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phase(&self) -> SignalingPhase {
        self.phase
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn has_local_description(&self) -> bool {
        self.local_description.is_some()
    }

    pub fn has_remote_description(&self) -> bool {
        self.remote_description.is_some()
    }

    /// Remote candidates waiting for a remote description.
    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    pub fn is_channel_ready(&self) -> bool {
        self.ready_announced
    }

    /// Discards this attempt and shuts the engine down.
    pub async fn close(self) {
        if let Err(e) = self.transport.close().await {
            debug!("Transport close failed: {:#}", e);
        }
    }

    pub async fn start_call(&mut self) -> Result<(), NegotiationError> {
        self.step(EventKind::StartCall, None).await
    }

    /// Feeds a relayed offer, answer or candidate.
    pub async fn handle_remote(
        &mut self,
        kind: SignalKind,
        payload: Payload,
    ) -> Result<(), NegotiationError> {
        self.step(EventKind::remote(kind), Some(payload)).await
    }

    /// The engine found a local network path.
    pub async fn local_candidate(&mut self, candidate: Payload) -> Result<(), NegotiationError> {
        self.step(EventKind::LocalCandidate, Some(candidate)).await
    }

    /// The engine reports the data path as open.
    pub fn transport_ready(&mut self) {
        self.channel_open = true;
        self.announce_if_ready();
    }

    async fn step(
        &mut self,
        event: EventKind,
        payload: Option<Payload>,
    ) -> Result<(), NegotiationError> {
        let t = match transition(self.role, self.phase, event) {
            Ok(t) => t,
            Err(e) => {
                warn!("Dropping {}: {}", event, e);
                return Err(e);
            }
        };
        debug!("{} in {}: {:?} -> {}", event, self.phase, t.action, t.next);

        match (t.action, payload) {
            (Action::SendOffer, None) => self.send_offer().await?,
            (Action::AnswerOffer, Some(offer)) => self.answer_offer(offer).await?,
            (Action::AcceptAnswer, Some(answer)) => self.accept_answer(answer).await?,
            (Action::ApplyOrBufferCandidate, Some(candidate)) => {
                self.apply_or_buffer(candidate).await?
            }
            (Action::RelayCandidate, Some(candidate)) => {
                self.sink.send_signal(SignalKind::Candidate, candidate)
            }
            (Action::SendOffer, Some(_)) => {
                warn!("Dropping {}: unexpected payload", event);
                return Ok(());
            }
            (action, None) => {
                warn!("Dropping {}: {:?} needs a payload", event, action);
                return Ok(());
            }
        }

        debug_assert_eq!(self.phase, t.next);
        Ok(())
    }

    async fn send_offer(&mut self) -> Result<(), NegotiationError> {
        let offer = match self.transport.create_offer().await {
            Ok(offer) => offer,
            Err(e) => return Err(self.abandon("offer creation", e)),
        };
        if let Err(e) = self.transport.set_local_description(offer.clone()).await {
            return Err(self.abandon("local offer", e));
        }

        self.local_description = Some(offer.clone());
        // Candidates for this round wait for its answer.
        self.remote_description = None;
        self.phase = SignalingPhase::HaveLocalOffer;
        self.sink.send_signal(SignalKind::Offer, offer);
        info!("Offer sent");
        Ok(())
    }

    async fn answer_offer(&mut self, offer: Payload) -> Result<(), NegotiationError> {
        if let Err(e) = self.transport.set_remote_description(offer.clone()).await {
            return Err(self.abandon("remote offer", e));
        }
        self.remote_description = Some(offer);
        self.phase = SignalingPhase::HaveRemoteOffer;
        self.flush_candidates().await;

        let answer = match self.transport.create_answer().await {
            Ok(answer) => answer,
            Err(e) => return Err(self.abandon("answer creation", e)),
        };
        if let Err(e) = self.transport.set_local_description(answer.clone()).await {
            return Err(self.abandon("local answer", e));
        }

        self.local_description = Some(answer.clone());
        self.phase = SignalingPhase::Stable;
        self.sink.send_signal(SignalKind::Answer, answer);
        info!("Answer sent");
        self.announce_if_ready();
        Ok(())
    }

    async fn accept_answer(&mut self, answer: Payload) -> Result<(), NegotiationError> {
        if let Err(e) = self.transport.set_remote_description(answer.clone()).await {
            return Err(self.abandon("remote answer", e));
        }
        self.remote_description = Some(answer);
        self.phase = SignalingPhase::Stable;
        info!("Answer accepted");
        self.flush_candidates().await;
        self.announce_if_ready();
        Ok(())
    }

    async fn apply_or_buffer(&mut self, candidate: Payload) -> Result<(), NegotiationError> {
        if self.remote_description.is_none() {
            self.pending_candidates.push_back(candidate);
            debug!(
                "Buffered remote candidate ({} pending)",
                self.pending_candidates.len()
            );
            return Ok(());
        }

        self.transport
            .add_ice_candidate(candidate)
            .await
            .map_err(|e| self.candidate_rejected(e))
    }

    /// Runs once per accepted remote description. A rejected candidate does
    /// not stop the rest from being applied.
    async fn flush_candidates(&mut self) {
        if self.pending_candidates.is_empty() {
            return;
        }
        debug!("Applying {} buffered candidate(s)", self.pending_candidates.len());

        while let Some(candidate) = self.pending_candidates.pop_front() {
            if let Err(e) = self.transport.add_ice_candidate(candidate).await {
                self.candidate_rejected(e);
            }
        }
    }

    fn candidate_rejected(&self, err: anyhow::Error) -> NegotiationError {
        let reason = format!("{err:#}");
        warn!("Remote candidate rejected: {}", reason);
        let _ = self.events.send(PeerEvent::CandidateRejected {
            reason: reason.clone(),
        });
        NegotiationError::TransportDescription {
            stage: "remote candidate",
            reason,
        }
    }

    /// The engine refused a description: back to idle. Queued candidates are kept.
    fn abandon(&mut self, stage: &'static str, err: anyhow::Error) -> NegotiationError {
        let reason = format!("{err:#}");
        warn!("Negotiation abandoned at {}: {}", stage, reason);

        self.phase = SignalingPhase::Idle;
        self.local_description = None;
        self.remote_description = None;
        self.ready_announced = false;

        let _ = self.events.send(PeerEvent::NegotiationFailed {
            reason: format!("{stage}: {reason}"),
        });
        NegotiationError::TransportDescription { stage, reason }
    }

    fn announce_if_ready(&mut self) {
        if self.ready_announced
            || !self.channel_open
            || self.phase != SignalingPhase::Stable
            || self.local_description.is_none()
            || self.remote_description.is_none()
        {
            return;
        }
        self.ready_announced = true;
        info!("Channel ready ({})", self.role);
        let _ = self.events.send(PeerEvent::ChannelReady);
    }
}
