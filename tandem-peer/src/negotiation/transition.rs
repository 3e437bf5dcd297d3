use crate::error::NegotiationError;
use crate::negotiation::SignalingPhase;
use std::fmt;
use tandem_core::{Role, SignalKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StartCall,
    RemoteOffer,
    RemoteAnswer,
    RemoteCandidate,
    LocalCandidate,
}

impl EventKind {
    pub fn remote(kind: SignalKind) -> Self {
        match kind {
            SignalKind::Offer => EventKind::RemoteOffer,
            SignalKind::Answer => EventKind::RemoteAnswer,
            SignalKind::Candidate => EventKind::RemoteCandidate,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::StartCall => "start call",
            EventKind::RemoteOffer => "remote offer",
            EventKind::RemoteAnswer => "remote answer",
            EventKind::RemoteCandidate => "remote candidate",
            EventKind::LocalCandidate => "local candidate",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create an offer, keep it as the local description, relay it.
    SendOffer,
    /// Take the offer as remote description, then create, keep and relay an answer.
    AnswerOffer,
    /// Take the answer as remote description.
    AcceptAnswer,
    /// Apply now if a remote description exists, otherwise queue.
    ApplyOrBufferCandidate,
    RelayCandidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub action: Action,
    pub next: SignalingPhase,
}

/// The negotiation table. Anything not listed is an invalid transition and
/// must leave the state untouched.
pub fn transition(
    role: Role,
    phase: SignalingPhase,
    event: EventKind,
) -> Result<Transition, NegotiationError> {
    use Action::*;
    use SignalingPhase::*;

    let (action, next) = match (role, phase, event) {
        (Role::Initiator, Idle | Stable, EventKind::StartCall) => (SendOffer, HaveLocalOffer),
        (Role::Receiver, Idle | Stable, EventKind::RemoteOffer) => (AnswerOffer, Stable),
        (_, HaveLocalOffer, EventKind::RemoteAnswer) => (AcceptAnswer, Stable),
        (_, _, EventKind::RemoteCandidate) => (ApplyOrBufferCandidate, phase),
        (_, _, EventKind::LocalCandidate) => (RelayCandidate, phase),
        _ => return Err(NegotiationError::InvalidTransition { role, phase, event }),
    };

    Ok(Transition { action, next })
}
