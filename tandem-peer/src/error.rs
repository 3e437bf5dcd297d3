use crate::negotiation::{EventKind, SignalingPhase};
use tandem_core::Role;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    /// The message does not fit the current phase. Dropped; nothing changed.
    #[error("{event} is not valid for {role} in phase {phase}")]
    InvalidTransition {
        role: Role,
        phase: SignalingPhase,
        event: EventKind,
    },

    /// The peer-connection engine refused a description or candidate.
    #[error("transport rejected {stage}: {reason}")]
    TransportDescription { stage: &'static str, reason: String },
}
