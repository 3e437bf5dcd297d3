use std::fmt;

/// Which descriptions have been exchanged so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalingPhase {
    Idle,
    HaveLocalOffer,
    /// Receiver accepted an offer and is building its answer.
    HaveRemoteOffer,
    Stable,
}

impl fmt::Display for SignalingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalingPhase::Idle => "idle",
            SignalingPhase::HaveLocalOffer => "have-local-offer",
            SignalingPhase::HaveRemoteOffer => "have-remote-offer",
            SignalingPhase::Stable => "stable",
        };
        f.write_str(name)
    }
}
