use tandem_core::{Payload, SignalKind};

/// Where the negotiator sends outgoing offers, answers and candidates.
pub trait SignalSink: Send + Sync {
    fn send_signal(&self, kind: SignalKind, payload: Payload);
}
