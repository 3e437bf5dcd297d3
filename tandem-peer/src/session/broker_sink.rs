use crate::negotiation::SignalSink;
use tandem_core::{Payload, RoomId, Signal, SignalKind, SignalMessage};
use tokio::sync::mpsc;
use tracing::debug;

/// Wraps negotiation output into relay messages for the broker connection.
#[derive(Debug, Clone)]
pub struct BrokerSink {
    room: RoomId,
    outbound: mpsc::UnboundedSender<SignalMessage>,
}

impl BrokerSink {
    pub fn new(room: RoomId, outbound: mpsc::UnboundedSender<SignalMessage>) -> Self {
        Self { room, outbound }
    }
}

impl SignalSink for BrokerSink {
    fn send_signal(&self, kind: SignalKind, payload: Payload) {
        let msg = SignalMessage::Signal(Signal::new(self.room.clone(), kind, payload));
        if self.outbound.send(msg).is_err() {
            debug!("Broker connection gone, dropping outgoing {}", kind);
        }
    }
}
